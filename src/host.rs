/*
 * Copyright 2024 Luc Lenôtre
 *
 * This file is part of horizon-detect.
 *
 * horizon-detect is free software: you can redistribute it and/or modify it
 * under the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option) any
 * later version.
 *
 * horizon-detect is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * horizon-detect. If not, see <https://www.gnu.org/licenses/>.
 */

//! Access to the machine the configuration runs on.
//!
//! Every probe and configuration step goes through a [`Host`], so that no step reaches for the
//! process environment or spawns a program behind the caller's back. Programs are always spawned
//! with an explicit [`SearchPath`] instead of relying on the process-wide `PATH`.

use std::{
	env,
	ffi::OsString,
	fmt, io,
	path::{Path, PathBuf},
	process::{Command, Stdio},
};

/// A program invocation, with the search path used to resolve it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
	/// The name of, or path to, the program.
	pub program: String,
	/// The arguments.
	pub args: Vec<String>,
	/// The `PATH` the program is resolved with and inherits. If `None`, the host's own `PATH`
	/// is used.
	pub path: Option<OsString>,
}

impl ToolCommand {
	/// Creates a command running `program` without arguments.
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
			args: vec![],
			path: None,
		}
	}

	/// Appends an argument.
	pub fn arg(mut self, arg: impl Into<String>) -> Self {
		self.args.push(arg.into());
		self
	}

	/// Appends several arguments.
	pub fn args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.args.extend(args.into_iter().map(Into::into));
		self
	}

	/// Resolves the program with the given search path.
	pub fn search_path(mut self, path: OsString) -> Self {
		self.path = Some(path);
		self
	}

	/// Returns the command line, as it would be typed in a shell.
	pub fn line(&self) -> String {
		let mut line = self.program.clone();
		for a in &self.args {
			line.push(' ');
			line.push_str(a);
		}
		line
	}
}

impl fmt::Display for ToolCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.line())
	}
}

/// The result of a finished [`ToolCommand`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
	/// Tells whether the program exited successfully.
	pub success: bool,
	/// The exit code, if the program was not killed by a signal.
	pub code: Option<i32>,
	/// The content written on the standard output.
	pub stdout: Vec<u8>,
}

/// The capability through which the configuration observes and drives the host.
pub trait Host {
	/// Returns the value of the environment variable `name`, if set and valid unicode.
	fn var(&self, name: &str) -> Option<String>;
	/// Tells whether `path` exists.
	fn exists(&self, path: &Path) -> bool;
	/// Runs `cmd` to completion and returns its output.
	///
	/// The standard error of the program is forwarded to the host's.
	fn run(&self, cmd: &ToolCommand) -> io::Result<ToolOutput>;
	/// Returns the name of the host's machine architecture (`x86_64`, `aarch64`, ...).
	fn machine(&self) -> String;
}

/// The [`Host`] backed by the current process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl Host for SystemHost {
	fn var(&self, name: &str) -> Option<String> {
		env::var(name).ok()
	}

	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn run(&self, cmd: &ToolCommand) -> io::Result<ToolOutput> {
		let mut command = Command::new(&cmd.program);
		command.args(&cmd.args).stderr(Stdio::inherit());
		// On Unix, setting `PATH` on the child also changes how the program itself is resolved
		if let Some(path) = &cmd.path {
			command.env("PATH", path);
		}
		let output = command.output()?;
		Ok(ToolOutput {
			success: output.status.success(),
			code: output.status.code(),
			stdout: output.stdout,
		})
	}

	fn machine(&self) -> String {
		env::consts::ARCH.to_owned()
	}
}

/// The executable search path of one configuration pass.
///
/// Toolchain directories come first, followed by the `PATH` inherited from the host, which is
/// never dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPath {
	/// The directories placed in front of the inherited path.
	dirs: Vec<PathBuf>,
	/// The host's `PATH`, if any.
	inherited: Option<String>,
}

impl SearchPath {
	/// Creates a search path resolving programs in `dirs` first, then in `inherited`.
	pub fn new(dirs: Vec<PathBuf>, inherited: Option<String>) -> Self {
		Self {
			dirs,
			inherited,
		}
	}

	/// Returns the directories placed in front of the inherited path.
	pub fn dirs(&self) -> &[PathBuf] {
		&self.dirs
	}

	/// Returns the joined value, suitable for the `PATH` variable.
	pub fn join(&self) -> Result<OsString, env::JoinPathsError> {
		let inherited = self
			.inherited
			.as_deref()
			.map(|p| env::split_paths(p).collect::<Vec<_>>())
			.unwrap_or_default();
		env::join_paths(self.dirs.iter().cloned().chain(inherited))
	}
}

/// Guard installing a [`SearchPath`] as the process-wide `PATH`.
///
/// The previous value is restored when the guard is dropped. Only useful for callers whose own
/// subprocess layer cannot be handed an explicit path; the configurator itself never needs it.
#[must_use = "the previous PATH is restored as soon as the guard is dropped"]
pub struct ScopedPath {
	/// The value of `PATH` before the guard was acquired.
	previous: Option<OsString>,
}

impl ScopedPath {
	/// Replaces the process's `PATH` with `path` until the returned guard is dropped.
	pub fn acquire(path: &SearchPath) -> Result<Self, env::JoinPathsError> {
		let joined = path.join()?;
		let previous = env::var_os("PATH");
		env::set_var("PATH", joined);
		Ok(Self {
			previous,
		})
	}
}

impl Drop for ScopedPath {
	fn drop(&mut self) {
		match self.previous.take() {
			Some(p) => env::set_var("PATH", p),
			None => env::remove_var("PATH"),
		}
	}
}


#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn command_line() {
		let cmd = ToolCommand::new("pkg-config").args(["ogg", "--cflags", "--libs"]);
		assert_eq!(cmd.line(), "pkg-config ogg --cflags --libs");
		assert_eq!(cmd.to_string(), cmd.line());
	}

	#[test]
	fn search_path_keeps_inherited() {
		let path = SearchPath::new(
			vec!["/dkp/portlibs/switch/bin".into(), "/dkp/devkitA64/bin".into()],
			Some("/usr/bin:/bin".to_owned()),
		);
		let joined = path.join().unwrap();
		let dirs: Vec<PathBuf> = env::split_paths(&joined).collect();
		assert_eq!(
			dirs,
			[
				"/dkp/portlibs/switch/bin",
				"/dkp/devkitA64/bin",
				"/usr/bin",
				"/bin"
			]
			.map(PathBuf::from)
		);
	}

	#[test]
	fn search_path_without_inherited() {
		let path = SearchPath::new(vec!["/dkp/devkitA64/bin".into()], None);
		assert_eq!(path.join().unwrap(), OsString::from("/dkp/devkitA64/bin"));
	}

	#[test]
	fn scoped_path_restores() {
		let before = env::var_os("PATH");
		let path = SearchPath::new(
			vec!["/scoped/bin".into()],
			before.as_ref().and_then(|p| p.to_str()).map(str::to_owned),
		);
		{
			let _guard = ScopedPath::acquire(&path).unwrap();
			let current = env::var_os("PATH").unwrap();
			assert_eq!(env::split_paths(&current).next(), Some("/scoped/bin".into()));
		}
		assert_eq!(env::var_os("PATH"), before);
	}
}
