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

//! Queries to the console's package-config program.

use crate::{
	environment::ParsedFlags,
	error::PkgConfigError,
	host::{Host, SearchPath, ToolCommand},
};
use semver::Version;
use std::ffi::OsString;
use tracing::debug;

/// A package-config program, resolved with the search path of a configuration pass.
pub struct PkgConfig<'h, H: Host + ?Sized> {
	host: &'h H,
	/// The name of the program.
	program: String,
	/// The joined search path.
	path: OsString,
}

impl<'h, H: Host + ?Sized> PkgConfig<'h, H> {
	/// Creates an instance running `program`, resolved with `search_path`.
	pub fn new(
		host: &'h H,
		program: impl Into<String>,
		search_path: &SearchPath,
	) -> Result<Self, PkgConfigError> {
		Ok(Self {
			host,
			program: program.into(),
			path: search_path.join()?,
		})
	}

	/// Runs the program with `args` and returns its standard output.
	fn run(&self, args: &[&str]) -> Result<String, PkgConfigError> {
		let cmd = ToolCommand::new(self.program.as_str())
			.args(args.iter().copied())
			.search_path(self.path.clone());
		debug!(command = %cmd, "running package-config");
		let out = self.host.run(&cmd).map_err(|source| PkgConfigError::Spawn {
			command: cmd.line(),
			source,
		})?;
		if !out.success {
			let status = match out.code {
				Some(code) => format!("exit status: {code}"),
				None => "killed".to_owned(),
			};
			return Err(PkgConfigError::Status {
				command: cmd.line(),
				status,
			});
		}
		String::from_utf8(out.stdout).map_err(|_| PkgConfigError::Utf8 {
			command: cmd.line(),
		})
	}

	/// Returns the compiler and linker flags of `packages`.
	pub fn flags(&self, packages: &[&str]) -> Result<ParsedFlags, PkgConfigError> {
		let mut args = packages.to_vec();
		args.extend(["--cflags", "--libs"]);
		let out = self.run(&args)?;
		Ok(ParsedFlags::parse(&out))
	}

	/// Returns the version of `package`, as reported by the program.
	pub fn modversion(&self, package: &str) -> Result<String, PkgConfigError> {
		let out = self.run(&[package, "--modversion"])?;
		Ok(out.trim().to_owned())
	}
}

/// Parses a module version.
///
/// Versions are made of up to three numeric components separated by dots (`2.88`, `3.25.1`).
/// Missing components are zero, further ones and non-numeric suffixes (`1.0.0-rc1`) are
/// ignored. Comparison is then numeric per component, so that `2.9` is older than `2.10`.
pub fn parse_version(s: &str) -> Result<Version, PkgConfigError> {
	let err = || PkgConfigError::Version(s.to_owned());
	let mut components = [0u64; 3];
	let mut parts = s.split('.');
	for (i, component) in components.iter_mut().enumerate() {
		let Some(part) = parts.next() else {
			break;
		};
		let end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
		if end == 0 {
			// Only the first component is mandatory
			if i == 0 {
				return Err(err());
			}
			break;
		}
		*component = part[..end].parse().map_err(|_| err())?;
		if end < part.len() {
			break;
		}
	}
	let [major, minor, patch] = components;
	Ok(Version::new(major, minor, patch))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{environment::Var, host::fake::FakeHost};
	use std::path::PathBuf;

	fn search_path() -> SearchPath {
		SearchPath::new(vec![PathBuf::from("/dkp/portlibs/switch/bin")], None)
	}

	#[test]
	fn versions() {
		assert_eq!(parse_version("2.88").unwrap(), Version::new(2, 88, 0));
		assert_eq!(parse_version("3.25.1").unwrap(), Version::new(3, 25, 1));
		assert_eq!(parse_version("1.2.3.4").unwrap(), Version::new(1, 2, 3));
		assert_eq!(parse_version("1.0rc1").unwrap(), Version::new(1, 0, 0));
		assert_eq!(parse_version("7").unwrap(), Version::new(7, 0, 0));
		assert!(parse_version("").is_err());
		assert!(parse_version("abc").is_err());
	}

	#[test]
	fn numeric_ordering() {
		assert!(parse_version("2.9").unwrap() < parse_version("2.10").unwrap());
		assert!(parse_version("2.87").unwrap() < parse_version("2.88").unwrap());
		assert!(parse_version("2.89").unwrap() >= parse_version("2.88").unwrap());
	}

	#[test]
	fn query_flags() {
		let host = FakeHost::new().with_output(
			"aarch64-none-elf-pkg-config vorbis vorbisfile --cflags --libs",
			"-I/dkp/include -lvorbisfile -lvorbis -logg\n",
		);
		let pkg = PkgConfig::new(&host, "aarch64-none-elf-pkg-config", &search_path()).unwrap();
		let flags = pkg.flags(&["vorbis", "vorbisfile"]).unwrap();
		assert_eq!(flags.values(Var::Libs), ["vorbisfile", "vorbis", "ogg"]);
		let calls = host.calls.borrow();
		assert_eq!(calls[0].path, Some(OsString::from("/dkp/portlibs/switch/bin")));
	}

	#[test]
	fn query_version() {
		let host = FakeHost::new()
			.with_output("aarch64-none-elf-pkg-config bullet --modversion", "2.89\n");
		let pkg = PkgConfig::new(&host, "aarch64-none-elf-pkg-config", &search_path()).unwrap();
		let version = pkg.modversion("bullet").unwrap();
		assert_eq!(version, "2.89");
		assert_eq!(parse_version(&version).unwrap(), Version::new(2, 89, 0));
	}

	#[test]
	fn failures() {
		let host = FakeHost::new().with_failure("aarch64-none-elf-pkg-config ogg --cflags --libs");
		let pkg = PkgConfig::new(&host, "aarch64-none-elf-pkg-config", &search_path()).unwrap();
		assert!(matches!(
			pkg.flags(&["ogg"]),
			Err(PkgConfigError::Status {
				..
			})
		));
		assert!(matches!(
			pkg.flags(&["opus"]),
			Err(PkgConfigError::Spawn {
				..
			})
		));
	}
}
