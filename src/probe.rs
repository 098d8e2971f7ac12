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

//! Detection of the cross-compilation toolchain.
//!
//! Every check runs, even after a failure, so that all the missing pieces are reported at once.

use crate::{
	host::{Host, ToolCommand},
	revision::Revision,
	toolchain::{tool, ToolchainPaths},
};
use std::fmt;
use tracing::{debug, warn};

/// A requirement of the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
	/// The SDK root directory.
	DevkitPro,
	/// The compiler directory.
	DevkitA64,
	/// The console's package-config program.
	ConsolePkgConfig,
	/// The host's package-config program.
	HostPkgConfig,
}

impl Check {
	/// Every check, in the order they run.
	pub const ALL: [Self; 4] = [
		Self::DevkitPro,
		Self::DevkitA64,
		Self::ConsolePkgConfig,
		Self::HostPkgConfig,
	];

	/// Returns the name of the missing piece, as shown to the user.
	pub fn subject(self) -> String {
		match self {
			Self::DevkitPro => "DEVKITPRO".to_owned(),
			Self::DevkitA64 => "devkitA64".to_owned(),
			Self::ConsolePkgConfig => tool("pkg-config"),
			Self::HostPkgConfig => "pkg-config".to_owned(),
		}
	}

	/// Runs the check.
	fn passes<H: Host + ?Sized>(self, host: &H, paths: &ToolchainPaths) -> bool {
		match self {
			Self::DevkitPro => host.exists(&paths.devkitpro),
			Self::DevkitA64 => host.exists(&paths.compiler_dir),
			Self::ConsolePkgConfig => host.exists(&paths.pkg_config()),
			Self::HostPkgConfig => host
				.run(&ToolCommand::new("pkg-config").arg("--version"))
				.is_ok_and(|out| out.success),
		}
	}
}

/// A failed check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostic(pub Check);

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} not found. Switch disabled.", self.0.subject())
	}
}

/// The outcome of a probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeReport {
	/// The failed checks, in order.
	pub diagnostics: Vec<Diagnostic>,
}

impl ProbeReport {
	/// Tells whether the platform can be built.
	pub fn is_buildable(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Checks the host for the toolchain.
pub fn probe<H: Host + ?Sized>(host: &H, revision: Revision) -> ProbeReport {
	let paths = ToolchainPaths::from_host(host, revision);
	let diagnostics = Check::ALL
		.into_iter()
		.filter(|check| {
			let passes = check.passes(host, &paths);
			if passes {
				debug!(check = ?check, "toolchain check passed");
			} else {
				warn!(check = ?check, "toolchain check failed");
			}
			!passes
		})
		.map(Diagnostic)
		.collect();
	ProbeReport {
		diagnostics,
	}
}

/// Tells whether the platform can be built, printing a line for each missing piece.
pub fn can_build<H: Host + ?Sized>(host: &H, revision: Revision) -> bool {
	let report = probe(host, revision);
	for d in &report.diagnostics {
		println!("{d}");
	}
	report.is_buildable()
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::host::fake::FakeHost;

	const ROOT: &str = "/dkp";
	const COMPILER: &str = "/dkp/devkitA64";
	const PKG_CONFIG: &str = "/dkp/portlibs/switch/bin/aarch64-none-elf-pkg-config";

	fn host(root: bool, compiler: bool, pkg_config: bool, host_pkg_config: bool) -> FakeHost {
		let mut host = FakeHost::new().with_var("DEVKITPRO", ROOT);
		if root {
			host = host.with_path(ROOT);
		}
		if compiler {
			host = host.with_path(COMPILER);
		}
		if pkg_config {
			host = host.with_path(PKG_CONFIG);
		}
		if host_pkg_config {
			host = host.with_output("pkg-config --version", "0.29.2\n");
		}
		host
	}

	#[test]
	fn complete_toolchain() {
		let report = probe(&host(true, true, true, true), Revision::Current);
		assert!(report.is_buildable());
		assert!(report.diagnostics.is_empty());
	}

	#[test]
	fn every_combination() {
		for mask in 0..16u8 {
			let present = [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0];
			let host = host(present[0], present[1], present[2], present[3]);
			let report = probe(&host, Revision::Current);
			let expected: Vec<Diagnostic> = Check::ALL
				.into_iter()
				.zip(present)
				.filter(|(_, present)| !present)
				.map(|(check, _)| Diagnostic(check))
				.collect();
			assert_eq!(report.diagnostics, expected, "mask {mask:#06b}");
			assert_eq!(report.is_buildable(), mask == 0b1111);
			// The host program is always queried, even if everything else is missing
			assert_eq!(host.lines(), ["pkg-config --version"]);
		}
	}

	#[test]
	fn failing_host_pkg_config() {
		let host = FakeHost::new()
			.with_var("DEVKITPRO", ROOT)
			.with_path(ROOT)
			.with_path(COMPILER)
			.with_path(PKG_CONFIG)
			.with_failure("pkg-config --version");
		let report = probe(&host, Revision::Current);
		assert_eq!(report.diagnostics, [Diagnostic(Check::HostPkgConfig)]);
	}

	#[test]
	fn messages() {
		let lines: Vec<String> = Check::ALL
			.into_iter()
			.map(|c| Diagnostic(c).to_string())
			.collect();
		assert_eq!(
			lines,
			[
				"DEVKITPRO not found. Switch disabled.",
				"devkitA64 not found. Switch disabled.",
				"aarch64-none-elf-pkg-config not found. Switch disabled.",
				"pkg-config not found. Switch disabled.",
			]
		);
	}

	#[test]
	fn default_root() {
		let host = FakeHost::new()
			.with_path("/opt/devkitpro")
			.with_path("/opt/devkitpro/devkitA64")
			.with_path("/opt/devkitpro/portlibs/switch/bin/aarch64-none-elf-pkg-config")
			.with_output("pkg-config --version", "1.8.1\n");
		assert!(can_build(&host, Revision::Initial));
	}
}
