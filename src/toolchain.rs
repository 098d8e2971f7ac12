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

//! Layout of the devkitPro toolchain.

use crate::{
	host::{Host, SearchPath},
	revision::Revision,
};
use std::path::PathBuf;

/// The SDK root used when `DEVKITPRO` is not set.
pub const DEFAULT_DEVKITPRO: &str = "/opt/devkitpro";
/// The target triplet of the cross-toolchain.
pub const TRIPLET: &str = "aarch64-none-elf";

/// Returns the name of the cross-toolchain's variant of `tool`.
pub fn tool(tool: &str) -> String {
	format!("{TRIPLET}-{tool}")
}

/// Paths to the toolchain, derived from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainPaths {
	/// The root of the SDK.
	pub devkitpro: PathBuf,
	/// The directory of the compiler.
	pub compiler_dir: PathBuf,
}

impl ToolchainPaths {
	/// Reads the toolchain's location from the host's environment.
	pub fn from_host<H: Host + ?Sized>(host: &H, revision: Revision) -> Self {
		let devkitpro = host
			.var("DEVKITPRO")
			.filter(|s| !s.is_empty())
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_DEVKITPRO));
		let compiler_dir = revision
			.honors_devkita64()
			.then(|| host.var("DEVKITA64"))
			.flatten()
			.filter(|s| !s.is_empty())
			.map(PathBuf::from)
			.unwrap_or_else(|| devkitpro.join("devkitA64"));
		Self {
			devkitpro,
			compiler_dir,
		}
	}

	/// Returns the root of the console's ported libraries.
	pub fn portlibs(&self) -> PathBuf {
		self.devkitpro.join("portlibs/switch")
	}

	/// Returns the path to the console's package-config program.
	pub fn pkg_config(&self) -> PathBuf {
		self.portlibs().join("bin").join(tool("pkg-config"))
	}

	/// Returns the root of libnx.
	pub fn libnx(&self) -> PathBuf {
		self.devkitpro.join("libnx")
	}

	/// Returns the path to the linker specs of libnx.
	pub fn specs(&self) -> PathBuf {
		self.libnx().join("switch.specs")
	}

	/// Returns the search path to resolve toolchain programs with, in front of `inherited`.
	pub fn search_path(&self, inherited: Option<String>) -> SearchPath {
		SearchPath::new(
			vec![self.portlibs().join("bin"), self.compiler_dir.join("bin")],
			inherited,
		)
	}
}
