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

//! Compilation of C and C++ sources with a configured [`BuildEnvironment`].
//!
//! This allows build scripts to compile native code for the platform with the `cc` crate, and to
//! pass the link flags of the environment to `rustc`.

use crate::{environment::BuildEnvironment, toolchain::TRIPLET};
use std::{
	env,
	path::{Path, PathBuf},
};

/// Returns the path to `program`, searched in the `PATH` of the environment.
pub fn locate(env: &BuildEnvironment, program: &str) -> Option<PathBuf> {
	let path = env.env.get("PATH")?;
	env::split_paths(path)
		.map(|dir| dir.join(program))
		.find(|p| p.is_file())
}

/// Resolves a header directory. Directories starting with `#` are relative to `root`.
fn include_dir(root: &Path, dir: &str) -> PathBuf {
	match dir.strip_prefix('#') {
		Some(rel) => root.join(rel),
		None => PathBuf::from(dir),
	}
}

/// Splits a definition into its name and value.
fn split_define(def: &str) -> (&str, Option<&str>) {
	match def.split_once('=') {
		Some((name, value)) => (name, Some(value)),
		None => (def, None),
	}
}

/// Removes the shell escapes of a value stored in the environment (`\"horizon\"`).
///
/// The environment holds flags as a shell would receive them, while [`cc::Build`] passes its
/// arguments to the compiler directly.
fn unescape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	let mut chars = value.chars();
	while let Some(c) = chars.next() {
		if c == '\\' {
			out.extend(chars.next());
		} else {
			out.push(c);
		}
	}
	out
}

/// Creates a [`cc::Build`] compiling C++ if `cpp` is set, C otherwise, with `env`.
///
/// `root` is the root of the engine's source tree.
pub fn build(env: &BuildEnvironment, root: &Path, cpp: bool) -> cc::Build {
	let compiler = if cpp { &env.cxx } else { &env.cc };
	let compiler = locate(env, compiler).unwrap_or_else(|| PathBuf::from(compiler));
	let archiver = locate(env, &env.ar).unwrap_or_else(|| PathBuf::from(&env.ar));
	let ranlib = locate(env, &env.ranlib).unwrap_or_else(|| PathBuf::from(&env.ranlib));

	let mut build = cc::Build::new();
	build
		.cpp(cpp)
		.compiler(compiler)
		.archiver(archiver)
		.ranlib(ranlib)
		.target(TRIPLET)
		.pic(false);
	for dir in &env.cpppath {
		build.include(include_dir(root, dir));
	}
	for def in &env.cppdefines {
		let (name, value) = split_define(def);
		build.define(name, value);
	}
	for flag in &env.cppflags {
		match flag.strip_prefix("-D").filter(|def| !def.is_empty()) {
			Some(def) => {
				let (name, value) = split_define(def);
				let value = value.map(unescape);
				build.define(name, value.as_deref());
			}
			None => {
				build.flag(flag);
			}
		}
	}
	for flag in &env.ccflags {
		build.flag(flag);
	}
	build
}

/// Returns the arguments to pass to the linker.
pub fn link_args(env: &BuildEnvironment) -> Vec<String> {
	let search = env.libpath.iter().map(|dir| format!("-L{dir}"));
	let libs = env.libs.iter().map(|lib| format!("-l{lib}"));
	env.linkflags.iter().cloned().chain(search).chain(libs).collect()
}

/// Returns the directives telling cargo to link with the libraries of `env`.
pub fn cargo_link_directives(env: &BuildEnvironment) -> Vec<String> {
	let search = env
		.libpath
		.iter()
		.map(|dir| format!("cargo:rustc-link-search=native={dir}"));
	let libs = env.libs.iter().map(|lib| format!("cargo:rustc-link-lib={lib}"));
	let args = env
		.linkflags
		.iter()
		.map(|flag| format!("cargo:rustc-link-arg={flag}"));
	search.chain(libs).chain(args).collect()
}

/// Tells cargo to link the crate being built with the libraries of `env`.
///
/// This function is meant to be called from a build script.
pub fn emit_cargo_link(env: &BuildEnvironment) {
	for directive in cargo_link_directives(env) {
		println!("{directive}");
	}
}
