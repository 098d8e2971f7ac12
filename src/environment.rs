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

//! The build environment handed to the engine's build graph.
//!
//! The configuration only ever adds to the environment. The order of values is kept, as it
//! decides which directory wins when searching headers and libraries.

use serde::Serialize;
use std::{collections::BTreeMap, mem};

/// A list variable of the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Var {
	/// Flags passed to both the C and C++ compilers.
	CcFlags,
	/// Preprocessor flags.
	CppFlags,
	/// Header search directories.
	CppPath,
	/// Preprocessor definitions, without the `-D` prefix.
	CppDefines,
	/// Library search directories.
	LibPath,
	/// Linker flags.
	LinkFlags,
	/// Libraries to link, without the `-l` prefix.
	Libs,
}

impl Var {
	/// Every variable, in display order.
	pub const ALL: [Self; 7] = [
		Self::CcFlags,
		Self::CppFlags,
		Self::CppPath,
		Self::CppDefines,
		Self::LibPath,
		Self::LinkFlags,
		Self::Libs,
	];

	/// Returns the conventional name of the variable.
	pub fn name(self) -> &'static str {
		match self {
			Self::CcFlags => "CCFLAGS",
			Self::CppFlags => "CPPFLAGS",
			Self::CppPath => "CPPPATH",
			Self::CppDefines => "CPPDEFINES",
			Self::LibPath => "LIBPATH",
			Self::LinkFlags => "LINKFLAGS",
			Self::Libs => "LIBS",
		}
	}

	/// Tells whether the variable holds search directories.
	///
	/// When merging, directories keep their first position while other values keep their last.
	fn is_path(self) -> bool {
		matches!(self, Self::CppPath | Self::LibPath)
	}

	/// Tells whether values are flags that may span several arguments.
	fn is_flags(self) -> bool {
		matches!(self, Self::CcFlags | Self::CppFlags | Self::LinkFlags)
	}
}

/// The compilers, flags and libraries used to build the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BuildEnvironment {
	/// The C compiler.
	pub cc: String,
	/// The C++ compiler.
	pub cxx: String,
	/// The linker.
	pub ld: String,
	/// The archiver.
	pub ar: String,
	/// The archive indexer.
	pub ranlib: String,

	pub ccflags: Vec<String>,
	pub cppflags: Vec<String>,
	pub cpppath: Vec<String>,
	pub cppdefines: Vec<String>,
	pub libpath: Vec<String>,
	pub linkflags: Vec<String>,
	pub libs: Vec<String>,

	/// The environment of the programs run by the build.
	pub env: BTreeMap<String, String>,
	/// Suffix appended to the names of the produced binaries.
	pub extra_suffix: String,
	/// The width of a pointer on the target, in bits.
	pub bits: Option<u32>,
	/// Tells whether the bundled libtheora uses its x86 assembly.
	pub x86_libtheora_opt_gcc: bool,
}

impl BuildEnvironment {
	/// Returns the values of `var`.
	pub fn get(&self, var: Var) -> &[String] {
		match var {
			Var::CcFlags => &self.ccflags,
			Var::CppFlags => &self.cppflags,
			Var::CppPath => &self.cpppath,
			Var::CppDefines => &self.cppdefines,
			Var::LibPath => &self.libpath,
			Var::LinkFlags => &self.linkflags,
			Var::Libs => &self.libs,
		}
	}

	fn get_mut(&mut self, var: Var) -> &mut Vec<String> {
		match var {
			Var::CcFlags => &mut self.ccflags,
			Var::CppFlags => &mut self.cppflags,
			Var::CppPath => &mut self.cpppath,
			Var::CppDefines => &mut self.cppdefines,
			Var::LibPath => &mut self.libpath,
			Var::LinkFlags => &mut self.linkflags,
			Var::Libs => &mut self.libs,
		}
	}

	/// Inserts `values` in front of `var`, keeping their order.
	pub fn prepend<I, S>(&mut self, var: Var, values: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let list = self.get_mut(var);
		let tail = mem::replace(list, values.into_iter().map(Into::into).collect());
		list.extend(tail);
	}

	/// Inserts `values` at the end of `var`, keeping their order.
	pub fn append<I, S>(&mut self, var: Var, values: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.get_mut(var).extend(values.into_iter().map(Into::into));
	}

	/// Tells whether `var` contains `value`.
	pub fn contains(&self, var: Var, value: &str) -> bool {
		self.get(var).iter().any(|v| v == value)
	}

	/// Merges flags reported by the package-config tool.
	///
	/// Duplicates are removed: search directories keep their left-most position, libraries and
	/// definitions their right-most one. Flags are appended unless the exact same flag (with its
	/// argument, if any) is already present.
	pub fn merge(&mut self, flags: ParsedFlags) {
		for (var, unit) in flags.units {
			let list = self.get_mut(var);
			if var.is_flags() {
				if !list.windows(unit.len()).any(|w| w == unit.as_slice()) {
					list.extend(unit);
				}
			} else if var.is_path() {
				for value in unit {
					if !list.contains(&value) {
						list.push(value);
					}
				}
			} else {
				for value in unit {
					list.retain(|v| *v != value);
					list.push(value);
				}
			}
		}
	}
}

/// Flags of a package-config output, sorted into environment variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedFlags {
	/// The flags, in order. A flag taking an argument is kept with it.
	units: Vec<(Var, Vec<String>)>,
}

/// Flags whose argument is the following word.
const PAIRED_FLAGS: &[&str] = &["-isystem", "-include", "-imacros", "-idirafter", "-iquote", "-arch"];

impl ParsedFlags {
	fn push(&mut self, var: Var, value: impl Into<String>) {
		self.units.push((var, vec![value.into()]));
	}

	/// Sorts the words of `output` into environment variables.
	pub fn parse(output: &str) -> Self {
		let mut flags = Self::default();
		let mut words = output.split_whitespace();
		while let Some(word) = words.next() {
			// Flags whose value may be in the same word or the next one
			let split = ["-I", "-L", "-l", "-D"]
				.into_iter()
				.find_map(|prefix| word.strip_prefix(prefix).map(|rest| (prefix, rest)));
			if let Some((prefix, rest)) = split {
				let value = if rest.is_empty() {
					match words.next() {
						Some(v) => v,
						None => break,
					}
				} else {
					rest
				};
				let var = match prefix {
					"-I" => Var::CppPath,
					"-L" => Var::LibPath,
					"-l" => Var::Libs,
					_ => Var::CppDefines,
				};
				flags.push(var, value);
				continue;
			}
			if PAIRED_FLAGS.contains(&word) {
				let mut unit = vec![word.to_owned()];
				unit.extend(words.next().map(str::to_owned));
				flags.units.push((Var::CcFlags, unit));
			} else if word == "-pthread" || word == "-fopenmp" {
				flags.push(Var::CcFlags, word);
				flags.push(Var::LinkFlags, word);
			} else if word.starts_with("-Wl,") || word == "-rdynamic" {
				flags.push(Var::LinkFlags, word);
			} else if word.starts_with("-Wp,") {
				flags.push(Var::CppFlags, word);
			} else if word.starts_with('-') {
				flags.push(Var::CcFlags, word);
			} else {
				// Bare words are paths to libraries
				flags.push(Var::Libs, word);
			}
		}
		flags
	}

	/// Returns the values sorted into `var`, in order.
	pub fn values(&self, var: Var) -> Vec<&str> {
		self.units
			.iter()
			.filter(|(v, _)| *v == var)
			.flat_map(|(_, unit)| unit.iter().map(String::as_str))
			.collect()
	}

	/// Tells whether nothing was parsed.
	pub fn is_empty(&self) -> bool {
		self.units.is_empty()
	}
}
