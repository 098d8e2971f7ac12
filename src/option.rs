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

//! Declaration of the user-overridable options and the set of resolved values.
//!
//! Descriptors only declare names, help texts, defaults and allowed values. Parsing user input
//! against them is left to the front-end (see [`crate::config`]).

use crate::{error::ConfigureError, revision::Revision};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// The type and default value of an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
	/// A boolean.
	Bool {
		/// The default value.
		default: bool,
	},
	/// One value of a closed set.
	Enum {
		/// The default value.
		default: &'static str,
		/// The allowed values.
		values: &'static [&'static str],
	},
}

/// The declaration of an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionDescriptor {
	/// The name of the option.
	pub name: &'static str,
	/// A human readable description.
	pub help: &'static str,
	/// The type and default value.
	pub kind: OptionKind,
}

impl OptionDescriptor {
	/// Declares a boolean option.
	pub const fn boolean(name: &'static str, help: &'static str, default: bool) -> Self {
		Self {
			name,
			help,
			kind: OptionKind::Bool {
				default,
			},
		}
	}

	/// Declares an enumerated option.
	pub const fn choice(
		name: &'static str,
		help: &'static str,
		default: &'static str,
		values: &'static [&'static str],
	) -> Self {
		Self {
			name,
			help,
			kind: OptionKind::Enum {
				default,
				values,
			},
		}
	}

	/// Returns the default value.
	pub fn default_value(&self) -> OptionValue {
		match self.kind {
			OptionKind::Bool {
				default,
			} => OptionValue::Bool(default),
			OptionKind::Enum {
				default, ..
			} => OptionValue::Enum(default.to_owned()),
		}
	}
}

/// The value of an option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
	/// A boolean.
	Bool(bool),
	/// One value of a closed set.
	Enum(String),
}

impl fmt::Display for OptionValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(true) => f.write_str("yes"),
			Self::Bool(false) => f.write_str("no"),
			Self::Enum(v) => f.write_str(v),
		}
	}
}

/// Resolved option values, indexed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, OptionValue>);

impl OptionSet {
	/// Creates a set holding the default value of each descriptor.
	pub fn with_defaults<'d, I>(descriptors: I) -> Self
	where
		I: IntoIterator<Item = &'d OptionDescriptor>,
	{
		Self(
			descriptors
				.into_iter()
				.map(|d| (d.name.to_owned(), d.default_value()))
				.collect(),
		)
	}

	/// Sets the value of an option, returning the previous one.
	pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
		self.0.insert(name.into(), value)
	}

	/// Returns the value of an option.
	pub fn get(&self, name: &str) -> Option<&OptionValue> {
		self.0.get(name)
	}

	/// Returns the value of a boolean option.
	///
	/// An option that is not set, or not a boolean, is `false`.
	pub fn flag(&self, name: &str) -> bool {
		matches!(self.get(name), Some(OptionValue::Bool(true)))
	}

	/// Returns the value of an enumerated option.
	pub fn choice(&self, name: &str) -> Option<&str> {
		match self.get(name)? {
			OptionValue::Enum(v) => Some(v.as_str()),
			OptionValue::Bool(_) => None,
		}
	}

	/// Returns an iterator over the options, sorted by name.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}
}

/// The build mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
	/// Optimized, without debugging features.
	Release,
	/// Optimized, with debugging features.
	ReleaseDebug,
	/// Not optimized, with every debugging feature.
	Debug,
}

/// The optimization goal of release builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Optimize {
	Speed,
	Size,
}

/// The verbosity of debug symbols in release builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugSymbols {
	No,
	Yes,
	Full,
}

/// Reads the enumerated option `name`, using `default` if not set.
fn read_choice<T>(
	options: &OptionSet,
	name: &'static str,
	default: T,
	parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ConfigureError> {
	let Some(value) = options.get(name) else {
		return Ok(default);
	};
	let OptionValue::Enum(s) = value else {
		return Err(ConfigureError::Option {
			name,
			value: value.to_string(),
		});
	};
	parse(s).ok_or_else(|| ConfigureError::Option {
		name,
		value: s.clone(),
	})
}

impl BuildMode {
	/// Reads the build mode from the `target` option.
	pub fn from_options(options: &OptionSet) -> Result<Self, ConfigureError> {
		read_choice(options, "target", Self::ReleaseDebug, |s| match s {
			"release" => Some(Self::Release),
			"release_debug" => Some(Self::ReleaseDebug),
			"debug" => Some(Self::Debug),
			_ => None,
		})
	}
}

impl Optimize {
	/// Reads the optimization goal from the `optimize` option.
	pub fn from_options(options: &OptionSet) -> Result<Self, ConfigureError> {
		read_choice(options, "optimize", Self::Speed, |s| match s {
			"speed" => Some(Self::Speed),
			"size" => Some(Self::Size),
			_ => None,
		})
	}
}

impl DebugSymbols {
	/// Reads the verbosity from the `debug_symbols` option.
	pub fn from_options(options: &OptionSet) -> Result<Self, ConfigureError> {
		read_choice(options, "debug_symbols", Self::Yes, |s| match s {
			"no" => Some(Self::No),
			"yes" => Some(Self::Yes),
			"full" => Some(Self::Full),
			_ => None,
		})
	}
}

/// Returns the options declared by the platform, in the given revision.
pub fn platform_options(revision: Revision) -> Vec<OptionDescriptor> {
	let mut options = vec![
		OptionDescriptor::boolean(
			"use_sanitizer",
			"Use LLVM compiler address sanitizer",
			false,
		),
		OptionDescriptor::boolean(
			"use_leak_sanitizer",
			"Use LLVM compiler memory leaks sanitizer (implies use_sanitizer)",
			false,
		),
		OptionDescriptor::choice(
			"debug_symbols",
			"Add debugging symbols to release builds",
			"yes",
			&["yes", "no", "full"],
		),
	];
	if revision.has_touch() {
		options.push(OptionDescriptor::boolean(
			"separate_debug_symbols",
			"Create a separate file containing debugging symbols",
			false,
		));
		options.push(OptionDescriptor::boolean("touch", "Enable touch events", true));
	}
	options
}

/// Returns the engine-wide options the configurator reads.
pub fn engine_options() -> Vec<OptionDescriptor> {
	vec![
		OptionDescriptor::choice(
			"target",
			"Compilation target",
			"release_debug",
			&["debug", "release_debug", "release"],
		),
		OptionDescriptor::choice(
			"optimize",
			"Optimization type",
			"speed",
			&["speed", "size"],
		),
		OptionDescriptor::boolean("use_lto", "Use link-time optimization", false),
	]
}
