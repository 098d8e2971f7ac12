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

//! This file implements the build configuration file.
//!
//! The file overrides the defaults of the declared options:
//!
//! ```toml
//! revision = "current"
//!
//! [options]
//! target = "release"
//! use_lto = true
//! builtin_freetype = true
//!
//! [build]
//! jobs = 8
//! ```

use crate::{
	configure::BuildContext,
	error::ConfigError,
	flags,
	option::{
		engine_options, platform_options, OptionDescriptor, OptionKind, OptionSet, OptionValue,
	},
	revision::Revision,
};
use serde::Deserialize;
use std::{
	fs, io,
	path::{Path, PathBuf},
};

/// The name of the configuration file.
pub const FILE: &str = "build-config.toml";
/// The name of the file used when [`FILE`] does not exist.
pub const FILE_DEFAULT: &str = "default.build-config.toml";

/// The `[build]` section.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildSection {
	/// The number of parallel jobs.
	jobs: Option<usize>,
}

/// The content of the file.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
	/// The revision of the platform integration.
	revision: Option<String>,
	/// Option overrides.
	#[serde(default)]
	options: toml::Table,
	/// Build tool settings.
	#[serde(default)]
	build: BuildSection,
}

/// Returns every option that can be set for `revision`: platform options, engine options and the
/// flag matrix.
pub fn surface(revision: Revision) -> Vec<OptionDescriptor> {
	platform_options(revision)
		.into_iter()
		.chain(engine_options())
		.chain(flags::descriptors())
		.collect()
}

/// Converts a value of the file into the value of the option `desc`.
fn parse_value(desc: &OptionDescriptor, value: &toml::Value) -> Result<OptionValue, ConfigError> {
	match desc.kind {
		OptionKind::Bool {
			..
		} => match value {
			toml::Value::Boolean(b) => Ok(OptionValue::Bool(*b)),
			toml::Value::String(s) => match s.as_str() {
				"yes" | "true" | "on" | "1" => Ok(OptionValue::Bool(true)),
				"no" | "false" | "off" | "0" => Ok(OptionValue::Bool(false)),
				_ => Err(ConfigError::Value {
					name: desc.name.to_owned(),
					value: s.clone(),
					allowed: "yes, no".to_owned(),
				}),
			},
			_ => Err(ConfigError::Type {
				name: desc.name.to_owned(),
				expected: "a boolean",
			}),
		},
		OptionKind::Enum {
			values, ..
		} => {
			let toml::Value::String(s) = value else {
				return Err(ConfigError::Type {
					name: desc.name.to_owned(),
					expected: "a string",
				});
			};
			if !values.iter().any(|v| *v == s.as_str()) {
				return Err(ConfigError::Value {
					name: desc.name.to_owned(),
					value: s.clone(),
					allowed: values.join(", "),
				});
			}
			Ok(OptionValue::Enum(s.clone()))
		}
	}
}

/// The build configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
	/// The revision of the platform integration.
	pub revision: Revision,
	/// The option values, defaults included.
	pub options: OptionSet,
	/// Build tool settings.
	pub context: BuildContext,
}

impl Default for BuildConfig {
	fn default() -> Self {
		let revision = Revision::default();
		Self {
			revision,
			options: OptionSet::with_defaults(&surface(revision)),
			context: BuildContext::default(),
		}
	}
}

impl BuildConfig {
	/// Parses a configuration from the content of a file.
	///
	/// `path` is only used in error messages. If `revision` is set, it takes precedence over the
	/// revision of the file.
	pub fn parse(
		content: &str,
		path: &Path,
		revision: Option<Revision>,
	) -> Result<Self, ConfigError> {
		let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
			path: path.to_owned(),
			source,
		})?;
		let revision = match (revision, file.revision) {
			(Some(r), _) => r,
			(None, Some(r)) => r.parse()?,
			(None, None) => Revision::default(),
		};
		let surface = surface(revision);
		let mut options = OptionSet::with_defaults(&surface);
		for (name, value) in &file.options {
			let desc = surface
				.iter()
				.find(|d| d.name == name.as_str())
				.ok_or_else(|| ConfigError::UnknownOption(name.clone()))?;
			options.insert(name.as_str(), parse_value(desc, value)?);
		}
		let jobs = file.build.jobs.unwrap_or(1);
		if jobs == 0 {
			return Err(ConfigError::Jobs);
		}
		Ok(Self {
			revision,
			options,
			context: BuildContext {
				jobs,
			},
		})
	}

	/// Reads the configuration file at `path`.
	pub fn read_file(path: &Path, revision: Option<Revision>) -> Result<Self, ConfigError> {
		let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_owned(),
			source,
		})?;
		Self::parse(&content, path, revision)
	}

	/// Reads the configuration file of the directory `dir`.
	///
	/// If [`FILE`] does not exist, [`FILE_DEFAULT`] is read instead. If neither exists, the
	/// defaults are used.
	pub fn read(dir: &Path, revision: Option<Revision>) -> Result<Self, ConfigError> {
		for name in [FILE, FILE_DEFAULT] {
			let path: PathBuf = dir.join(name);
			match fs::read_to_string(&path) {
				Ok(content) => return Self::parse(&content, &path, revision),
				// Fallback to the next file
				Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
				Err(source) => {
					return Err(ConfigError::Io {
						path,
						source,
					})
				}
			}
		}
		let revision = revision.unwrap_or_default();
		Ok(Self {
			revision,
			options: OptionSet::with_defaults(&surface(revision)),
			context: BuildContext::default(),
		})
	}
}
