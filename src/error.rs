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

//! Errors returned by the configuration.

use std::{env::JoinPathsError, io, path::PathBuf};
use thiserror::Error;

/// An error while querying the package-config tool.
#[derive(Debug, Error)]
pub enum PkgConfigError {
	/// The program could not be started.
	#[error("cannot run `{command}`: {source}")]
	Spawn {
		command: String,
		#[source]
		source: io::Error,
	},
	/// The program exited with a failure status.
	#[error("`{command}` failed ({status})")]
	Status { command: String, status: String },
	/// The program printed something that is not valid UTF-8.
	#[error("`{command}` printed invalid UTF-8")]
	Utf8 { command: String },
	/// A module version could not be parsed.
	#[error("invalid module version `{0}`")]
	Version(String),
	/// The toolchain directories cannot be placed in a `PATH` variable.
	#[error("invalid search path: {0}")]
	SearchPath(#[from] JoinPathsError),
}

/// An error while reading the build configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The file could not be read.
	#[error("cannot read `{}`: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	/// The file is not valid TOML, or does not have the expected layout.
	#[error("cannot parse `{}`: {source}", .path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	/// The option is not declared for the selected revision.
	#[error("unknown option `{0}`")]
	UnknownOption(String),
	/// The value has the wrong type.
	#[error("option `{name}` expects {expected}")]
	Type { name: String, expected: &'static str },
	/// The value is not one of the allowed values.
	#[error("invalid value `{value}` for option `{name}` (allowed: {allowed})")]
	Value {
		name: String,
		value: String,
		allowed: String,
	},
	/// The revision name is not known.
	#[error("unknown revision `{0}`")]
	UnknownRevision(String),
	/// The job count is zero.
	#[error("the number of jobs must be at least 1")]
	Jobs,
}

/// An error while configuring the build environment.
#[derive(Debug, Error)]
pub enum ConfigureError {
	/// A package-config query failed.
	#[error(transparent)]
	PkgConfig(#[from] PkgConfigError),
	/// An option read by the configurator has a value it does not understand.
	#[error("invalid value `{value}` for option `{name}`")]
	Option { name: &'static str, value: String },
	/// The system's bullet was requested, but it is older than the engine requires.
	///
	/// Versions are kept as reported by package-config.
	#[error("bullet: system version {found} does not match minimal requirements ({required})")]
	BulletTooOld {
		found: String,
		required: &'static str,
	},
}

impl ConfigureError {
	/// Returns the exit status a front-end aborting on this error should use.
	pub fn exit_code(&self) -> u8 {
		match self {
			Self::BulletTooOld {
				..
			} => 255,
			_ => 1,
		}
	}
}
