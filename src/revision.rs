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

//! Revisions of the platform integration.
//!
//! The platform integration went through several revisions. Rather than keeping one configurator
//! per revision, the differences are expressed as capabilities queried by the tables and the
//! configurator.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A revision of the platform integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
	/// Sanitizers and debug symbols only.
	Initial,
	/// Adds touch input and separate debug symbols.
	Touch,
	/// Adds the `DEVKITA64` override of the compiler directory.
	#[default]
	Current,
}

impl Revision {
	/// Every revision, oldest first.
	pub const ALL: [Self; 3] = [Self::Initial, Self::Touch, Self::Current];

	/// Returns the name of the revision.
	pub fn name(self) -> &'static str {
		match self {
			Self::Initial => "initial",
			Self::Touch => "touch",
			Self::Current => "current",
		}
	}

	/// Tells whether the `touch` and `separate_debug_symbols` options are declared.
	pub fn has_touch(self) -> bool {
		self >= Self::Touch
	}

	/// Tells whether the compiler directory may be overridden with `DEVKITA64`.
	pub fn honors_devkita64(self) -> bool {
		self >= Self::Current
	}
}

impl fmt::Display for Revision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Revision {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|r| r.name() == s)
			.ok_or_else(|| ConfigError::UnknownRevision(s.to_owned()))
	}
}
