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

//! The third-party libraries the engine may either bundle or take from the system.

use crate::option::{OptionDescriptor, OptionSet, OptionValue};
use std::collections::BTreeMap;
use tracing::debug;

/// The flag enabling the editor tools.
pub const TOOLS: &str = "tools";

/// An optional third-party library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Library {
	Bullet,
	Enet,
	Freetype,
	Libogg,
	Libpng,
	Libtheora,
	Libvorbis,
	Libvpx,
	Libwebp,
	Wslay,
	Mbedtls,
	Miniupnpc,
	Opus,
	Pcre2,
	Squish,
	Zlib,
	Zstd,
}

impl Library {
	/// Every library, in the order of the flag matrix.
	pub const ALL: [Self; 17] = [
		Self::Bullet,
		Self::Enet,
		Self::Freetype,
		Self::Libogg,
		Self::Libpng,
		Self::Libtheora,
		Self::Libvorbis,
		Self::Libvpx,
		Self::Libwebp,
		Self::Wslay,
		Self::Mbedtls,
		Self::Miniupnpc,
		Self::Opus,
		Self::Pcre2,
		Self::Squish,
		Self::Zlib,
		Self::Zstd,
	];

	/// Returns the short name of the library.
	pub fn name(self) -> &'static str {
		match self {
			Self::Bullet => "bullet",
			Self::Enet => "enet",
			Self::Freetype => "freetype",
			Self::Libogg => "libogg",
			Self::Libpng => "libpng",
			Self::Libtheora => "libtheora",
			Self::Libvorbis => "libvorbis",
			Self::Libvpx => "libvpx",
			Self::Libwebp => "libwebp",
			Self::Wslay => "wslay",
			Self::Mbedtls => "mbedtls",
			Self::Miniupnpc => "miniupnpc",
			Self::Opus => "opus",
			Self::Pcre2 => "pcre2",
			Self::Squish => "squish",
			Self::Zlib => "zlib",
			Self::Zstd => "zstd",
		}
	}

	/// Returns the name of the flag selecting the bundled copy.
	pub fn flag(self) -> &'static str {
		match self {
			Self::Bullet => "builtin_bullet",
			Self::Enet => "builtin_enet",
			Self::Freetype => "builtin_freetype",
			Self::Libogg => "builtin_libogg",
			Self::Libpng => "builtin_libpng",
			Self::Libtheora => "builtin_libtheora",
			Self::Libvorbis => "builtin_libvorbis",
			Self::Libvpx => "builtin_libvpx",
			Self::Libwebp => "builtin_libwebp",
			Self::Wslay => "builtin_wslay",
			Self::Mbedtls => "builtin_mbedtls",
			Self::Miniupnpc => "builtin_miniupnpc",
			Self::Opus => "builtin_opus",
			Self::Pcre2 => "builtin_pcre2",
			Self::Squish => "builtin_squish",
			Self::Zlib => "builtin_zlib",
			Self::Zstd => "builtin_zstd",
		}
	}

	/// Tells whether the bundled copy is used by default.
	///
	/// The console's ported libraries do not ship enet nor squish, and ship a version of bullet
	/// too old for the engine.
	pub fn bundled_by_default(self) -> bool {
		matches!(self, Self::Bullet | Self::Enet | Self::Squish)
	}
}

/// Returns the flag matrix: each flag with its default value, in order.
pub fn flags() -> Vec<(&'static str, bool)> {
	let libraries = Library::ALL
		.into_iter()
		.map(|l| (l.flag(), l.bundled_by_default()));
	[(TOOLS, false)].into_iter().chain(libraries).collect()
}

/// Returns the flag matrix as option descriptors.
pub fn descriptors() -> Vec<OptionDescriptor> {
	[OptionDescriptor::boolean(TOOLS, "Build the editor tools", false)]
		.into_iter()
		.chain(Library::ALL.into_iter().map(|l| {
			OptionDescriptor::boolean(
				l.flag(),
				"Use the bundled copy of the library",
				l.bundled_by_default(),
			)
		}))
		.collect()
}

/// A change made to a flag to keep the libraries linkable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Forced {
	/// The library whose flag changed.
	pub library: Library,
	/// The library that required the change.
	pub by: Library,
	/// The new value of the flag.
	pub bundled: bool,
}

/// The bundling decision of each library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundling(BTreeMap<Library, bool>);

impl Bundling {
	/// Reads the flags from `options`, falling back to the defaults for the missing ones.
	pub fn from_options(options: &OptionSet) -> Self {
		Self(
			Library::ALL
				.into_iter()
				.map(|l| {
					let bundled = match options.get(l.flag()) {
						Some(OptionValue::Bool(b)) => *b,
						_ => l.bundled_by_default(),
					};
					(l, bundled)
				})
				.collect(),
		)
	}

	/// Tells whether the bundled copy of `library` is used.
	pub fn is_bundled(&self, library: Library) -> bool {
		self.0.get(&library).copied().unwrap_or(library.bundled_by_default())
	}

	fn force(&mut self, forced: &mut Vec<Forced>, library: Library, by: Library, bundled: bool) {
		if self.is_bundled(library) != bundled {
			self.0.insert(library, bundled);
			debug!(library = library.name(), by = by.name(), bundled, "forced");
			forced.push(Forced {
				library,
				by,
				bundled,
			});
		}
	}

	/// Applies the dependencies between libraries, returning the flags that changed.
	///
	/// The rules apply in a fixed order, each one seeing the result of the previous ones:
	/// - freetype, libpng and zlib are either all bundled or all taken from the system
	/// - the system's libtheora needs the system's libogg and libvorbis
	/// - the system's libvorbis needs the system's libogg
	/// - the system's opus needs the system's libogg
	pub fn resolve(&mut self) -> Vec<Forced> {
		let mut forced = vec![];
		let group = [Library::Freetype, Library::Libpng, Library::Zlib];
		if let Some(by) = group.into_iter().find(|l| self.is_bundled(*l)) {
			for l in group {
				self.force(&mut forced, l, by, true);
			}
		}
		if !self.is_bundled(Library::Libtheora) {
			self.force(&mut forced, Library::Libogg, Library::Libtheora, false);
			self.force(&mut forced, Library::Libvorbis, Library::Libtheora, false);
		}
		if !self.is_bundled(Library::Libvorbis) {
			self.force(&mut forced, Library::Libogg, Library::Libvorbis, false);
		}
		if !self.is_bundled(Library::Opus) {
			self.force(&mut forced, Library::Libogg, Library::Opus, false);
		}
		forced
	}

	/// Writes the decisions into `options`.
	pub fn write_to(&self, options: &mut OptionSet) {
		for (l, bundled) in &self.0 {
			options.insert(l.flag(), OptionValue::Bool(*bundled));
		}
	}
}
