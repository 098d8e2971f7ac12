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

//! Detection and configuration of the Nintendo Switch platform, built with the devkitPro
//! toolchain (devkitA64 and libnx).
//!
//! The platform is offered only if [`probe::can_build`] succeeds. The options it declares are
//! listed by [`option::platform_options`] and [`flags::flags`]. Once the values are resolved,
//! [`configure::Configurator`] fills a [`environment::BuildEnvironment`] with the compilers,
//! flags and libraries to build the engine with.

pub mod compile;
pub mod config;
pub mod configure;
pub mod environment;
pub mod error;
pub mod flags;
pub mod host;
pub mod option;
pub mod pkgconfig;
pub mod probe;
pub mod revision;
pub mod toolchain;

pub use crate::{
	configure::{BuildContext, Configurator},
	environment::BuildEnvironment,
	host::{Host, SystemHost},
	option::OptionSet,
	revision::Revision,
};

/// The name of the platform.
pub const NAME: &str = "Switch";

/// Tells whether the platform is enabled. Whether it can actually be built is told by
/// [`probe::can_build`].
pub fn is_active() -> bool {
	true
}
