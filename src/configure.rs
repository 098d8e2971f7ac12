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

//! Configuration of the build environment for the platform.
//!
//! [`Configurator::configure`] runs the steps below once per build, in order:
//! 1. binding the cross-toolchain
//! 2. architecture flags
//! 3. SDK include and library directories
//! 4. build mode
//! 5. sanitizers
//! 6. link-time optimization
//! 7. third-party libraries
//! 8. platform definitions and system libraries

use crate::{
	environment::{BuildEnvironment, Var},
	error::{ConfigureError, PkgConfigError},
	flags::{Bundling, Library, TOOLS},
	host::{Host, SearchPath},
	option::{BuildMode, DebugSymbols, OptionSet, Optimize},
	pkgconfig::{parse_version, PkgConfig},
	revision::Revision,
	toolchain::{tool, ToolchainPaths},
};
use tracing::{debug, info};

/// The oldest system bullet the engine builds against.
pub const MIN_BULLET_VERSION: &str = "2.88";

/// Host machines on which the bundled libtheora can use its x86 assembly.
const X86_MACHINES: [&str; 4] = ["x86_64", "x86", "i386", "i586"];

/// Settings of the outer build tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildContext {
	/// The number of parallel jobs.
	pub jobs: usize,
}

impl Default for BuildContext {
	fn default() -> Self {
		Self {
			jobs: 1,
		}
	}
}

/// How a library taken from the system is added to the environment.
enum SystemLink {
	/// Flags reported by package-config for the given packages.
	Packages(&'static [&'static str]),
	/// Libraries linked directly, for libraries shipping no package-config file.
	Libs(&'static [&'static str]),
}

/// Libraries taken from the system, in the order they are added to the environment.
///
/// zlib is absent: the flags of the libraries depending on it already pull it in.
const SYSTEM_LIBRARIES: [(Library, SystemLink); 16] = [
	(Library::Freetype, SystemLink::Packages(&["freetype2"])),
	(Library::Libpng, SystemLink::Packages(&["libpng"])),
	(Library::Bullet, SystemLink::Packages(&["bullet"])),
	(Library::Enet, SystemLink::Packages(&["libenet"])),
	(Library::Squish, SystemLink::Packages(&["libsquish"])),
	(Library::Zstd, SystemLink::Packages(&["libzstd"])),
	// Media libraries pull each other in: ogg must come after its users
	(Library::Libtheora, SystemLink::Packages(&["theora", "theoradec"])),
	(Library::Libvpx, SystemLink::Packages(&["vpx"])),
	(Library::Libvorbis, SystemLink::Packages(&["vorbis", "vorbisfile"])),
	(Library::Opus, SystemLink::Packages(&["opus", "opusfile"])),
	(Library::Libogg, SystemLink::Packages(&["ogg"])),
	(Library::Libwebp, SystemLink::Packages(&["libwebp"])),
	(
		Library::Mbedtls,
		SystemLink::Libs(&["mbedtls", "mbedx509", "mbedcrypto"]),
	),
	(Library::Wslay, SystemLink::Packages(&["libwslay"])),
	(Library::Miniupnpc, SystemLink::Packages(&["miniupnpc"])),
	(Library::Pcre2, SystemLink::Packages(&["libpcre2-32"])),
];

/// Configures build environments for the platform.
pub struct Configurator<'h, H: Host + ?Sized> {
	host: &'h H,
	revision: Revision,
}

impl<'h, H: Host + ?Sized> Configurator<'h, H> {
	/// Creates a configurator using `host`, for the given revision.
	pub fn new(host: &'h H, revision: Revision) -> Self {
		Self {
			host,
			revision,
		}
	}

	/// Configures `env` with the resolved `options`.
	///
	/// On success, the function returns `options` updated with the bundling flags that had to be
	/// forced to keep the libraries linkable.
	///
	/// On failure, `env` is left as it was.
	///
	/// The process environment is left untouched: programs are resolved through the search path
	/// stored in the `PATH` entry of [`BuildEnvironment::env`].
	pub fn configure(
		&self,
		env: &mut BuildEnvironment,
		options: &OptionSet,
		ctx: &BuildContext,
	) -> Result<OptionSet, ConfigureError> {
		let mut next = env.clone();
		let resolved = self.configure_into(&mut next, options, ctx)?;
		*env = next;
		Ok(resolved)
	}

	fn configure_into(
		&self,
		env: &mut BuildEnvironment,
		options: &OptionSet,
		ctx: &BuildContext,
	) -> Result<OptionSet, ConfigureError> {
		let paths = ToolchainPaths::from_host(self.host, self.revision);
		let search_path = paths.search_path(self.host.var("PATH"));
		info!(
			devkitpro = %paths.devkitpro.display(),
			revision = %self.revision,
			"configuring"
		);

		bind_toolchain(env, &paths, &search_path)?;
		add_arch_flags(env, &paths);
		add_sdk_paths(env, &paths);
		let mode = BuildMode::from_options(options)?;
		debug!(?mode, "build mode");
		apply_build_mode(
			env,
			mode,
			Optimize::from_options(options)?,
			DebugSymbols::from_options(options)?,
		);
		env.bits = Some(64);
		apply_sanitizers(env, options);
		apply_lto(env, options.flag("use_lto"), ctx.jobs);
		env.append(Var::CcFlags, ["-pipe"]);
		env.append(Var::LinkFlags, ["-pipe"]);

		if self.revision.has_touch() && options.flag("touch") {
			env.append(Var::CppFlags, ["-DTOUCH_ENABLED"]);
		}
		let pkg = PkgConfig::new(self.host, tool("pkg-config"), &search_path)?;
		let resolved = self.add_libraries(env, options, &pkg)?;

		finalize(env);
		Ok(resolved)
	}

	/// Resolves the bundling flags, then adds the libraries taken from the system.
	fn add_libraries(
		&self,
		env: &mut BuildEnvironment,
		options: &OptionSet,
		pkg: &PkgConfig<'_, H>,
	) -> Result<OptionSet, ConfigureError> {
		let mut bundling = Bundling::from_options(options);
		bundling.resolve();
		let mut resolved = options.clone();
		bundling.write_to(&mut resolved);

		let tools = options.flag(TOOLS);
		for (library, link) in &SYSTEM_LIBRARIES {
			let library = *library;
			if bundling.is_bundled(library) {
				if library == Library::Libtheora && is_x86(&self.host.machine()) {
					env.x86_libtheora_opt_gcc = true;
				}
				continue;
			}
			// The texture compressor is only used by the editor
			if library == Library::Squish && !tools {
				continue;
			}
			if library == Library::Bullet {
				check_bullet(pkg)?;
			}
			debug!(library = library.name(), "using system library");
			match link {
				SystemLink::Packages(packages) => env.merge(pkg.flags(packages)?),
				SystemLink::Libs(libs) => env.append(Var::Libs, libs.iter().copied()),
			}
		}
		Ok(resolved)
	}
}

/// Tells whether `machine` names an x86 host.
fn is_x86(machine: &str) -> bool {
	!machine.is_empty() && X86_MACHINES.iter().any(|m| m.contains(machine))
}

/// Fails if the system's bullet is older than [`MIN_BULLET_VERSION`].
fn check_bullet<H: Host + ?Sized>(pkg: &PkgConfig<'_, H>) -> Result<(), ConfigureError> {
	let found = pkg.modversion("bullet")?;
	if parse_version(&found)? < parse_version(MIN_BULLET_VERSION)? {
		return Err(ConfigureError::BulletTooOld {
			found,
			required: MIN_BULLET_VERSION,
		});
	}
	Ok(())
}

/// Selects the cross-toolchain and the search path of the programs run by the build.
fn bind_toolchain(
	env: &mut BuildEnvironment,
	paths: &ToolchainPaths,
	search_path: &SearchPath,
) -> Result<(), ConfigureError> {
	env.cc = tool("gcc");
	env.cxx = tool("g++");
	env.ld = tool("ld");
	let joined = search_path
		.join()
		.map_err(PkgConfigError::from)?;
	env.env.insert(
		"DEVKITPRO".to_owned(),
		paths.devkitpro.to_string_lossy().into_owned(),
	);
	env.env
		.insert("PATH".to_owned(), joined.to_string_lossy().into_owned());
	Ok(())
}

/// Flags selecting the target processor.
fn arch_flags() -> [&'static str; 4] {
	["-march=armv8-a", "-mtune=cortex-a57", "-mtp=soft", "-fPIE"]
}

fn add_arch_flags(env: &mut BuildEnvironment, paths: &ToolchainPaths) {
	env.prepend(
		Var::CcFlags,
		arch_flags().into_iter().chain(["-ffunction-sections"]),
	);
	let specs = format!("-specs={}", paths.specs().display());
	env.prepend(
		Var::LinkFlags,
		arch_flags().into_iter().map(str::to_owned).chain([specs]),
	);
}

fn add_sdk_paths(env: &mut BuildEnvironment, paths: &ToolchainPaths) {
	let portlibs = paths.portlibs();
	let libnx = paths.libnx();
	env.prepend(
		Var::CppPath,
		[portlibs.join("include").to_string_lossy().into_owned()],
	);
	env.prepend(
		Var::CppFlags,
		[
			"-isystem".to_owned(),
			libnx.join("include").to_string_lossy().into_owned(),
		],
	);
	env.prepend(
		Var::CppFlags,
		[
			"-D__SWITCH__",
			"-DPOSH_COMPILER_GCC",
			"-DPOSH_OS_HORIZON",
			"-DPOSH_OS_STRING=\\\"horizon\\\"",
		],
	);
	env.append(
		Var::LibPath,
		[portlibs.join("lib"), libnx.join("lib")].map(|p| p.to_string_lossy().into_owned()),
	);
}

/// Adds the optimization and debugging flags of `mode`.
fn apply_build_mode(
	env: &mut BuildEnvironment,
	mode: BuildMode,
	optimize: Optimize,
	symbols: DebugSymbols,
) {
	let optimization: &[&str] = match (mode, optimize) {
		// `-O3 -ffast-math` is `-Ofast`, split so that fast math can be disabled per file
		(BuildMode::Release, Optimize::Speed) => &["-O3", "-ffast-math"],
		(BuildMode::Release, Optimize::Size) => &["-Os"],
		(BuildMode::ReleaseDebug, Optimize::Speed) => &["-O2", "-ffast-math", "-DDEBUG_ENABLED"],
		(BuildMode::ReleaseDebug, Optimize::Size) => &["-Os", "-DDEBUG_ENABLED"],
		(BuildMode::Debug, _) => {
			env.prepend(
				Var::CcFlags,
				["-g3", "-DDEBUG_ENABLED", "-DDEBUG_MEMORY_ENABLED"],
			);
			return;
		}
	};
	env.prepend(Var::CcFlags, optimization.iter().copied());
	match symbols {
		DebugSymbols::No => {}
		DebugSymbols::Yes => env.prepend(Var::CcFlags, ["-g1"]),
		DebugSymbols::Full => env.prepend(Var::CcFlags, ["-g2"]),
	}
}

/// Adds the sanitizers. The leak sanitizer always comes with the address sanitizer.
fn apply_sanitizers(env: &mut BuildEnvironment, options: &OptionSet) {
	let leak = options.flag("use_leak_sanitizer");
	if !options.flag("use_sanitizer") && !leak {
		return;
	}
	env.append(
		Var::CcFlags,
		["-fsanitize=address", "-fno-omit-frame-pointer"],
	);
	env.append(Var::LinkFlags, ["-fsanitize=address"]);
	env.extra_suffix.push('s');
	if leak {
		env.append(Var::CcFlags, ["-fsanitize=leak"]);
		env.append(Var::LinkFlags, ["-fsanitize=leak"]);
	}
}

/// Selects the archiver, enabling link-time optimization with `jobs` parallel jobs if `lto` is
/// set.
fn apply_lto(env: &mut BuildEnvironment, lto: bool, jobs: usize) {
	if !lto {
		env.ar = tool("ar");
		env.ranlib = tool("ranlib");
		return;
	}
	env.append(Var::CcFlags, ["-flto"]);
	if jobs > 1 {
		env.append(Var::LinkFlags, [format!("-flto={jobs}")]);
	} else {
		env.append(Var::LinkFlags, ["-flto"]);
	}
	env.ar = tool("gcc-ar");
	env.ranlib = tool("gcc-ranlib");
}

/// Adds the platform's definitions and system libraries.
fn finalize(env: &mut BuildEnvironment) {
	env.append(Var::CppPath, ["#platform/switch"]);
	env.append(
		Var::CppFlags,
		[
			"-DHOMEBREW_ENABLED",
			"-DHORIZON_ENABLED",
			"-DLIBC_FILEIO_ENABLED",
			"-DOPENGL_ENABLED",
			"-DGLES_ENABLED",
			"-DPTHREAD_ENABLED",
			"-DPTHREAD_NO_RENAME",
		],
	);
	env.append(Var::Libs, ["EGL", "GLESv2", "glapi", "drm_nouveau", "nx"]);
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		flags,
		host::fake::FakeHost,
		option::{engine_options, platform_options, OptionValue},
	};

	const PKG_CONFIG: &str = "aarch64-none-elf-pkg-config";

	/// Libraries taken from the system with the default flags, with the libraries they report.
	const DEFAULT_QUERIES: [(&str, &str); 12] = [
		("freetype2", "-I/dkp/portlibs/switch/include/freetype2 -lfreetype -lpng -lz"),
		("libpng", "-lpng -lz"),
		("libzstd", "-lzstd"),
		("theora theoradec", "-ltheoradec -ltheora -logg"),
		("vpx", "-lvpx"),
		("vorbis vorbisfile", "-lvorbisfile -lvorbis -logg"),
		("opus opusfile", "-lopusfile -lopus -logg"),
		("ogg", "-logg"),
		("libwebp", "-lwebp"),
		("libwslay", "-lwslay"),
		("miniupnpc", "-lminiupnpc"),
		("libpcre2-32", "-lpcre2-32"),
	];

	fn query(packages: &str) -> String {
		format!("{PKG_CONFIG} {packages} --cflags --libs")
	}

	fn host() -> FakeHost {
		let mut host = FakeHost::new()
			.with_var("DEVKITPRO", "/dkp")
			.with_var("PATH", "/usr/bin:/bin")
			.with_output(&query("bullet"), "-lBulletDynamics -lLinearMath")
			.with_output(&query("libenet"), "-lenet")
			.with_output(&query("libsquish"), "-lsquish");
		for (packages, out) in DEFAULT_QUERIES {
			host = host.with_output(&query(packages), out);
		}
		host
	}

	fn options(overrides: &[(&str, OptionValue)]) -> OptionSet {
		let descriptors: Vec<_> = platform_options(Revision::Current)
			.into_iter()
			.chain(engine_options())
			.chain(flags::descriptors())
			.collect();
		let mut options = OptionSet::with_defaults(&descriptors);
		for (name, value) in overrides {
			options.insert(*name, value.clone());
		}
		options
	}

	fn choice(s: &str) -> OptionValue {
		OptionValue::Enum(s.to_owned())
	}

	fn configure(
		host: &FakeHost,
		overrides: &[(&str, OptionValue)],
		jobs: usize,
	) -> Result<(BuildEnvironment, OptionSet), ConfigureError> {
		let mut env = BuildEnvironment::default();
		let resolved = Configurator::new(host, Revision::Current).configure(
			&mut env,
			&options(overrides),
			&BuildContext {
				jobs,
			},
		)?;
		Ok((env, resolved))
	}

	#[test]
	fn default_configuration() {
		let host = host();
		let (env, resolved) = configure(&host, &[], 1).unwrap();
		assert_eq!(env.cc, "aarch64-none-elf-gcc");
		assert_eq!(env.cxx, "aarch64-none-elf-g++");
		assert_eq!(env.ld, "aarch64-none-elf-ld");
		assert_eq!(env.ar, "aarch64-none-elf-ar");
		assert_eq!(env.ranlib, "aarch64-none-elf-ranlib");
		assert_eq!(env.bits, Some(64));
		assert_eq!(env.env["DEVKITPRO"], "/dkp");
		assert_eq!(
			env.env["PATH"],
			"/dkp/portlibs/switch/bin:/dkp/devkitA64/bin:/usr/bin:/bin"
		);
		assert_eq!(
			env.ccflags[..10],
			[
				"-g1",
				"-O2",
				"-ffast-math",
				"-DDEBUG_ENABLED",
				"-march=armv8-a",
				"-mtune=cortex-a57",
				"-mtp=soft",
				"-fPIE",
				"-ffunction-sections",
				"-pipe",
			]
		);
		assert_eq!(
			env.linkflags,
			[
				"-march=armv8-a",
				"-mtune=cortex-a57",
				"-mtp=soft",
				"-fPIE",
				"-specs=/dkp/libnx/switch.specs",
				"-pipe",
			]
		);
		assert_eq!(
			env.cppflags[..6],
			[
				"-D__SWITCH__",
				"-DPOSH_COMPILER_GCC",
				"-DPOSH_OS_HORIZON",
				"-DPOSH_OS_STRING=\\\"horizon\\\"",
				"-isystem",
				"/dkp/libnx/include",
			]
		);
		assert!(env.contains(Var::CppFlags, "-DTOUCH_ENABLED"));
		assert!(env.cppflags.ends_with(&["-DPTHREAD_ENABLED".to_owned(), "-DPTHREAD_NO_RENAME".to_owned()]));
		assert_eq!(
			env.cpppath,
			[
				"/dkp/portlibs/switch/include",
				"/dkp/portlibs/switch/include/freetype2",
				"#platform/switch",
			]
		);
		assert_eq!(env.libpath, ["/dkp/portlibs/switch/lib", "/dkp/libnx/lib"]);
		assert!(env.libs.ends_with(
			&["EGL", "GLESv2", "glapi", "drm_nouveau", "nx"].map(str::to_owned)
		));
		assert!(env.contains(Var::Libs, "mbedtls"));
		assert!(env.contains(Var::Libs, "mbedx509"));
		assert!(env.contains(Var::Libs, "mbedcrypto"));
		assert!(env.extra_suffix.is_empty());
		assert_eq!(resolved, options(&[]));

		let expected: Vec<String> = DEFAULT_QUERIES.iter().map(|(p, _)| query(p)).collect();
		assert_eq!(host.lines(), expected);
	}

	#[test]
	fn search_path_is_explicit() {
		let host = host();
		configure(&host, &[], 1).unwrap();
		for cmd in host.calls.borrow().iter() {
			let path = cmd.path.as_ref().unwrap().to_str().unwrap();
			assert!(path.starts_with("/dkp/portlibs/switch/bin:/dkp/devkitA64/bin:"));
			assert!(path.ends_with("/usr/bin:/bin"));
		}
	}

	#[test]
	fn build_modes_are_disjoint() {
		let markers: [(BuildMode, &[&str]); 3] = [
			(BuildMode::Release, &["-O3"]),
			(BuildMode::ReleaseDebug, &["-O2"]),
			(BuildMode::Debug, &["-g3", "-DDEBUG_MEMORY_ENABLED"]),
		];
		for (mode, _) in markers {
			let mut env = BuildEnvironment::default();
			apply_build_mode(&mut env, mode, Optimize::Speed, DebugSymbols::Full);
			for (other, flags) in markers {
				let present = flags.iter().all(|f| env.contains(Var::CcFlags, f));
				let absent = flags.iter().all(|f| !env.contains(Var::CcFlags, f));
				if other == mode {
					assert!(present, "{mode:?}");
				} else {
					assert!(absent, "{mode:?} has flags of {other:?}");
				}
			}
			assert_eq!(
				env.contains(Var::CcFlags, "-DDEBUG_ENABLED"),
				mode != BuildMode::Release
			);
		}
	}

	#[test]
	fn release_flags() {
		let mut env = BuildEnvironment::default();
		apply_build_mode(&mut env, BuildMode::Release, Optimize::Size, DebugSymbols::No);
		assert_eq!(env.ccflags, ["-Os"]);
		let mut env = BuildEnvironment::default();
		apply_build_mode(&mut env, BuildMode::Release, Optimize::Speed, DebugSymbols::Full);
		assert_eq!(env.ccflags, ["-g2", "-O3", "-ffast-math"]);
		let mut env = BuildEnvironment::default();
		apply_build_mode(&mut env, BuildMode::Debug, Optimize::Size, DebugSymbols::No);
		assert_eq!(env.ccflags, ["-g3", "-DDEBUG_ENABLED", "-DDEBUG_MEMORY_ENABLED"]);
	}

	#[test]
	fn leak_sanitizer_implies_address_sanitizer() {
		let host = host();
		let (env, _) = configure(&host, &[("use_leak_sanitizer", OptionValue::Bool(true))], 1)
			.unwrap();
		for flag in ["-fsanitize=address", "-fno-omit-frame-pointer", "-fsanitize=leak"] {
			assert!(env.contains(Var::CcFlags, flag));
		}
		assert!(env.contains(Var::LinkFlags, "-fsanitize=address"));
		assert!(env.contains(Var::LinkFlags, "-fsanitize=leak"));
		assert_eq!(env.extra_suffix, "s");

		let (env, _) = configure(&host, &[("use_sanitizer", OptionValue::Bool(true))], 1).unwrap();
		assert!(env.contains(Var::CcFlags, "-fsanitize=address"));
		assert!(!env.contains(Var::CcFlags, "-fsanitize=leak"));
	}

	#[test]
	fn lto_jobs() {
		let host = host();
		let lto = [("use_lto", OptionValue::Bool(true))];
		let (env, _) = configure(&host, &lto, 1).unwrap();
		assert!(env.contains(Var::CcFlags, "-flto"));
		assert!(env.contains(Var::LinkFlags, "-flto"));
		assert!(!env.linkflags.iter().any(|f| f.starts_with("-flto=")));
		assert_eq!(env.ar, "aarch64-none-elf-gcc-ar");
		assert_eq!(env.ranlib, "aarch64-none-elf-gcc-ranlib");

		let (env, _) = configure(&host, &lto, 4).unwrap();
		assert!(env.contains(Var::LinkFlags, "-flto=4"));
		assert!(!env.contains(Var::LinkFlags, "-flto"));
	}

	#[test]
	fn forced_bundling() {
		let host = host();
		let (_, resolved) =
			configure(&host, &[("builtin_zlib", OptionValue::Bool(true))], 1).unwrap();
		assert!(resolved.flag("builtin_freetype"));
		assert!(resolved.flag("builtin_libpng"));
		assert!(resolved.flag("builtin_zlib"));
		let lines = host.lines();
		assert!(!lines.contains(&query("freetype2")));
		assert!(!lines.contains(&query("libpng")));
	}

	#[test]
	fn system_theora_forces_system_ogg() {
		let host = host();
		let (_, resolved) = configure(
			&host,
			&[
				("builtin_libogg", OptionValue::Bool(true)),
				("builtin_libvorbis", OptionValue::Bool(true)),
			],
			1,
		)
		.unwrap();
		assert!(!resolved.flag("builtin_libogg"));
		assert!(!resolved.flag("builtin_libvorbis"));
		assert!(host.lines().contains(&query("ogg")));
	}

	#[test]
	fn bullet_too_old() {
		let host = host().with_output(&format!("{PKG_CONFIG} bullet --modversion"), "2.87\n");
		let err = configure(&host, &[("builtin_bullet", OptionValue::Bool(false))], 1).unwrap_err();
		assert!(matches!(
			&err,
			ConfigureError::BulletTooOld {
				found,
				required: "2.88",
			} if found == "2.87"
		));
		assert_eq!(err.exit_code(), 255);
		assert_eq!(
			err.to_string(),
			"bullet: system version 2.87 does not match minimal requirements (2.88)"
		);
		// Nothing is queried after the version check
		assert_eq!(
			host.lines(),
			[
				query("freetype2"),
				query("libpng"),
				format!("{PKG_CONFIG} bullet --modversion"),
			]
		);
	}

	#[test]
	fn failure_leaves_environment_untouched() {
		let host = host().with_output(&format!("{PKG_CONFIG} bullet --modversion"), "2.87\n");
		let mut env = BuildEnvironment::default();
		env.append(Var::Libs, ["m"]);
		let before = env.clone();
		let options = options(&[("builtin_bullet", OptionValue::Bool(false))]);
		let res = Configurator::new(&host, Revision::Current).configure(
			&mut env,
			&options,
			&BuildContext::default(),
		);
		assert!(res.is_err());
		assert_eq!(env, before);

		// A failing query after some libraries were merged
		let host = FakeHost::new()
			.with_var("DEVKITPRO", "/dkp")
			.with_output(&query("freetype2"), "-lfreetype")
			.with_failure(&query("libpng"));
		let res = Configurator::new(&host, Revision::Current).configure(
			&mut env,
			&self::options(&[]),
			&BuildContext::default(),
		);
		assert!(matches!(res, Err(ConfigureError::PkgConfig(_))));
		assert_eq!(env, before);
	}

	#[test]
	fn bullet_recent_enough() {
		let host = host().with_output(&format!("{PKG_CONFIG} bullet --modversion"), "2.89\n");
		let (env, _) = configure(&host, &[("builtin_bullet", OptionValue::Bool(false))], 1).unwrap();
		assert!(env.contains(Var::Libs, "BulletDynamics"));
		assert!(host.lines().contains(&query("bullet")));
	}

	#[test]
	fn squish_only_for_tools() {
		let host = host();
		configure(&host, &[("builtin_squish", OptionValue::Bool(false))], 1).unwrap();
		assert!(!host.lines().contains(&query("libsquish")));

		let host = self::host();
		configure(
			&host,
			&[
				("builtin_squish", OptionValue::Bool(false)),
				("tools", OptionValue::Bool(true)),
			],
			1,
		)
		.unwrap();
		assert!(host.lines().contains(&query("libsquish")));
	}

	#[test]
	fn bundled_theora_on_x86() {
		let host = host().with_machine("x86_64");
		let (env, _) = configure(&host, &[("builtin_libtheora", OptionValue::Bool(true))], 1)
			.unwrap();
		assert!(env.x86_libtheora_opt_gcc);

		let host = self::host().with_machine("aarch64");
		let (env, _) = configure(&host, &[("builtin_libtheora", OptionValue::Bool(true))], 1)
			.unwrap();
		assert!(!env.x86_libtheora_opt_gcc);
	}

	#[test]
	fn invalid_target() {
		let host = host();
		let err = configure(&host, &[("target", choice("profile"))], 1).unwrap_err();
		assert!(matches!(
			err,
			ConfigureError::Option {
				name: "target",
				..
			}
		));
		assert!(host.lines().is_empty());
	}

	#[test]
	fn initial_revision_has_no_touch() {
		let host = host();
		let mut env = BuildEnvironment::default();
		let mut options = options(&[]);
		options.insert("target", choice("debug"));
		Configurator::new(&host, Revision::Initial)
			.configure(&mut env, &options, &BuildContext::default())
			.unwrap();
		assert!(!env.contains(Var::CppFlags, "-DTOUCH_ENABLED"));
		assert_eq!(env.ccflags[..3], ["-g3", "-DDEBUG_ENABLED", "-DDEBUG_MEMORY_ENABLED"]);
	}

	#[test]
	fn is_x86_machines() {
		assert!(is_x86("x86_64"));
		assert!(is_x86("i386"));
		assert!(!is_x86("i686"));
		assert!(!is_x86("aarch64"));
		assert!(!is_x86(""));
	}
}
