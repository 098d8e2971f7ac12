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

//! Command line front-end of the platform detection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use detect::{
	config::BuildConfig,
	error::ConfigureError,
	flags, option, probe, BuildEnvironment, Configurator, Revision, SystemHost,
};
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Subcommand)]
enum Command {
	/// Check whether the toolchain is installed
	Probe,
	/// List the platform's options
	Options,
	/// List the bundled library flags and their defaults
	Flags,
	/// Configure a build environment and print it
	Configure {
		/// The configuration file. Defaults to `build-config.toml` in the current directory
		#[arg(short, long)]
		config: Option<PathBuf>,
		/// Override the number of parallel jobs
		#[arg(short, long)]
		jobs: Option<usize>,
		/// Print the environment as JSON
		#[arg(long)]
		json: bool,
	},
}

/// Nintendo Switch platform detection and build environment configuration
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Cli {
	/// The revision of the platform integration
	#[arg(short, long, global = true)]
	revision: Option<Revision>,

	#[command(subcommand)]
	command: Command,
}

fn print_options(revision: Revision) {
	for desc in option::platform_options(revision) {
		let default = desc.default_value();
		match desc.kind {
			option::OptionKind::Bool {
				..
			} => println!("{}: {} (yes|no, default: {default})", desc.name, desc.help),
			option::OptionKind::Enum {
				values, ..
			} => println!(
				"{}: {} ({}, default: {default})",
				desc.name,
				desc.help,
				values.join("|")
			),
		}
	}
}

fn print_env(env: &BuildEnvironment) {
	println!("CC = {}", env.cc);
	println!("CXX = {}", env.cxx);
	println!("LD = {}", env.ld);
	println!("AR = {}", env.ar);
	println!("RANLIB = {}", env.ranlib);
	for var in detect::environment::Var::ALL {
		println!("{} = {}", var.name(), env.get(var).join(" "));
	}
	for (name, value) in &env.env {
		println!("ENV[{name}] = {value}");
	}
	if let Some(bits) = env.bits {
		println!("bits = {bits}");
	}
	println!("extra_suffix = {}", env.extra_suffix);
	println!("x86_libtheora_opt_gcc = {}", env.x86_libtheora_opt_gcc);
}

fn configure(
	revision: Option<Revision>,
	config: Option<PathBuf>,
	jobs: Option<usize>,
	json: bool,
) -> Result<ExitCode> {
	let mut build_config = match config {
		Some(path) => BuildConfig::read_file(&path, revision)?,
		None => {
			let dir = std::env::current_dir().context("cannot get the current directory")?;
			BuildConfig::read(&dir, revision)?
		}
	};
	if let Some(jobs) = jobs {
		build_config.context.jobs = jobs.max(1);
	}

	let host = SystemHost;
	if !probe::can_build(&host, build_config.revision) {
		return Ok(ExitCode::FAILURE);
	}
	let mut env = BuildEnvironment::default();
	let configurator = Configurator::new(&host, build_config.revision);
	let resolved = match configurator.configure(
		&mut env,
		&build_config.options,
		&build_config.context,
	) {
		Ok(resolved) => resolved,
		// Abort, but let the caller tell this failure apart from the others
		Err(e @ ConfigureError::BulletTooOld {
			..
		}) => {
			println!("{e}. Aborting.");
			return Ok(ExitCode::from(e.exit_code()));
		}
		Err(e) => return Err(e.into()),
	};

	if json {
		let out = serde_json::json!({
			"revision": build_config.revision,
			"options": resolved,
			"environment": env,
		});
		println!("{}", serde_json::to_string_pretty(&out)?);
	} else {
		print_env(&env);
	}
	Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli) -> Result<ExitCode> {
	let revision = cli.revision.unwrap_or_default();
	match cli.command {
		Command::Probe => {
			let ok = probe::can_build(&SystemHost, revision);
			if ok {
				println!("{} can be built", detect::NAME);
			}
			Ok(if ok {
				ExitCode::SUCCESS
			} else {
				ExitCode::FAILURE
			})
		}
		Command::Options => {
			print_options(revision);
			Ok(ExitCode::SUCCESS)
		}
		Command::Flags => {
			for (flag, default) in flags::flags() {
				println!("{flag} = {}", if default { "yes" } else { "no" });
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Configure {
			config,
			jobs,
			json,
		} => configure(cli.revision, config, jobs, json),
	}
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();
	let cli = Cli::parse();
	run(cli).unwrap_or_else(|e| {
		eprintln!("error: {e:#}");
		ExitCode::FAILURE
	})
}
