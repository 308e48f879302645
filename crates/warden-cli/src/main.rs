// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden CLI
//!
//! Loads a policy file, then either prints the configured policies or checks
//! whether an actor may reach a target.
//!
//! Exit codes:
//! - `0`: report printed, or access allowed
//! - `1`: access denied
//! - `2`: the configuration could not be loaded or the target is not configured

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warden_policy::{
	ActorContext, Decision, JsonReporter, PolicyRunner, SecurityConfiguration, TargetKey,
	TextReporter,
};
use warden_policy_config::{load_policy_config, load_policy_config_with_file};

#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Args {
	/// Policy file (defaults to /etc/warden/policies.toml)
	#[arg(short, long, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	/// Log level used when RUST_LOG is not set
	#[arg(long, default_value = "warn")]
	log_level: tracing::Level,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print every configured target and its policies
	Report {
		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},

	/// Evaluate the policies of one target for an actor
	Check {
		/// Target key, e.g. "Admin/Index"
		target: TargetKey,

		/// Treat the actor as anonymous
		#[arg(long, conflicts_with = "roles")]
		anonymous: bool,

		/// Role held by the actor (repeatable)
		#[arg(long = "role", value_name = "ROLE")]
		roles: Vec<String>,
	},
}

fn init_tracing(level: tracing::Level) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("warden={level}")));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().compact().with_writer(std::io::stderr))
		.init();
}

fn load_configuration(path: Option<PathBuf>) -> Result<Arc<SecurityConfiguration>> {
	let config = match path {
		Some(path) => {
			ensure!(path.exists(), "policy file {} does not exist", path.display());
			load_policy_config_with_file(path)?
		}
		None => load_policy_config()?,
	};

	let configuration = Arc::new(SecurityConfiguration::new());
	config
		.apply(&configuration)
		.context("failed to apply policy configuration")?;
	Ok(configuration)
}

fn run(args: Args) -> Result<ExitCode> {
	let configuration = load_configuration(args.config)?;

	match args.command {
		Command::Report { json } => {
			let report = if json {
				configuration.what_do_i_have_with(&JsonReporter { pretty: true })
			} else {
				configuration.what_do_i_have_with(&TextReporter)
			};
			if !report.is_empty() {
				println!("{report}");
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Check {
			target,
			anonymous,
			roles,
		} => {
			let actor = if anonymous {
				ActorContext::anonymous()
			} else {
				ActorContext::authenticated(roles)
			};
			debug!(key = %target, ?actor, "checking access");

			let decision = PolicyRunner::new(configuration).run(&target, &actor)?;
			match decision {
				Decision::Allowed => {
					println!("allowed");
					Ok(ExitCode::SUCCESS)
				}
				Decision::Denied(violation) => {
					println!("denied: {violation}");
					Ok(ExitCode::from(1))
				}
			}
		}
	}
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_tracing(args.log_level);

	match run(args) {
		Ok(code) => code,
		Err(e) => {
			error!(error = %e, "warden failed");
			eprintln!("error: {e:#}");
			ExitCode::from(2)
		}
	}
}
