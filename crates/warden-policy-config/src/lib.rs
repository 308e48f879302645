// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative policy configuration for `warden-policy`.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Policy declarations validated before they reach the runtime configuration
//! - Atomic reloads: [`PolicyConfig::apply`] replaces everything in one `configure` call
//!
//! # File format
//!
//! ```toml
//! ignore_missing_configuration = false
//! append_strategy = "union"
//!
//! [[targets]]
//! key = "Admin/Index"
//! policies = [
//!     { kind = "deny_anonymous_access" },
//!     { kind = "require_role", roles = ["admin", "owner"] },
//! ]
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use warden_policy::SecurityConfiguration;
//! use warden_policy_config::load_policy_config;
//!
//! let configuration = SecurityConfiguration::new();
//! load_policy_config()?.apply(&configuration)?;
//! ```

pub mod declaration;
pub mod error;
pub mod layer;
pub mod sources;

pub use declaration::{PolicyDecl, TargetDecl};
pub use error::PolicyConfigError;
pub use layer::PolicyConfigLayer;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};
use warden_policy::{PolicyAppendStrategy, SecurityConfiguration};

/// Fully resolved policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
	pub ignore_missing_configuration: bool,
	pub append_strategy: PolicyAppendStrategy,
	pub targets: Vec<TargetDecl>,
}

impl PolicyConfig {
	/// Replaces the runtime configuration with this one.
	///
	/// Runs as a single `configure` call, so concurrent readers see either the
	/// previous configuration or this one. On error nothing is published.
	pub fn apply(&self, configuration: &SecurityConfiguration) -> Result<(), PolicyConfigError> {
		configuration.configure(|c| {
			c.set_append_strategy(self.append_strategy)
				.ignore_missing_configuration(self.ignore_missing_configuration);

			for target in &self.targets {
				let mut container = c.for_target(target.key.clone());
				for decl in &target.policies {
					container.add_policy(decl.to_policy()?);
				}
			}
			Ok(())
		})?;

		debug!(targets = self.targets.len(), "policy configuration applied");
		Ok(())
	}
}

/// Load policy configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Policy file (`/etc/warden/policies.toml`)
/// 3. Built-in defaults
pub fn load_policy_config() -> Result<PolicyConfig, PolicyConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load policy configuration with a custom policy file path.
pub fn load_policy_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<PolicyConfig, PolicyConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<PolicyConfig, PolicyConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PolicyConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: PolicyConfigLayer) -> Result<PolicyConfig, PolicyConfigError> {
	let config = PolicyConfig {
		ignore_missing_configuration: layer.ignore_missing_configuration.unwrap_or(false),
		append_strategy: layer.append_strategy.unwrap_or_default(),
		targets: layer.targets,
	};

	validate_config(&config)?;

	info!(
		targets = config.targets.len(),
		append_strategy = %config.append_strategy,
		ignore_missing_configuration = config.ignore_missing_configuration,
		"Policy configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &PolicyConfig) -> Result<(), PolicyConfigError> {
	for target in &config.targets {
		for decl in &target.policies {
			decl.to_policy()?;
		}
	}
	Ok(())
}
