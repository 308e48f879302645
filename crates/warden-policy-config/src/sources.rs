// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};
use warden_policy::PolicyAppendStrategy;

use crate::error::PolicyConfigError;
use crate::layer::PolicyConfigLayer;

pub const ENV_IGNORE_MISSING_CONFIGURATION: &str = "WARDEN_IGNORE_MISSING_CONFIGURATION";
pub const ENV_APPEND_STRATEGY: &str = "WARDEN_APPEND_STRATEGY";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<PolicyConfigLayer, PolicyConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<PolicyConfigLayer, PolicyConfigError> {
		debug!("loading defaults");
		Ok(PolicyConfigLayer {
			ignore_missing_configuration: Some(false),
			append_strategy: Some(PolicyAppendStrategy::default()),
			targets: Vec::new(),
		})
	}
}

/// TOML policy file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/warden/policies.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<PolicyConfigLayer, PolicyConfigError> {
		let content = match std::fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "policy file not found, skipping");
				return Ok(PolicyConfigLayer::default());
			}
			Err(source) => {
				return Err(PolicyConfigError::FileRead {
					path: self.path.clone(),
					source,
				})
			}
		};
		debug!(path = %self.path.display(), bytes = content.len(), "read policy file");

		let layer: PolicyConfigLayer =
			toml::from_str(&content).map_err(|e| PolicyConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!(targets = layer.targets.len(), "parsed policy layer from TOML");
		Ok(layer)
	}
}

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Environment variable source.
///
/// Convention: WARDEN_<FIELD>. Targets are only declared in files.
pub struct EnvSource {
	lookup: Box<EnvLookup>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn new() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Reads variables through `lookup` instead of the process environment.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn env_var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.trim().is_empty())
	}

	fn env_bool(&self, name: &str) -> Result<Option<bool>, PolicyConfigError> {
		match self.env_var(name) {
			Some(v) => match v.trim().to_ascii_lowercase().as_str() {
				"true" | "1" | "yes" => Ok(Some(true)),
				"false" | "0" | "no" => Ok(Some(false)),
				_ => Err(PolicyConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid boolean value '{v}'"),
				}),
			},
			None => Ok(None),
		}
	}

	fn env_strategy(&self, name: &str) -> Result<Option<PolicyAppendStrategy>, PolicyConfigError> {
		match self.env_var(name) {
			Some(v) => v
				.parse()
				.map(Some)
				.map_err(|e| PolicyConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("{e}"),
				}),
			None => Ok(None),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<PolicyConfigLayer, PolicyConfigError> {
		debug!("loading environment variables");
		Ok(PolicyConfigLayer {
			ignore_missing_configuration: self.env_bool(ENV_IGNORE_MISSING_CONFIGURATION)?,
			append_strategy: self.env_strategy(ENV_APPEND_STRATEGY)?,
			targets: Vec::new(),
		})
	}
}
