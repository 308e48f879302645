// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core identifier types for policy evaluation.
//!
//! - [`Role`]: an opaque role claim carried by an actor or required by a policy
//! - [`TargetKey`]: identifies the protected thing (e.g. a controller action)
//!
//! Both are string newtypes with transparent serde serialization, so they
//! appear as plain strings in TOML policy files and JSON reports. Neither may
//! contain control characters: the text report is line- and tab-delimited.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

// =============================================================================
// Name Newtypes
// =============================================================================

macro_rules! define_name_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Get the inner string value.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Consume the value and return the inner string.
			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
	};
}

define_name_type!(Role, "A role claim, compared by exact string match.");
define_name_type!(
	TargetKey,
	"Identifier of a protected request target, never empty."
);

// =============================================================================
// Role
// =============================================================================

impl Role {
	/// Create a role claim from any string-like value, unchecked.
	///
	/// Claims arriving from an authenticated actor are taken as-is; roles that
	/// a policy requires are checked with [`Role::parse`].
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// Create a role, rejecting blank names and control characters.
	pub fn parse(name: impl Into<String>) -> Result<Self, ConfigurationError> {
		let role = Self(name.into());
		role.validate()?;
		Ok(role)
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
		if self.0.trim().is_empty() || has_control_chars(&self.0) {
			return Err(ConfigurationError::InvalidRole {
				role: self.0.clone(),
			});
		}
		Ok(())
	}
}

impl From<&str> for Role {
	fn from(name: &str) -> Self {
		Self(name.to_string())
	}
}

impl From<String> for Role {
	fn from(name: String) -> Self {
		Self(name)
	}
}

impl From<&Role> for Role {
	fn from(role: &Role) -> Self {
		role.clone()
	}
}

impl<'de> Deserialize<'de> for Role {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let name = String::deserialize(deserializer)?;
		Self::parse(name).map_err(serde::de::Error::custom)
	}
}

fn has_control_chars(value: &str) -> bool {
	value.chars().any(char::is_control)
}

/// Renders roles as `a, b, c`.
pub(crate) fn join_roles(roles: &[Role], separator: &str) -> String {
	roles
		.iter()
		.map(Role::as_str)
		.collect::<Vec<_>>()
		.join(separator)
}

// =============================================================================
// TargetKey
// =============================================================================

impl TargetKey {
	/// Create a target key, rejecting blank values and control characters.
	pub fn new(key: impl Into<String>) -> Result<Self, ConfigurationError> {
		let key = key.into();
		if key.trim().is_empty() {
			return Err(ConfigurationError::EmptyTargetKey);
		}
		if has_control_chars(&key) {
			return Err(ConfigurationError::InvalidTargetKey { key });
		}
		Ok(Self(key))
	}

	/// Build the conventional `Controller/Action` key.
	pub fn action(controller: &str, action: &str) -> Result<Self, ConfigurationError> {
		if controller.trim().is_empty() || action.trim().is_empty() {
			return Err(ConfigurationError::EmptyTargetKey);
		}
		Self::new(format!("{controller}/{action}"))
	}
}

impl TryFrom<String> for TargetKey {
	type Error = ConfigurationError;

	fn try_from(key: String) -> Result<Self, Self::Error> {
		Self::new(key)
	}
}

impl TryFrom<&str> for TargetKey {
	type Error = ConfigurationError;

	fn try_from(key: &str) -> Result<Self, Self::Error> {
		Self::new(key)
	}
}

impl std::str::FromStr for TargetKey {
	type Err = ConfigurationError;

	fn from_str(key: &str) -> Result<Self, Self::Err> {
		Self::new(key)
	}
}

impl<'de> Deserialize<'de> for TargetKey {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let key = String::deserialize(deserializer)?;
		Self::new(key).map_err(serde::de::Error::custom)
	}
}
