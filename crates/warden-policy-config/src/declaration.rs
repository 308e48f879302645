// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Serializable policy declarations as written in a policy file.

use serde::{Deserialize, Serialize};
use warden_policy::{ConfigurationError, Policy, Role, TargetKey};

/// One policy, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyDecl {
	RequireRole { roles: Vec<Role> },
	RequireAllRoles { roles: Vec<Role> },
	DenyAnonymousAccess,
	DenyAuthenticatedAccess,
	Ignore,
}

impl PolicyDecl {
	/// Builds the runtime policy, validating role sets.
	pub fn to_policy(&self) -> Result<Policy, ConfigurationError> {
		match self {
			PolicyDecl::RequireRole { roles } => Policy::require_role(roles),
			PolicyDecl::RequireAllRoles { roles } => Policy::require_all_roles(roles),
			PolicyDecl::DenyAnonymousAccess => Ok(Policy::DenyAnonymousAccess),
			PolicyDecl::DenyAuthenticatedAccess => Ok(Policy::DenyAuthenticatedAccess),
			PolicyDecl::Ignore => Ok(Policy::Ignore),
		}
	}
}

/// Policies declared for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDecl {
	pub key: TargetKey,
	#[serde(default)]
	pub policies: Vec<PolicyDecl>,
}
