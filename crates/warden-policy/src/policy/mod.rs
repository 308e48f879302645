// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security policies.
//!
//! A [`Policy`] is one evaluable rule. The set of rule kinds is closed: each
//! variant carries its own evaluation data and implements equality and hashing
//! on its own so containers can deduplicate declarations.
//!
//! | Variant | Allows |
//! |---------|--------|
//! | `RequireRole` | authenticated actors holding any required role |
//! | `RequireAllRoles` | authenticated actors holding every required role |
//! | `DenyAnonymousAccess` | authenticated actors |
//! | `DenyAuthenticatedAccess` | anonymous actors |
//! | `Ignore` | everyone |
//!
//! Evaluation is pure: no I/O, no locking, only the in-memory context.

mod roles;

pub use roles::{RequireAllRolesPolicy, RequireRolePolicy};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::SecurityContext;
use crate::error::{ConfigurationError, PolicyViolation};
use crate::types::Role;

/// Discriminant of a [`Policy`], used for reporting and for Replace matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyKind {
	#[serde(rename = "RequireRolePolicy")]
	RequireRole,
	#[serde(rename = "RequireAllRolesPolicy")]
	RequireAllRoles,
	#[serde(rename = "DenyAnonymousAccessPolicy")]
	DenyAnonymousAccess,
	#[serde(rename = "DenyAuthenticatedAccessPolicy")]
	DenyAuthenticatedAccess,
	#[serde(rename = "IgnorePolicy")]
	Ignore,
}

impl PolicyKind {
	/// Returns all policy kinds.
	pub fn all() -> &'static [PolicyKind] {
		&[
			PolicyKind::RequireRole,
			PolicyKind::RequireAllRoles,
			PolicyKind::DenyAnonymousAccess,
			PolicyKind::DenyAuthenticatedAccess,
			PolicyKind::Ignore,
		]
	}

	/// The name used in reports and violations.
	pub fn name(&self) -> &'static str {
		match self {
			PolicyKind::RequireRole => "RequireRolePolicy",
			PolicyKind::RequireAllRoles => "RequireAllRolesPolicy",
			PolicyKind::DenyAnonymousAccess => "DenyAnonymousAccessPolicy",
			PolicyKind::DenyAuthenticatedAccess => "DenyAuthenticatedAccessPolicy",
			PolicyKind::Ignore => "IgnorePolicy",
		}
	}
}

impl fmt::Display for PolicyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A single authorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Policy {
	RequireRole(RequireRolePolicy),
	RequireAllRoles(RequireAllRolesPolicy),
	DenyAnonymousAccess,
	DenyAuthenticatedAccess,
	Ignore,
}

impl Policy {
	/// Shorthand for a [`RequireRolePolicy`].
	pub fn require_role<I, R>(roles: I) -> Result<Self, ConfigurationError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		RequireRolePolicy::new(roles).map(Policy::RequireRole)
	}

	/// Shorthand for a [`RequireAllRolesPolicy`].
	pub fn require_all_roles<I, R>(roles: I) -> Result<Self, ConfigurationError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		RequireAllRolesPolicy::new(roles).map(Policy::RequireAllRoles)
	}

	pub fn kind(&self) -> PolicyKind {
		match self {
			Policy::RequireRole(_) => PolicyKind::RequireRole,
			Policy::RequireAllRoles(_) => PolicyKind::RequireAllRoles,
			Policy::DenyAnonymousAccess => PolicyKind::DenyAnonymousAccess,
			Policy::DenyAuthenticatedAccess => PolicyKind::DenyAuthenticatedAccess,
			Policy::Ignore => PolicyKind::Ignore,
		}
	}

	/// Evaluates the rule against the current actor.
	pub fn enforce(&self, context: &dyn SecurityContext) -> Result<(), PolicyViolation> {
		match self {
			Policy::RequireRole(policy) => policy.enforce(context),
			Policy::RequireAllRoles(policy) => policy.enforce(context),
			Policy::DenyAnonymousAccess => {
				if context.is_authenticated() {
					Ok(())
				} else {
					Err(PolicyViolation::new(
						PolicyKind::DenyAnonymousAccess,
						"Anonymous access denied",
					))
				}
			}
			Policy::DenyAuthenticatedAccess => {
				if context.is_authenticated() {
					Err(PolicyViolation::new(
						PolicyKind::DenyAuthenticatedAccess,
						"Authenticated access denied",
					))
				} else {
					Ok(())
				}
			}
			Policy::Ignore => Ok(()),
		}
	}
}

impl fmt::Display for Policy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Policy::RequireRole(policy) => fmt::Display::fmt(policy, f),
			Policy::RequireAllRoles(policy) => fmt::Display::fmt(policy, f),
			other => f.write_str(other.kind().name()),
		}
	}
}

impl From<RequireRolePolicy> for Policy {
	fn from(policy: RequireRolePolicy) -> Self {
		Policy::RequireRole(policy)
	}
}

impl From<RequireAllRolesPolicy> for Policy {
	fn from(policy: RequireAllRolesPolicy) -> Self {
		Policy::RequireAllRoles(policy)
	}
}
