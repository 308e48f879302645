// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for policy configuration and enforcement.
//!
//! The two categories never mix:
//!
//! - [`ConfigurationError`]: setup or resolution defects. They propagate out of
//!   constructors, [`SecurityConfiguration::configure`] and [`PolicyRunner::run`].
//! - [`PolicyViolation`]: an expected authorization outcome carried as data in
//!   [`Decision::Denied`].
//!
//! [`SecurityConfiguration::configure`]: crate::SecurityConfiguration::configure
//! [`PolicyRunner::run`]: crate::PolicyRunner::run
//! [`Decision::Denied`]: crate::Decision::Denied

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PolicyKind;
use crate::types::TargetKey;

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// A defect in how policies were declared or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
	#[error("{kind} requires at least one role")]
	EmptyRequiredRoles { kind: PolicyKind },

	#[error("target key must not be empty")]
	EmptyTargetKey,

	#[error("target key {key:?} must not contain control characters")]
	InvalidTargetKey { key: String },

	#[error("role {role:?} must be non-blank and free of control characters")]
	InvalidRole { role: String },

	#[error("a policy container is already registered for target '{target}'")]
	DuplicateTarget { target: TargetKey },

	#[error("no policy container is configured for target '{target}'")]
	MissingPolicyConfiguration { target: TargetKey },
}

/// Why a policy denied the current actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct PolicyViolation {
	/// The kind of policy that rejected the actor.
	pub kind: PolicyKind,
	/// Human-readable reason.
	pub message: String,
}

impl PolicyViolation {
	pub fn new(kind: PolicyKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}
}
