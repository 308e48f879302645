// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy enforcement entry point.
//!
//! [`PolicyRunner::run`] resolves the container for a target and evaluates
//! it against the current actor:
//!
//! 1. **Resolve**: exact key match against the published snapshot
//! 2. **Missing target**: allowed when `ignore_missing_configuration` is set,
//!    otherwise a [`ConfigurationError::MissingPolicyConfiguration`]
//! 3. **Evaluate**: policies in declaration order; the first violation wins
//!
//! Each call is independent and does not touch any lock beyond cloning the
//! snapshot pointer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::configuration::{ConfigurationSnapshot, SecurityConfiguration};
use crate::context::SecurityContext;
use crate::error::{ConfigurationError, PolicyViolation};
use crate::types::TargetKey;

/// Outcome of enforcing a target.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "violation", rename_all = "snake_case")]
pub enum Decision {
	Allowed,
	Denied(PolicyViolation),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allowed)
	}

	pub fn is_denied(&self) -> bool {
		!self.is_allowed()
	}

	/// The violation behind a denial.
	pub fn violation(&self) -> Option<&PolicyViolation> {
		match self {
			Decision::Allowed => None,
			Decision::Denied(violation) => Some(violation),
		}
	}

	/// Converts to a `Result` for callers that want `?` on denials.
	pub fn into_result(self) -> Result<(), PolicyViolation> {
		match self {
			Decision::Allowed => Ok(()),
			Decision::Denied(violation) => Err(violation),
		}
	}
}

/// Enforces a shared [`SecurityConfiguration`].
#[derive(Debug, Clone)]
pub struct PolicyRunner {
	configuration: Arc<SecurityConfiguration>,
}

impl PolicyRunner {
	pub fn new(configuration: Arc<SecurityConfiguration>) -> Self {
		Self { configuration }
	}

	pub fn configuration(&self) -> &Arc<SecurityConfiguration> {
		&self.configuration
	}

	/// Decides whether the current actor may reach `target`.
	///
	/// # Errors
	///
	/// [`ConfigurationError::MissingPolicyConfiguration`] when no container
	/// matches and missing configuration is not ignored.
	pub fn run(
		&self,
		target: &TargetKey,
		context: &dyn SecurityContext,
	) -> Result<Decision, ConfigurationError> {
		evaluate(&self.configuration.snapshot(), target, context)
	}
}

/// Evaluates `target` against a fixed snapshot.
///
/// Pure function: the same snapshot, target and context always produce the
/// same result.
#[instrument(
	level = "debug",
	skip(snapshot, target, context),
	fields(
		target = %target,
		authenticated = context.is_authenticated(),
	)
)]
pub fn evaluate(
	snapshot: &ConfigurationSnapshot,
	target: &TargetKey,
	context: &dyn SecurityContext,
) -> Result<Decision, ConfigurationError> {
	let Some(container) = snapshot.container(target) else {
		if snapshot.ignore_missing_configuration() {
			debug!("no policy container, missing configuration ignored");
			return Ok(Decision::Allowed);
		}
		return Err(ConfigurationError::MissingPolicyConfiguration {
			target: target.clone(),
		});
	};

	match container.enforce(context) {
		Ok(()) => {
			debug!(policies = container.len(), "access allowed");
			Ok(Decision::Allowed)
		}
		Err(violation) => {
			debug!(kind = %violation.kind, message = %violation.message, "access denied");
			Ok(Decision::Denied(violation))
		}
	}
}
