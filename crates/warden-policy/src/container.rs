// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The ordered policy set bound to one request target.

use crate::context::SecurityContext;
use crate::error::{ConfigurationError, PolicyViolation};
use crate::policy::{Policy, PolicyKind};
use crate::strategy::PolicyAppendStrategy;
use crate::types::TargetKey;

/// Policies protecting a single target, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyContainer {
	target: TargetKey,
	policies: Vec<Policy>,
}

impl PolicyContainer {
	/// Creates an empty container. The key type guarantees it is non-empty.
	pub fn new(target: TargetKey) -> Self {
		Self {
			target,
			policies: Vec::new(),
		}
	}

	/// Creates an empty container from a raw key.
	pub fn for_target(target: impl Into<String>) -> Result<Self, ConfigurationError> {
		TargetKey::new(target).map(Self::new)
	}

	pub fn target(&self) -> &TargetKey {
		&self.target
	}

	pub fn policies(&self) -> &[Policy] {
		&self.policies
	}

	pub(crate) fn policies_mut(&mut self) -> &mut Vec<Policy> {
		&mut self.policies
	}

	pub fn is_empty(&self) -> bool {
		self.policies.is_empty()
	}

	pub fn len(&self) -> usize {
		self.policies.len()
	}

	/// Adds a policy through the given merge rule.
	pub fn add_policy(&mut self, policy: impl Into<Policy>, strategy: PolicyAppendStrategy) -> &mut Self {
		strategy.append(self, policy.into());
		self
	}

	/// Removes every policy of `kind`, returning how many were dropped.
	pub fn remove_policy(&mut self, kind: PolicyKind) -> usize {
		let before = self.policies.len();
		self.policies.retain(|policy| policy.kind() != kind);
		before - self.policies.len()
	}

	pub fn has_policy(&self, kind: PolicyKind) -> bool {
		self.policies.iter().any(|policy| policy.kind() == kind)
	}

	/// Evaluates every policy in order, stopping at the first violation.
	pub fn enforce(&self, context: &dyn SecurityContext) -> Result<(), PolicyViolation> {
		self
			.policies
			.iter()
			.try_for_each(|policy| policy.enforce(context))
	}
}
