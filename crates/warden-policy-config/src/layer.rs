// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial policy configuration produced by a single source.

use serde::{Deserialize, Serialize};
use warden_policy::PolicyAppendStrategy;

use crate::declaration::TargetDecl;

/// One source's contribution. Unset scalars defer to lower-precedence layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfigLayer {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ignore_missing_configuration: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub append_strategy: Option<PolicyAppendStrategy>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub targets: Vec<TargetDecl>,
}

impl PolicyConfigLayer {
	/// Overlays `other` on top of `self`.
	///
	/// Scalars set in `other` win. Target declarations accumulate in source
	/// order, so a later source can add policies to a target declared earlier.
	pub fn merge(&mut self, other: PolicyConfigLayer) {
		if other.ignore_missing_configuration.is_some() {
			self.ignore_missing_configuration = other.ignore_missing_configuration;
		}
		if other.append_strategy.is_some() {
			self.append_strategy = other.append_strategy;
		}
		self.targets.extend(other.targets);
	}
}
