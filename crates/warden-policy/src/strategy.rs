// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! How a newly declared policy merges into a container.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

use crate::container::PolicyContainer;
use crate::policy::Policy;

/// Merge rule applied by every [`PolicyContainer::add_policy`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAppendStrategy {
	/// Adding a policy equal to one already present is a no-op.
	Ignore,
	/// A policy replaces every earlier policy of the same kind.
	Replace,
	/// Policies accumulate; equal declarations collapse into the first one.
	#[default]
	Union,
}

impl PolicyAppendStrategy {
	/// Returns all available strategies.
	pub fn all() -> &'static [PolicyAppendStrategy] {
		&[
			PolicyAppendStrategy::Ignore,
			PolicyAppendStrategy::Replace,
			PolicyAppendStrategy::Union,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			PolicyAppendStrategy::Ignore => "ignore",
			PolicyAppendStrategy::Replace => "replace",
			PolicyAppendStrategy::Union => "union",
		}
	}

	/// Merges `policy` into `container`. Never fails.
	pub fn append(self, container: &mut PolicyContainer, policy: Policy) {
		let target = container.target().clone();
		let policies = container.policies_mut();

		match self {
			PolicyAppendStrategy::Ignore | PolicyAppendStrategy::Union => {
				if policies.contains(&policy) {
					trace!(%target, %policy, strategy = %self, "equal policy already present, skipping");
					return;
				}
				policies.push(policy);
			}
			PolicyAppendStrategy::Replace => {
				let kind = policy.kind();
				let Some(first) = policies.iter().position(|existing| existing.kind() == kind) else {
					policies.push(policy);
					return;
				};

				trace!(%target, %policy, "replacing policies of the same kind");
				policies[first] = policy;
				let mut index = 0;
				policies.retain(|existing| {
					let keep = index == first || existing.kind() != kind;
					index += 1;
					keep
				});
			}
		}
	}
}

impl fmt::Display for PolicyAppendStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown append strategy '{0}' (expected ignore, replace or union)")]
pub struct UnknownAppendStrategy(pub String);

impl FromStr for PolicyAppendStrategy {
	type Err = UnknownAppendStrategy;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"ignore" => Ok(PolicyAppendStrategy::Ignore),
			"replace" => Ok(PolicyAppendStrategy::Replace),
			"union" => Ok(PolicyAppendStrategy::Union),
			_ => Err(UnknownAppendStrategy(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::PolicyKind;
	use crate::types::TargetKey;

	fn container() -> PolicyContainer {
		PolicyContainer::new(TargetKey::new("Admin/Index").unwrap())
	}

	fn require_role(roles: &[&str]) -> Policy {
		Policy::require_role(roles.iter().copied()).unwrap()
	}

	fn rendered(container: &PolicyContainer) -> Vec<String> {
		container.policies().iter().map(ToString::to_string).collect()
	}

	#[test]
	fn union_is_the_default() {
		assert_eq!(PolicyAppendStrategy::default(), PolicyAppendStrategy::Union);
	}

	mod union {
		use super::*;

		#[test]
		fn equal_policies_collapse() {
			let mut container = container();
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["admin"]));
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["admin"]));
			assert_eq!(container.policies().len(), 1);
		}

		#[test]
		fn reordered_roles_collapse_into_first_declaration() {
			let mut container = container();
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["admin", "editor"]));
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["editor", "admin"]));
			assert_eq!(rendered(&container), vec!["RequireRolePolicy (admin or editor)"]);
		}

		#[test]
		fn different_policies_accumulate_in_order() {
			let mut container = container();
			PolicyAppendStrategy::Union.append(&mut container, Policy::DenyAnonymousAccess);
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["admin"]));
			PolicyAppendStrategy::Union.append(&mut container, require_role(&["editor"]));
			assert_eq!(
				rendered(&container),
				vec![
					"DenyAnonymousAccessPolicy",
					"RequireRolePolicy (admin)",
					"RequireRolePolicy (editor)",
				]
			);
		}
	}

	mod replace {
		use super::*;

		#[test]
		fn same_kind_is_replaced() {
			let mut container = container();
			PolicyAppendStrategy::Replace.append(&mut container, require_role(&["admin"]));
			PolicyAppendStrategy::Replace.append(&mut container, require_role(&["editor"]));
			assert_eq!(rendered(&container), vec!["RequireRolePolicy (editor)"]);
		}

		#[test]
		fn replacement_keeps_position_of_first_match() {
			let mut container = container();
			container.policies_mut().extend([
				Policy::DenyAnonymousAccess,
				require_role(&["admin"]),
				Policy::Ignore,
				require_role(&["owner"]),
			]);

			PolicyAppendStrategy::Replace.append(&mut container, require_role(&["editor"]));
			assert_eq!(
				rendered(&container),
				vec![
					"DenyAnonymousAccessPolicy",
					"RequireRolePolicy (editor)",
					"IgnorePolicy",
				]
			);
		}

		#[test]
		fn other_kinds_are_untouched() {
			let mut container = container();
			PolicyAppendStrategy::Replace.append(&mut container, require_role(&["admin"]));
			PolicyAppendStrategy::Replace.append(&mut container, Policy::require_all_roles(["a"]).unwrap());
			assert_eq!(container.policies().len(), 2);
			assert!(container.has_policy(PolicyKind::RequireRole));
			assert!(container.has_policy(PolicyKind::RequireAllRoles));
		}
	}

	mod ignore {
		use super::*;

		#[test]
		fn equal_policy_is_a_no_op() {
			let mut container = container();
			PolicyAppendStrategy::Ignore.append(&mut container, require_role(&["admin", "editor"]));
			PolicyAppendStrategy::Ignore.append(&mut container, require_role(&["editor", "admin"]));
			assert_eq!(rendered(&container), vec!["RequireRolePolicy (admin or editor)"]);
		}

		#[test]
		fn unequal_policy_of_same_kind_is_added() {
			let mut container = container();
			PolicyAppendStrategy::Ignore.append(&mut container, require_role(&["admin"]));
			PolicyAppendStrategy::Ignore.append(&mut container, require_role(&["editor"]));
			assert_eq!(container.policies().len(), 2);
		}
	}

	mod parsing {
		use super::*;

		#[test]
		fn parses_case_insensitively() {
			assert_eq!("Replace".parse(), Ok(PolicyAppendStrategy::Replace));
			assert_eq!(" union ".parse(), Ok(PolicyAppendStrategy::Union));
			assert_eq!("IGNORE".parse(), Ok(PolicyAppendStrategy::Ignore));
		}

		#[test]
		fn unknown_name_is_an_error() {
			let err = "merge".parse::<PolicyAppendStrategy>().unwrap_err();
			assert!(err.to_string().contains("merge"));
		}

		#[test]
		fn display_round_trips() {
			for strategy in PolicyAppendStrategy::all() {
				assert_eq!(strategy.to_string().parse(), Ok(*strategy));
			}
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		fn arb_policy() -> impl Strategy<Value = Policy> {
			prop_oneof![
				Just(Policy::DenyAnonymousAccess),
				Just(Policy::DenyAuthenticatedAccess),
				Just(Policy::Ignore),
				prop::collection::vec("[a-c]", 1..4)
					.prop_map(|roles| Policy::require_role(roles).unwrap()),
				prop::collection::vec("[a-c]", 1..4)
					.prop_map(|roles| Policy::require_all_roles(roles).unwrap()),
			]
		}

		fn arb_strategy() -> impl Strategy<Value = PolicyAppendStrategy> {
			prop_oneof![
				Just(PolicyAppendStrategy::Ignore),
				Just(PolicyAppendStrategy::Replace),
				Just(PolicyAppendStrategy::Union),
			]
		}

		proptest! {
			#[test]
			fn containers_never_hold_equal_policies(
				strategy in arb_strategy(),
				policies in prop::collection::vec(arb_policy(), 0..12),
			) {
				let mut container = container();
				for policy in policies {
					strategy.append(&mut container, policy);
				}

				let held = container.policies();
				for (i, left) in held.iter().enumerate() {
					for right in &held[i + 1..] {
						prop_assert_ne!(left, right);
						if strategy == PolicyAppendStrategy::Replace {
							prop_assert_ne!(left.kind(), right.kind());
						}
					}
				}
			}

			#[test]
			fn ignore_and_union_build_the_same_container(
				policies in prop::collection::vec(arb_policy(), 0..12),
			) {
				let mut ignored = container();
				let mut unioned = container();
				for policy in policies {
					PolicyAppendStrategy::Ignore.append(&mut ignored, policy.clone());
					PolicyAppendStrategy::Union.append(&mut unioned, policy);
				}
				prop_assert_eq!(ignored.policies(), unioned.policies());
			}
		}
	}
}
