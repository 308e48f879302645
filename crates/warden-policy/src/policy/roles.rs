// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based policies.
//!
//! Required roles are kept in declaration order for rendering, but equality
//! and hashing treat them as a set so containers can deduplicate
//! `RequireRole(admin, editor)` against `RequireRole(editor, admin)`.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::context::SecurityContext;
use crate::error::{ConfigurationError, PolicyViolation};
use crate::policy::PolicyKind;
use crate::types::{join_roles, Role};

/// Allows an authenticated actor holding at least one of the required roles.
#[derive(Debug, Clone)]
pub struct RequireRolePolicy {
	required_roles: Vec<Role>,
}

impl RequireRolePolicy {
	/// Fails with [`ConfigurationError::EmptyRequiredRoles`] when no role is given.
	pub fn new<I, R>(roles: I) -> Result<Self, ConfigurationError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		Ok(Self {
			required_roles: collect_roles(PolicyKind::RequireRole, roles)?,
		})
	}

	pub fn roles_required(&self) -> &[Role] {
		&self.required_roles
	}

	pub fn enforce(&self, context: &dyn SecurityContext) -> Result<(), PolicyViolation> {
		let current = authenticated_roles(PolicyKind::RequireRole, context)?;

		if self.required_roles.iter().any(|role| current.contains(role)) {
			return Ok(());
		}

		// Lists the actor's roles, not the required ones; clients match on this text.
		Err(PolicyViolation::new(
			PolicyKind::RequireRole,
			format!(
				"Access requires one of the following roles: {}",
				join_roles(current, ", ")
			),
		))
	}
}

impl PartialEq for RequireRolePolicy {
	fn eq(&self, other: &Self) -> bool {
		same_role_set(&self.required_roles, &other.required_roles)
	}
}

impl Eq for RequireRolePolicy {}

impl Hash for RequireRolePolicy {
	fn hash<H: Hasher>(&self, state: &mut H) {
		hash_role_set(&self.required_roles, state);
	}
}

impl fmt::Display for RequireRolePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} ({})",
			PolicyKind::RequireRole,
			join_roles(&self.required_roles, " or ")
		)
	}
}

/// Allows an authenticated actor holding every one of the required roles.
#[derive(Debug, Clone)]
pub struct RequireAllRolesPolicy {
	required_roles: Vec<Role>,
}

impl RequireAllRolesPolicy {
	/// Fails with [`ConfigurationError::EmptyRequiredRoles`] when no role is given.
	pub fn new<I, R>(roles: I) -> Result<Self, ConfigurationError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		Ok(Self {
			required_roles: collect_roles(PolicyKind::RequireAllRoles, roles)?,
		})
	}

	pub fn roles_required(&self) -> &[Role] {
		&self.required_roles
	}

	pub fn enforce(&self, context: &dyn SecurityContext) -> Result<(), PolicyViolation> {
		let current = authenticated_roles(PolicyKind::RequireAllRoles, context)?;

		if self.required_roles.iter().all(|role| current.contains(role)) {
			return Ok(());
		}

		Err(PolicyViolation::new(
			PolicyKind::RequireAllRoles,
			format!(
				"Access requires all of the following roles: {}",
				join_roles(&self.required_roles, ", ")
			),
		))
	}
}

impl PartialEq for RequireAllRolesPolicy {
	fn eq(&self, other: &Self) -> bool {
		same_role_set(&self.required_roles, &other.required_roles)
	}
}

impl Eq for RequireAllRolesPolicy {}

impl Hash for RequireAllRolesPolicy {
	fn hash<H: Hasher>(&self, state: &mut H) {
		hash_role_set(&self.required_roles, state);
	}
}

impl fmt::Display for RequireAllRolesPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} ({})",
			PolicyKind::RequireAllRoles,
			join_roles(&self.required_roles, " and ")
		)
	}
}

/// Collects validated roles, dropping repeats so the result is a set in
/// declaration order.
fn collect_roles<I, R>(kind: PolicyKind, roles: I) -> Result<Vec<Role>, ConfigurationError>
where
	I: IntoIterator<Item = R>,
	R: Into<Role>,
{
	let mut collected: Vec<Role> = Vec::new();
	for role in roles {
		let role = role.into();
		role.validate()?;
		if !collected.contains(&role) {
			collected.push(role);
		}
	}

	if collected.is_empty() {
		return Err(ConfigurationError::EmptyRequiredRoles { kind });
	}
	Ok(collected)
}

/// Checks the two preconditions shared by every role policy.
fn authenticated_roles<'a>(
	kind: PolicyKind,
	context: &'a dyn SecurityContext,
) -> Result<&'a [Role], PolicyViolation> {
	if !context.is_authenticated() {
		return Err(PolicyViolation::new(kind, "Anonymous access denied"));
	}

	let current = context.current_roles();
	if current.is_empty() {
		return Err(PolicyViolation::new(kind, "Access denied"));
	}
	Ok(current)
}

// Both sides are duplicate-free, so equal length plus containment is set equality.
fn same_role_set(left: &[Role], right: &[Role]) -> bool {
	left.len() == right.len() && left.iter().all(|role| right.contains(role))
}

fn hash_role_set<H: Hasher>(roles: &[Role], state: &mut H) {
	let mut sorted: Vec<&Role> = roles.iter().collect();
	sorted.sort();
	sorted.hash(state);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::ActorContext;
	use std::collections::hash_map::DefaultHasher;

	fn hash_of<T: Hash>(value: &T) -> u64 {
		let mut hasher = DefaultHasher::new();
		value.hash(&mut hasher);
		hasher.finish()
	}

	mod construction {
		use super::*;

		#[test]
		fn empty_roles_are_rejected() {
			let err = RequireRolePolicy::new(Vec::<Role>::new()).unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::EmptyRequiredRoles {
					kind: PolicyKind::RequireRole
				}
			);

			let err = RequireAllRolesPolicy::new(Vec::<&str>::new()).unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::EmptyRequiredRoles {
					kind: PolicyKind::RequireAllRoles
				}
			);
		}

		#[test]
		fn blank_or_control_character_roles_are_rejected() {
			let err = RequireRolePolicy::new(["admin", ""]).unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::InvalidRole {
					role: String::new()
				}
			);

			let err = RequireAllRolesPolicy::new(["admin)\n\tIgnorePolicy"]).unwrap_err();
			assert!(matches!(err, ConfigurationError::InvalidRole { .. }));
		}

		#[test]
		fn repeated_roles_collapse_keeping_first_position() {
			let policy = RequireRolePolicy::new(["editor", "admin", "editor"]).unwrap();
			assert_eq!(
				policy.roles_required(),
				&[Role::from("editor"), Role::from("admin")]
			);
		}
	}

	mod require_role {
		use super::*;

		#[test]
		fn anonymous_actor_is_denied() {
			let policy = RequireRolePolicy::new(["admin"]).unwrap();
			let violation = policy.enforce(&ActorContext::anonymous()).unwrap_err();
			assert_eq!(violation.kind, PolicyKind::RequireRole);
			assert_eq!(violation.message, "Anonymous access denied");
		}

		#[test]
		fn actor_without_roles_is_denied() {
			let policy = RequireRolePolicy::new(["admin"]).unwrap();
			let context = ActorContext::authenticated(Vec::<Role>::new());
			let violation = policy.enforce(&context).unwrap_err();
			assert_eq!(violation.message, "Access denied");
		}

		#[test]
		fn any_matching_role_allows() {
			let policy = RequireRolePolicy::new(["admin", "editor"]).unwrap();
			let context = ActorContext::authenticated(["viewer", "editor"]);
			assert!(policy.enforce(&context).is_ok());
		}

		#[test]
		fn mismatch_lists_current_roles() {
			let policy = RequireRolePolicy::new(["admin"]).unwrap();
			let context = ActorContext::authenticated(["viewer", "guest"]);
			let violation = policy.enforce(&context).unwrap_err();
			assert_eq!(
				violation.message,
				"Access requires one of the following roles: viewer, guest"
			);
		}

		#[test]
		fn renders_required_roles_with_or() {
			let policy = RequireRolePolicy::new(["admin"]).unwrap();
			assert_eq!(policy.to_string(), "RequireRolePolicy (admin)");

			let policy = RequireRolePolicy::new(["admin", "editor", "owner"]).unwrap();
			assert_eq!(
				policy.to_string(),
				"RequireRolePolicy (admin or editor or owner)"
			);
		}
	}

	mod require_all_roles {
		use super::*;

		#[test]
		fn all_roles_must_be_held() {
			let policy = RequireAllRolesPolicy::new(["admin", "editor"]).unwrap();
			assert!(policy
				.enforce(&ActorContext::authenticated(["editor", "admin", "viewer"]))
				.is_ok());

			let violation = policy
				.enforce(&ActorContext::authenticated(["admin"]))
				.unwrap_err();
			assert_eq!(violation.kind, PolicyKind::RequireAllRoles);
			assert_eq!(
				violation.message,
				"Access requires all of the following roles: admin, editor"
			);
		}

		#[test]
		fn shares_authentication_preconditions() {
			let policy = RequireAllRolesPolicy::new(["admin"]).unwrap();
			let violation = policy.enforce(&ActorContext::anonymous()).unwrap_err();
			assert_eq!(violation.message, "Anonymous access denied");

			let violation = policy
				.enforce(&ActorContext::authenticated(Vec::<Role>::new()))
				.unwrap_err();
			assert_eq!(violation.message, "Access denied");
		}

		#[test]
		fn renders_required_roles_with_and() {
			let policy = RequireAllRolesPolicy::new(["admin", "editor"]).unwrap();
			assert_eq!(policy.to_string(), "RequireAllRolesPolicy (admin and editor)");
		}
	}

	mod equality {
		use super::*;

		#[test]
		fn order_does_not_matter() {
			let left = RequireRolePolicy::new(["admin", "editor"]).unwrap();
			let right = RequireRolePolicy::new(["editor", "admin"]).unwrap();
			assert_eq!(left, right);
			assert_eq!(hash_of(&left), hash_of(&right));
		}

		#[test]
		fn different_sets_are_not_equal() {
			let left = RequireRolePolicy::new(["admin"]).unwrap();
			let right = RequireRolePolicy::new(["admin", "editor"]).unwrap();
			assert_ne!(left, right);
			assert_ne!(right, left);
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;
		use std::collections::BTreeSet;

		fn arb_roles() -> impl Strategy<Value = Vec<String>> {
			prop::collection::vec("[a-e]", 1..6)
		}

		proptest! {
			#[test]
			fn equality_matches_set_equality(left in arb_roles(), right in arb_roles()) {
				let left_set: BTreeSet<_> = left.iter().cloned().collect();
				let right_set: BTreeSet<_> = right.iter().cloned().collect();

				let left_policy = RequireRolePolicy::new(left).unwrap();
				let right_policy = RequireRolePolicy::new(right).unwrap();

				prop_assert_eq!(left_policy == right_policy, left_set == right_set);
				if left_set == right_set {
					prop_assert_eq!(hash_of(&left_policy), hash_of(&right_policy));
				}
			}

			#[test]
			fn shuffled_roles_stay_equal(roles in arb_roles()) {
				let mut reversed = roles.clone();
				reversed.reverse();
				prop_assert_eq!(
					RequireRolePolicy::new(roles).unwrap(),
					RequireRolePolicy::new(reversed).unwrap()
				);
			}

			#[test]
			fn intersection_decides_access(required in arb_roles(), held in arb_roles()) {
				let policy = RequireRolePolicy::new(required.clone()).unwrap();
				let context = ActorContext::authenticated(held.clone());
				let intersects = required.iter().any(|role| held.contains(role));
				prop_assert_eq!(policy.enforce(&context).is_ok(), intersects);
			}

			#[test]
			fn anonymous_is_always_denied(required in arb_roles()) {
				let policy = RequireRolePolicy::new(required).unwrap();
				let violation = policy.enforce(&ActorContext::anonymous()).unwrap_err();
				prop_assert_eq!(violation.message, "Anonymous access denied");
			}
		}
	}
}
