// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The actor side of a policy decision.
//!
//! Authentication happens elsewhere; policies only consume its result through
//! [`SecurityContext`]. Hosts can implement the trait over their own request
//! state or use [`ActorContext`] directly.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Authentication state and role claims of the current actor.
pub trait SecurityContext {
	/// Whether the current actor has been authenticated.
	fn is_authenticated(&self) -> bool;

	/// The actor's role claims. Empty when none were supplied.
	fn current_roles(&self) -> &[Role];

	/// Returns true if the actor holds the given role.
	fn has_role(&self, role: &Role) -> bool {
		self.current_roles().contains(role)
	}
}

/// An owned, already-resolved security context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
	pub is_authenticated: bool,
	#[serde(default)]
	pub roles: Vec<Role>,
}

impl ActorContext {
	/// Create a context for an anonymous actor.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Create a context for an authenticated actor with the given roles.
	pub fn authenticated<I, R>(roles: I) -> Self
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		Self {
			is_authenticated: true,
			roles: roles.into_iter().map(Into::into).collect(),
		}
	}

	/// Builder: add a role claim.
	pub fn with_role(mut self, role: impl Into<Role>) -> Self {
		self.roles.push(role.into());
		self
	}
}

impl SecurityContext for ActorContext {
	fn is_authenticated(&self) -> bool {
		self.is_authenticated
	}

	fn current_roles(&self) -> &[Role] {
		&self.roles
	}
}

impl<T: SecurityContext + ?Sized> SecurityContext for &T {
	fn is_authenticated(&self) -> bool {
		(**self).is_authenticated()
	}

	fn current_roles(&self) -> &[Role] {
		(**self).current_roles()
	}
}
