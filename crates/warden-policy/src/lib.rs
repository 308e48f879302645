// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy-based access control for request targets.
//!
//! This crate decides whether the current actor may reach a request target
//! (typically a controller action) and, when not, reports why:
//!
//! - [`SecurityConfiguration`]: registry of [`PolicyContainer`]s keyed by
//!   [`TargetKey`], plus the active [`PolicyAppendStrategy`] and the
//!   `ignore_missing_configuration` flag
//! - [`Policy`]: a single rule such as [`RequireRolePolicy`]
//! - [`PolicyRunner`]: resolves and enforces a target, yielding a [`Decision`]
//! - [`TextReporter`] / [`JsonReporter`]: the "what do I have" diagnostics
//!
//! Authentication is out of scope; the actor arrives as a [`SecurityContext`].
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use warden_policy::{ActorContext, Policy, PolicyRunner, SecurityConfiguration, TargetKey};
//!
//! let configuration = Arc::new(SecurityConfiguration::new());
//! configuration
//!     .configure(|c| {
//!         c.for_action("Admin", "Index")?
//!             .add_policy(Policy::require_role(["admin"])?);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let runner = PolicyRunner::new(Arc::clone(&configuration));
//! let target = TargetKey::action("Admin", "Index").unwrap();
//!
//! let decision = runner
//!     .run(&target, &ActorContext::authenticated(["admin"]))
//!     .unwrap();
//! assert!(decision.is_allowed());
//! assert_eq!(
//!     configuration.what_do_i_have(),
//!     "Admin/Index\n\tRequireRolePolicy (admin)"
//! );
//! ```

pub mod configuration;
pub mod container;
pub mod context;
pub mod error;
pub mod policy;
pub mod report;
pub mod runner;
pub mod strategy;
pub mod types;

pub use configuration::{
	ConfigurationExpression, ConfigurationSnapshot, ContainerExpression, SecurityConfiguration,
};
pub use container::PolicyContainer;
pub use context::{ActorContext, SecurityContext};
pub use error::{ConfigurationError, ConfigurationResult, PolicyViolation};
pub use policy::{Policy, PolicyKind, RequireAllRolesPolicy, RequireRolePolicy};
pub use report::{ConfigurationReporter, JsonReporter, TextReporter};
pub use runner::{evaluate, Decision, PolicyRunner};
pub use strategy::{PolicyAppendStrategy, UnknownAppendStrategy};
pub use types::{Role, TargetKey};
