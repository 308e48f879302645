// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The registry of policy containers.
//!
//! [`SecurityConfiguration`] publishes its state as an immutable
//! [`ConfigurationSnapshot`]:
//!
//! ```text
//! configure(mutator) ──► writer lock ──► empty snapshot
//! extend(mutator)    ──► writer lock ──► copy of current snapshot
//!                                              │
//!                                   mutator(&mut ConfigurationExpression)
//!                                              │
//!                        Ok ──► swap Arc (readers see all or nothing)
//!                        Err ─► discard draft, propagate error
//! ```
//!
//! `configure` replaces everything, so calling it twice with the same mutator
//! leaves the same final state. `extend` edits what is already published.
//!
//! Readers only clone the `Arc`, so evaluation never waits on a writer's
//! mutator and never observes a half-registered container.

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

use crate::container::PolicyContainer;
use crate::error::ConfigurationError;
use crate::policy::{Policy, PolicyKind};
use crate::report::{ConfigurationReporter, TextReporter};
use crate::strategy::PolicyAppendStrategy;
use crate::types::TargetKey;

/// Immutable view of a configuration at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
	containers: IndexMap<TargetKey, PolicyContainer>,
	append_strategy: PolicyAppendStrategy,
	ignore_missing_configuration: bool,
}

impl ConfigurationSnapshot {
	/// Containers in registration order.
	pub fn containers(&self) -> impl Iterator<Item = &PolicyContainer> {
		self.containers.values()
	}

	/// Exact-match lookup.
	pub fn container(&self, target: &TargetKey) -> Option<&PolicyContainer> {
		self.containers.get(target)
	}

	pub fn append_strategy(&self) -> PolicyAppendStrategy {
		self.append_strategy
	}

	pub fn ignore_missing_configuration(&self) -> bool {
		self.ignore_missing_configuration
	}

	pub fn len(&self) -> usize {
		self.containers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.containers.is_empty()
	}
}

/// Owns every policy container plus the global enforcement flags.
///
/// Create one per process (or per test), share it behind an `Arc`, and hand
/// it to a [`PolicyRunner`](crate::PolicyRunner).
#[derive(Debug, Default)]
pub struct SecurityConfiguration {
	writer: Mutex<()>,
	current: RwLock<Arc<ConfigurationSnapshot>>,
}

impl SecurityConfiguration {
	/// Creates an empty configuration with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a new configuration from scratch with `mutator` and publishes it
	/// atomically, replacing whatever was there.
	///
	/// Concurrent callers are serialized. If the mutator returns an error the
	/// previous configuration stays in place.
	pub fn configure<F>(&self, mutator: F) -> Result<&Self, ConfigurationError>
	where
		F: FnOnce(&mut ConfigurationExpression) -> Result<(), ConfigurationError>,
	{
		self.publish(Draft::Empty, mutator)
	}

	/// Like [`configure`](Self::configure), but the mutator starts from the
	/// currently published configuration.
	pub fn extend<F>(&self, mutator: F) -> Result<&Self, ConfigurationError>
	where
		F: FnOnce(&mut ConfigurationExpression) -> Result<(), ConfigurationError>,
	{
		self.publish(Draft::Current, mutator)
	}

	fn publish<F>(&self, draft: Draft, mutator: F) -> Result<&Self, ConfigurationError>
	where
		F: FnOnce(&mut ConfigurationExpression) -> Result<(), ConfigurationError>,
	{
		let _writer = self.writer.lock();

		let state = match draft {
			Draft::Empty => ConfigurationSnapshot::default(),
			Draft::Current => ConfigurationSnapshot::clone(&self.snapshot()),
		};
		let mut expression = ConfigurationExpression { state };
		mutator(&mut expression)?;

		let state = expression.state;
		info!(
			?draft,
			targets = state.containers.len(),
			append_strategy = %state.append_strategy,
			ignore_missing_configuration = state.ignore_missing_configuration,
			"Security configuration updated"
		);
		*self.current.write() = Arc::new(state);
		Ok(self)
	}

	/// Discards every container and restores default settings.
	pub fn reset(&self) -> &Self {
		let _writer = self.writer.lock();
		*self.current.write() = Arc::new(ConfigurationSnapshot::default());
		debug!("security configuration reset");
		self
	}

	/// The currently published state.
	pub fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
		Arc::clone(&self.current.read())
	}

	/// Copies of all containers, in registration order.
	pub fn policy_containers(&self) -> Vec<PolicyContainer> {
		self.snapshot().containers().cloned().collect()
	}

	pub fn ignore_missing_configuration(&self) -> bool {
		self.current.read().ignore_missing_configuration
	}

	pub fn append_strategy(&self) -> PolicyAppendStrategy {
		self.current.read().append_strategy
	}

	/// Renders every target and its policies; see [`TextReporter`].
	pub fn what_do_i_have(&self) -> String {
		self.what_do_i_have_with(&TextReporter)
	}

	pub fn what_do_i_have_with(&self, reporter: &dyn ConfigurationReporter) -> String {
		reporter.report(&self.snapshot())
	}
}

/// Starting point of a mutator.
#[derive(Debug, Clone, Copy)]
enum Draft {
	Empty,
	Current,
}

/// Builder handed to a [`SecurityConfiguration::configure`] or
/// [`SecurityConfiguration::extend`] mutator.
///
/// Works on a private copy; nothing is visible to readers until the mutator
/// returns `Ok`.
#[derive(Debug)]
pub struct ConfigurationExpression {
	state: ConfigurationSnapshot,
}

impl ConfigurationExpression {
	/// Returns the container for `target`, creating it if needed.
	pub fn for_target(&mut self, target: TargetKey) -> ContainerExpression<'_> {
		let strategy = self.state.append_strategy;
		let key = target.clone();
		let container = self
			.state
			.containers
			.entry(target)
			.or_insert_with(|| PolicyContainer::new(key));
		ContainerExpression {
			container,
			strategy,
		}
	}

	/// Like [`for_target`](Self::for_target) with a `Controller/Action` key.
	pub fn for_action(
		&mut self,
		controller: &str,
		action: &str,
	) -> Result<ContainerExpression<'_>, ConfigurationError> {
		let target = TargetKey::action(controller, action)?;
		Ok(self.for_target(target))
	}

	/// Registers a pre-built container. Its key must not be registered yet.
	pub fn add_container(&mut self, container: PolicyContainer) -> Result<(), ConfigurationError> {
		if self.state.containers.contains_key(container.target()) {
			return Err(ConfigurationError::DuplicateTarget {
				target: container.target().clone(),
			});
		}
		self
			.state
			.containers
			.insert(container.target().clone(), container);
		Ok(())
	}

	/// Unregisters a target, keeping the order of the remaining ones.
	pub fn remove_target(&mut self, target: &TargetKey) -> Option<PolicyContainer> {
		self.state.containers.shift_remove(target)
	}

	/// Drops every container and restores default settings within this call.
	pub fn clear(&mut self) -> &mut Self {
		self.state = ConfigurationSnapshot::default();
		self
	}

	/// Sets the merge rule for subsequent `add_policy` calls.
	pub fn set_append_strategy(&mut self, strategy: PolicyAppendStrategy) -> &mut Self {
		self.state.append_strategy = strategy;
		self
	}

	pub fn ignore_missing_configuration(&mut self, ignore: bool) -> &mut Self {
		self.state.ignore_missing_configuration = ignore;
		self
	}

	pub fn append_strategy(&self) -> PolicyAppendStrategy {
		self.state.append_strategy
	}

	pub fn containers(&self) -> impl Iterator<Item = &PolicyContainer> {
		self.state.containers()
	}
}

/// Mutable handle on one container inside a configure call.
#[derive(Debug)]
pub struct ContainerExpression<'a> {
	container: &'a mut PolicyContainer,
	strategy: PolicyAppendStrategy,
}

impl ContainerExpression<'_> {
	pub fn add_policy(&mut self, policy: impl Into<Policy>) -> &mut Self {
		self.container.add_policy(policy, self.strategy);
		self
	}

	pub fn remove_policy(&mut self, kind: PolicyKind) -> &mut Self {
		self.container.remove_policy(kind);
		self
	}

	pub fn container(&self) -> &PolicyContainer {
		self.container
	}
}
