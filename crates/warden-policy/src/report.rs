// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! "What do I have": diagnostic renderings of a configuration.
//!
//! [`TextReporter`] output is a stable grammar that tooling may parse:
//!
//! ```text
//! report    := ( container ( "\n" container )* )?
//! container := target-key ( "\n" "\t" policy )*
//! ```
//!
//! `policy` is the policy's `Display` form, e.g. `RequireRolePolicy (admin or editor)`.
//! There is no trailing newline and an empty configuration renders as "".

use serde_json::json;

use crate::configuration::ConfigurationSnapshot;

/// Renders a configuration snapshot.
pub trait ConfigurationReporter {
	fn report(&self, snapshot: &ConfigurationSnapshot) -> String;
}

/// Line-oriented report, one target line followed by tab-indented policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter;

impl ConfigurationReporter for TextReporter {
	fn report(&self, snapshot: &ConfigurationSnapshot) -> String {
		let mut lines = Vec::new();
		for container in snapshot.containers() {
			lines.push(container.target().to_string());
			for policy in container.policies() {
				lines.push(format!("\t{policy}"));
			}
		}
		lines.join("\n")
	}
}

/// JSON document including the global settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter {
	pub pretty: bool,
}

impl ConfigurationReporter for JsonReporter {
	fn report(&self, snapshot: &ConfigurationSnapshot) -> String {
		let targets: Vec<_> = snapshot
			.containers()
			.map(|container| {
				json!({
					"target": container.target(),
					"policies": container
						.policies()
						.iter()
						.map(ToString::to_string)
						.collect::<Vec<_>>(),
				})
			})
			.collect();

		let document = json!({
			"ignore_missing_configuration": snapshot.ignore_missing_configuration(),
			"append_strategy": snapshot.append_strategy(),
			"targets": targets,
		});

		if self.pretty {
			format!("{document:#}")
		} else {
			document.to_string()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Policy, SecurityConfiguration, TargetKey};

	fn configured() -> SecurityConfiguration {
		let configuration = SecurityConfiguration::new();
		configuration
			.configure(|c| {
				c.ignore_missing_configuration(true);
				c.for_target(TargetKey::new("Home/Index")?)
					.add_policy(Policy::Ignore);
				c.for_target(TargetKey::new("Admin/Index")?)
					.add_policy(Policy::DenyAnonymousAccess)
					.add_policy(Policy::require_role(["admin", "owner"])?);
				Ok(())
			})
			.unwrap();
		configuration
	}

	#[test]
	fn text_report_lists_targets_then_policies() {
		let report = TextReporter.report(&configured().snapshot());
		assert_eq!(
			report,
			"Home/Index\n\
			 \tIgnorePolicy\n\
			 Admin/Index\n\
			 \tDenyAnonymousAccessPolicy\n\
			 \tRequireRolePolicy (admin or owner)"
		);
	}

	#[test]
	fn empty_configuration_renders_empty_report() {
		let configuration = SecurityConfiguration::new();
		assert_eq!(configuration.what_do_i_have(), "");

		let report = configuration.what_do_i_have_with(&JsonReporter::default());
		let value: serde_json::Value = serde_json::from_str(&report).unwrap();
		assert_eq!(value["targets"], serde_json::json!([]));
		assert_eq!(value["ignore_missing_configuration"], false);
	}

	#[test]
	fn target_without_policies_is_a_single_line() {
		let configuration = SecurityConfiguration::new();
		configuration
			.configure(|c| {
				c.for_target(TargetKey::new("Home/About")?);
				Ok(())
			})
			.unwrap();
		assert_eq!(configuration.what_do_i_have(), "Home/About");
	}

	#[test]
	fn json_report_includes_settings() {
		let report = configured().what_do_i_have_with(&JsonReporter { pretty: true });
		let value: serde_json::Value = serde_json::from_str(&report).unwrap();

		assert_eq!(value["ignore_missing_configuration"], true);
		assert_eq!(value["append_strategy"], "union");
		assert_eq!(value["targets"][1]["target"], "Admin/Index");
		assert_eq!(
			value["targets"][1]["policies"][1],
			"RequireRolePolicy (admin or owner)"
		);
	}
}
