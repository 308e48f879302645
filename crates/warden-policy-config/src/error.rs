// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;
use warden_policy::ConfigurationError;

/// Errors raised while loading or applying declarative policy configuration.
#[derive(Debug, Error)]
pub enum PolicyConfigError {
	#[error("failed to read policy file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse policy file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("invalid policy declaration: {0}")]
	Policy(#[from] ConfigurationError),
}
