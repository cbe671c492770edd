// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::RolloutConfigLayer;
use crate::sections::{KeysConfigLayer, LoggingConfigLayer, StoreBackend, StoreConfigLayer};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/rollout/rollout.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<RolloutConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<RolloutConfigLayer, ConfigError> {
		Ok(RolloutConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<RolloutConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(RolloutConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: RolloutConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `ROLLOUT_<SECTION>_<FIELD>`. Handlers cannot be declared
/// through the environment.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<RolloutConfigLayer, ConfigError> {
		layer_from_vars(|name| std::env::var(name).ok())
	}
}

/// Builds the environment layer from `lookup`, which returns the raw value
/// of a variable if it is set.
pub(crate) fn layer_from_vars<F>(lookup: F) -> Result<RolloutConfigLayer, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

	let backend = non_empty("ROLLOUT_STORE_BACKEND")
		.map(|v| {
			v.parse::<StoreBackend>()
				.map_err(|message| ConfigError::invalid_value("ROLLOUT_STORE_BACKEND", message))
		})
		.transpose()?;

	Ok(RolloutConfigLayer {
		store: Some(StoreConfigLayer {
			backend,
			url: non_empty("ROLLOUT_STORE_URL"),
		}),
		// An empty ROLLOUT_KEY_PREFIX clears a prefix set in the file.
		keys: Some(KeysConfigLayer {
			prefix: lookup("ROLLOUT_KEY_PREFIX"),
		}),
		logging: Some(LoggingConfigLayer {
			level: non_empty("ROLLOUT_LOG_LEVEL"),
			json: non_empty("ROLLOUT_LOG_JSON").map(|v| parse_bool(&v)),
		}),
		handlers: None,
	})
}

fn parse_bool(value: &str) -> bool {
	value.eq_ignore_ascii_case("true") || value == "1"
}
