// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the rollout resolver.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`/etc/rollout/rollout.toml` unless overridden)
//! 3. Environment variables (`ROLLOUT_*`)
//!
//! # Usage
//!
//! ```ignore
//! use rollout_config::load_config;
//!
//! let config = load_config()?;
//! println!("store: {} at {}", config.store.backend, config.store.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::RolloutConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, DEFAULT_CONFIG_PATH,
};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloutConfig {
	pub store: StoreConfig,
	pub keys: KeysConfig,
	pub logging: LoggingConfig,
	/// Handlers to register at startup, in declaration order.
	pub handlers: Vec<HandlerConfig>,
}

impl RolloutConfig {
	pub fn handler(&self, name: &str) -> Option<&HandlerConfig> {
		self.handlers.iter().find(|h| h.name == name)
	}
}

/// Load configuration from defaults, the system config file and the
/// environment.
pub fn load_config() -> Result<RolloutConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<RolloutConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<RolloutConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = RolloutConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer into a validated configuration.
pub fn finalize(layer: RolloutConfigLayer) -> Result<RolloutConfig, ConfigError> {
	let store = layer.store.unwrap_or_default().finalize();
	let keys = layer.keys.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let handlers: Vec<HandlerConfig> = layer
		.handlers
		.unwrap_or_default()
		.into_iter()
		.map(|mut handler| {
			for modifier in &mut handler.modifiers {
				modifier.percentage = modifier.percentage.normalized();
			}
			handler
		})
		.collect();

	if store.backend == StoreBackend::Sqlite && store.url.trim().is_empty() {
		return Err(ConfigError::validation("store.url must be set for the sqlite backend"));
	}
	sections::validate_handlers(&handlers)?;

	info!(
		backend = %store.backend,
		url = %store.url,
		prefix = keys.prefix.as_deref().unwrap_or(""),
		handlers = handlers.len(),
		"configuration loaded"
	);

	Ok(RolloutConfig {
		store,
		keys,
		logging,
		handlers,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	use rollout_core::Weight;

	struct FixedSource(Precedence, RolloutConfigLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<RolloutConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	/// Environment-precedence source reading from a fixed variable set.
	struct VarsSource(HashMap<String, String>);

	impl VarsSource {
		fn new(pairs: &[(&str, &str)]) -> Self {
			Self(
				pairs
					.iter()
					.map(|(k, v)| (k.to_string(), v.to_string()))
					.collect(),
			)
		}
	}

	impl ConfigSource for VarsSource {
		fn name(&self) -> &'static str {
			"vars"
		}

		fn precedence(&self) -> Precedence {
			Precedence::Environment
		}

		fn load(&self) -> Result<RolloutConfigLayer, ConfigError> {
			sources::layer_from_vars(|name| self.0.get(name).cloned())
		}
	}

	fn prefixed_config_file() -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "[keys]\nprefix = \"staging\"\n").unwrap();
		file
	}

	#[test]
	fn test_empty_env_prefix_clears_file_prefix() {
		let file = prefixed_config_file();
		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
			Box::new(VarsSource::new(&[("ROLLOUT_KEY_PREFIX", "")])),
		])
		.unwrap();
		assert_eq!(config.keys.prefix, None);
		assert_eq!(config.keys.key_space().key("checkout", "control"), "checkout:control");
	}

	#[test]
	fn test_env_overrides_file_values() {
		let file = prefixed_config_file();

		let unset = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
			Box::new(VarsSource::new(&[])),
		])
		.unwrap();
		assert_eq!(unset.keys.prefix.as_deref(), Some("staging"));

		let overridden = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
			Box::new(VarsSource::new(&[
				("ROLLOUT_KEY_PREFIX", "prod"),
				("ROLLOUT_STORE_BACKEND", "memory"),
			])),
		])
		.unwrap();
		assert_eq!(overridden.keys.prefix.as_deref(), Some("prod"));
		assert_eq!(overridden.store.backend, StoreBackend::Memory);
	}

	#[test]
	fn test_invalid_env_backend_fails_load() {
		let err = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(VarsSource::new(&[("ROLLOUT_STORE_BACKEND", "redis")])),
		])
		.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	fn logging_layer(level: &str) -> RolloutConfigLayer {
		RolloutConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some(level.to_string()),
				json: None,
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_defaults_only() {
		let config = finalize(RolloutConfigLayer::default()).unwrap();
		assert_eq!(config, RolloutConfig::default());
		assert_eq!(config.store.backend, StoreBackend::Sqlite);
		assert!(config.handlers.is_empty());
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource(Precedence::Environment, logging_layer("debug"))),
			Box::new(FixedSource(Precedence::ConfigFile, logging_layer("warn"))),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.logging.level, "debug");
	}

	#[test]
	fn test_handler_weights_are_clamped() {
		let layer = RolloutConfigLayer {
			handlers: Some(vec![HandlerConfig {
				name: "checkout".to_string(),
				modifiers: vec![ModifierConfig {
					name: "control".to_string(),
					percentage: Weight::Range {
						min: -10.0,
						max: 250.0,
					},
				}],
			}]),
			..Default::default()
		};
		let config = finalize(layer).unwrap();
		assert_eq!(
			config.handler("checkout").unwrap().modifiers[0].percentage,
			Weight::Range {
				min: 0.0,
				max: 100.0
			}
		);
	}

	#[test]
	fn test_empty_sqlite_url_rejected() {
		let layer = RolloutConfigLayer {
			store: Some(StoreConfigLayer {
				backend: Some(StoreBackend::Sqlite),
				url: Some("  ".to_string()),
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_memory_backend_ignores_url() {
		let layer = RolloutConfigLayer {
			store: Some(StoreConfigLayer {
				backend: Some(StoreBackend::Memory),
				url: Some(String::new()),
			}),
			..Default::default()
		};
		assert_eq!(finalize(layer).unwrap().store.backend, StoreBackend::Memory);
	}
}
