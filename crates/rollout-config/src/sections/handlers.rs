// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative handler definitions.
//!
//! ```toml
//! [[handlers]]
//! name = "checkout"
//!
//! [[handlers.modifiers]]
//! name = "control"
//! percentage = 50
//!
//! [[handlers.modifiers]]
//! name = "variant"
//! percentage = { min = 50, max = 100 }
//! ```
//!
//! Modifiers declared here always use the default (always-true) condition.

use std::collections::HashSet;

use rollout_core::Weight;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
	pub name: String,
	#[serde(default)]
	pub modifiers: Vec<ModifierConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
	pub name: String,
	/// Coerced like a stored weight: a missing bound or a non-numeric value
	/// is 0, and a missing percentage is `0`.
	#[serde(default, deserialize_with = "deserialize_weight")]
	pub percentage: Weight,
}

fn deserialize_weight<'de, D>(deserializer: D) -> Result<Weight, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = serde_json::Value::deserialize(deserializer)?;
	Ok(Weight::normalize(&raw))
}

/// Rejects empty or duplicated handler and modifier names.
pub(crate) fn validate_handlers(handlers: &[HandlerConfig]) -> Result<(), ConfigError> {
	let mut seen = HashSet::new();
	for handler in handlers {
		if handler.name.is_empty() {
			return Err(ConfigError::validation("handler name must not be empty"));
		}
		if !seen.insert(handler.name.as_str()) {
			return Err(ConfigError::validation(format!(
				"handler '{}' is defined more than once",
				handler.name
			)));
		}

		let mut modifiers = HashSet::new();
		for modifier in &handler.modifiers {
			if modifier.name.is_empty() {
				return Err(ConfigError::validation(format!(
					"handler '{}' has a modifier without a name",
					handler.name
				)));
			}
			if !modifiers.insert(modifier.name.as_str()) {
				return Err(ConfigError::validation(format!(
					"modifier '{}' is defined more than once in handler '{}'",
					modifier.name, handler.name
				)));
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn handler(name: &str, modifiers: &[&str]) -> HandlerConfig {
		HandlerConfig {
			name: name.to_string(),
			modifiers: modifiers
				.iter()
				.map(|m| ModifierConfig {
					name: m.to_string(),
					percentage: Weight::Scalar(10.0),
				})
				.collect(),
		}
	}

	fn parse(toml_text: &str) -> ModifierConfig {
		toml::from_str(toml_text).unwrap()
	}

	#[test]
	fn test_percentage_is_coerced_like_stored_weights() {
		assert_eq!(
			parse("name = \"variant\"\npercentage = { max = 30 }").percentage,
			Weight::Range { min: 0.0, max: 30.0 }
		);
		assert_eq!(
			parse("name = \"variant\"\npercentage = { min = \"20\", max = 250 }").percentage,
			Weight::Range { min: 20.0, max: 100.0 }
		);
		assert_eq!(parse("name = \"control\"\npercentage = \"25\"").percentage, Weight::Scalar(25.0));
		assert_eq!(parse("name = \"control\"\npercentage = -5").percentage, Weight::Scalar(0.0));
		assert_eq!(parse("name = \"control\"\npercentage = 12.5").percentage, Weight::Scalar(12.5));
		assert_eq!(parse("name = \"control\"").percentage, Weight::Scalar(0.0));
	}

	#[test]
	fn test_valid_handlers() {
		let handlers = vec![handler("checkout", &["a", "b"]), handler("search", &["a"])];
		assert!(validate_handlers(&handlers).is_ok());
	}

	#[test]
	fn test_duplicate_handler_rejected() {
		let handlers = vec![handler("checkout", &["a"]), handler("checkout", &["b"])];
		assert!(matches!(validate_handlers(&handlers), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_duplicate_modifier_rejected() {
		let handlers = vec![handler("checkout", &["a", "a"])];
		assert!(validate_handlers(&handlers).is_err());
	}

	#[test]
	fn test_empty_names_rejected() {
		assert!(validate_handlers(&[handler("", &["a"])]).is_err());
		assert!(validate_handlers(&[handler("checkout", &[""])]).is_err());
	}
}
