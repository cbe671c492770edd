// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Weight store configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_SQLITE_URL: &str = "sqlite:./rollout.db";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
	Memory,
	#[default]
	Sqlite,
}

impl FromStr for StoreBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"memory" => Ok(Self::Memory),
			"sqlite" => Ok(Self::Sqlite),
			other => Err(format!("unknown store backend '{other}' (expected memory or sqlite)")),
		}
	}
}

impl fmt::Display for StoreBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Memory => write!(f, "memory"),
			Self::Sqlite => write!(f, "sqlite"),
		}
	}
}

/// Store configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	pub backend: StoreBackend,
	pub url: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		StoreConfigLayer::default().finalize()
	}
}

/// Store configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub backend: Option<StoreBackend>,
	#[serde(default)]
	pub url: Option<String>,
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: StoreConfigLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> StoreConfig {
		StoreConfig {
			backend: self.backend.unwrap_or_default(),
			url: self.url.unwrap_or_else(|| DEFAULT_SQLITE_URL.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = StoreConfig::default();
		assert_eq!(config.backend, StoreBackend::Sqlite);
		assert_eq!(config.url, "sqlite:./rollout.db");
	}

	#[test]
	fn test_merge_overwrites_only_set_fields() {
		let mut base = StoreConfigLayer {
			backend: Some(StoreBackend::Sqlite),
			url: Some("sqlite:/var/lib/rollout.db".to_string()),
		};
		base.merge(StoreConfigLayer {
			backend: Some(StoreBackend::Memory),
			url: None,
		});
		assert_eq!(base.backend, Some(StoreBackend::Memory));
		assert_eq!(base.url.as_deref(), Some("sqlite:/var/lib/rollout.db"));
	}

	#[test]
	fn test_backend_from_str() {
		assert_eq!("MEMORY".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
		assert_eq!("sqlite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
		assert!("redis".parse::<StoreBackend>().is_err());
	}
}
