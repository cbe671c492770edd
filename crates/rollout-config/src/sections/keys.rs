// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store key namespace.

use rollout_core::KeySpace;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysConfig {
	/// Prepended as `prefix:` to every key. `None` when unset or empty.
	pub prefix: Option<String>,
}

impl KeysConfig {
	pub fn key_space(&self) -> KeySpace {
		KeySpace::new(self.prefix.clone())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeysConfigLayer {
	#[serde(default)]
	pub prefix: Option<String>,
}

impl KeysConfigLayer {
	pub fn merge(&mut self, other: KeysConfigLayer) {
		if other.prefix.is_some() {
			self.prefix = other.prefix;
		}
	}

	pub fn finalize(self) -> KeysConfig {
		KeysConfig {
			prefix: self.prefix.filter(|p| !p.is_empty()),
		}
	}
}
