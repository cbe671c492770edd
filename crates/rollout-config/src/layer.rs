// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{HandlerConfig, KeysConfigLayer, LoggingConfigLayer, StoreConfigLayer};

/// One partial configuration, as produced by a single source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RolloutConfigLayer {
	#[serde(default)]
	pub store: Option<StoreConfigLayer>,
	#[serde(default)]
	pub keys: Option<KeysConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub handlers: Option<Vec<HandlerConfig>>,
}

impl RolloutConfigLayer {
	/// Overlays `other` on top of `self`. Handler lists are replaced wholesale.
	pub fn merge(&mut self, other: RolloutConfigLayer) {
		merge_section(&mut self.store, other.store, StoreConfigLayer::merge);
		merge_section(&mut self.keys, other.keys, KeysConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.handlers.is_some() {
			self.handlers = other.handlers;
		}
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(existing), Some(other)) => merge(existing, other),
		(None, Some(other)) => *base = Some(other),
		(_, None) => {}
	}
}
