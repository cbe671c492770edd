// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use super::WeightStore;
use crate::error::StoreError;

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryWeightStore {
	entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryWeightStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn get(&self, key: &str) -> Option<String> {
		self.entries.read().await.get(key).cloned()
	}

	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}
}

#[async_trait]
impl WeightStore for MemoryWeightStore {
	#[instrument(skip(self, keys), fields(keys = keys.len()))]
	async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
		let entries = self.entries.read().await;
		Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
	}

	#[instrument(skip(self, pairs), fields(pairs = pairs.len()))]
	async fn batch_set(&self, pairs: &[(String, String)]) -> Result<(), StoreError> {
		let mut entries = self.entries.write().await;
		for (key, value) in pairs {
			entries.insert(key.clone(), value.clone());
		}
		Ok(())
	}
}
