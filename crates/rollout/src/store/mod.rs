// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key-value stores holding persisted modifier weights.
//!
//! The resolver only needs two batched operations from a backend. Values are
//! the encoded weights produced by [`rollout_core::Weight::encode`].

mod memory;
mod sqlite;

pub use memory::MemoryWeightStore;
pub use sqlite::SqliteWeightStore;

use async_trait::async_trait;

use crate::error::StoreError;

#[async_trait]
pub trait WeightStore: Send + Sync {
	/// Reads `keys` in one round trip.
	///
	/// The result is positionally aligned with `keys`; `None` marks an absent
	/// key.
	async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

	/// Writes every `(key, value)` pair in one round trip, overwriting
	/// existing values.
	async fn batch_set(&self, pairs: &[(String, String)]) -> Result<(), StoreError>;
}
