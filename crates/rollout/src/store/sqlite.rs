// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::WeightStore;
use crate::error::StoreError;

/// Keeps each `IN (...)` well under SQLite's bound-parameter limit.
const MAX_KEYS_PER_QUERY: usize = 500;

/// SQLite-backed store using a single `rollout_weights` table.
#[derive(Clone)]
pub struct SqliteWeightStore {
	pool: SqlitePool,
}

impl SqliteWeightStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Opens (creating if needed) the database at `url` and ensures the
	/// weights table exists.
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
		let pool = SqlitePoolOptions::new().connect_with(options).await?;
		let store = Self::new(pool);
		store.migrate().await?;
		Ok(store)
	}

	#[instrument(skip(self))]
	pub async fn migrate(&self) -> Result<(), StoreError> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS rollout_weights (
				key TEXT PRIMARY KEY NOT NULL,
				value TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		debug!("rollout_weights table ready");
		Ok(())
	}
}

#[async_trait]
impl WeightStore for SqliteWeightStore {
	#[instrument(skip(self, keys), fields(keys = keys.len()))]
	async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
		let mut found: HashMap<String, String> = HashMap::with_capacity(keys.len());

		for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
			let placeholders = vec!["?"; chunk.len()].join(", ");
			let sql = format!("SELECT key, value FROM rollout_weights WHERE key IN ({placeholders})");

			let mut query = sqlx::query_as::<_, (String, String)>(&sql);
			for key in chunk {
				query = query.bind(key);
			}
			found.extend(query.fetch_all(&self.pool).await?);
		}

		Ok(keys.iter().map(|key| found.get(key).cloned()).collect())
	}

	#[instrument(skip(self, pairs), fields(pairs = pairs.len()))]
	async fn batch_set(&self, pairs: &[(String, String)]) -> Result<(), StoreError> {
		let mut tx = self.pool.begin().await?;

		for (key, value) in pairs {
			sqlx::query(
				r#"
				INSERT INTO rollout_weights (key, value)
				VALUES (?, ?)
				ON CONFLICT(key) DO UPDATE SET value = excluded.value
				"#,
			)
			.bind(key)
			.bind(value)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn memory_store() -> SqliteWeightStore {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		let store = SqliteWeightStore::new(pool);
		store.migrate().await.unwrap();
		store
	}

	#[tokio::test]
	async fn test_missing_keys_are_none() {
		let store = memory_store().await;
		let values = store
			.batch_get(&["a:b".to_string(), "a:c".to_string()])
			.await
			.unwrap();
		assert_eq!(values, vec![None, None]);
	}

	#[tokio::test]
	async fn test_set_then_get_aligned() {
		let store = memory_store().await;
		store
			.batch_set(&[
				("checkout:control".to_string(), "50".to_string()),
				(
					"checkout:variant".to_string(),
					r#"{"min":50,"max":100}"#.to_string(),
				),
			])
			.await
			.unwrap();

		let values = store
			.batch_get(&[
				"checkout:variant".to_string(),
				"checkout:missing".to_string(),
				"checkout:control".to_string(),
			])
			.await
			.unwrap();
		assert_eq!(
			values,
			vec![
				Some(r#"{"min":50,"max":100}"#.to_string()),
				None,
				Some("50".to_string()),
			]
		);
	}

	#[tokio::test]
	async fn test_upsert_overwrites() {
		let store = memory_store().await;
		store
			.batch_set(&[("k".to_string(), "10".to_string())])
			.await
			.unwrap();
		store
			.batch_set(&[("k".to_string(), "90".to_string())])
			.await
			.unwrap();
		let values = store.batch_get(&["k".to_string()]).await.unwrap();
		assert_eq!(values, vec![Some("90".to_string())]);
	}

	#[tokio::test]
	async fn test_batch_get_spans_multiple_queries() {
		let store = memory_store().await;
		let pairs: Vec<(String, String)> = (0..MAX_KEYS_PER_QUERY + 20)
			.map(|i| (format!("h:m{i}"), i.to_string()))
			.collect();
		store.batch_set(&pairs).await.unwrap();

		let keys: Vec<String> = pairs.iter().map(|(k, _)| k.clone()).rev().collect();
		let values = store.batch_get(&keys).await.unwrap();
		assert_eq!(values.len(), keys.len());
		assert_eq!(values[0], Some((MAX_KEYS_PER_QUERY + 19).to_string()));
		assert_eq!(values.last().cloned().flatten(), Some("0".to_string()));
	}

	#[tokio::test]
	async fn test_migrate_is_idempotent() {
		let store = memory_store().await;
		store.migrate().await.unwrap();
		store.migrate().await.unwrap();
	}
}
