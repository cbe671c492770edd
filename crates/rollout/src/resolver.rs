// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The rollout engine.
//!
//! Resolution order for one entity:
//! 1. Compute the percentile of `handler + id`
//! 2. Read every modifier's persisted weight in one batched store read,
//!    falling back to the registered default for absent keys
//! 3. Walk modifiers in registration order; for each admitted one evaluate
//!    its condition. A synchronous `true` wins immediately. Asynchronous
//!    conditions are collected.
//! 4. Await collected conditions concurrently and pick the first `true` in
//!    registration order (not completion order)
//! 5. Otherwise fail with [`RolloutError::NoMatch`]

use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use rollout_core::{percentile_for, KeySpace, Weight};

use crate::condition::{ConditionFuture, ConditionOutcome};
use crate::context::Context;
use crate::error::{Result, RolloutError, StoreError};
use crate::handler::Handler;
use crate::store::WeightStore;

/// One entry of a batch resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
	pub handler: String,
	pub id: String,
	pub values: Option<Map<String, Value>>,
}

impl ResolveRequest {
	pub fn new(handler: impl Into<String>, id: impl Into<String>) -> Self {
		Self {
			handler: handler.into(),
			id: id.into(),
			values: None,
		}
	}

	pub fn with_values(mut self, values: Map<String, Value>) -> Self {
		self.values = Some(values);
		self
	}

	/// Sets the context value handed to `modifier`'s condition.
	pub fn with_value(mut self, modifier: impl Into<String>, value: Value) -> Self {
		self.values
			.get_or_insert_with(Map::new)
			.insert(modifier.into(), value);
		self
	}
}

/// Effective weight of one modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierWeight {
	pub modifier: String,
	pub weight: Weight,
	/// False when the weight is the registered default because nothing is
	/// stored.
	pub persisted: bool,
}

pub struct Resolver {
	store: Arc<dyn WeightStore>,
	keys: KeySpace,
	handlers: RwLock<Vec<Arc<Handler>>>,
}

impl Resolver {
	pub fn new(store: Arc<dyn WeightStore>) -> Self {
		Self::with_key_space(store, KeySpace::unprefixed())
	}

	pub fn with_key_space(store: Arc<dyn WeightStore>, keys: KeySpace) -> Self {
		Self {
			store,
			keys,
			handlers: RwLock::new(Vec::new()),
		}
	}

	pub fn key_space(&self) -> &KeySpace {
		&self.keys
	}

	/// Registers `handler` and persists the default weight of every modifier
	/// that has nothing stored yet.
	///
	/// Weights already in the store are never overwritten, so the first
	/// registration (or a later [`update_weights`](Self::update_weights))
	/// decides what every process sees. Re-registering a name replaces the
	/// in-memory handler but keeps its position in [`list_handlers`](Self::list_handlers).
	///
	/// Concurrent registrations of the same name must be serialized by the
	/// caller.
	#[instrument(skip(self, handler), fields(handler = %handler.name()))]
	pub async fn register_handler(&self, handler: Handler) -> Result<()> {
		let handler = Arc::new(handler);
		{
			let mut handlers = self.handlers.write().await;
			match handlers.iter_mut().find(|h| h.name() == handler.name()) {
				Some(existing) => *existing = Arc::clone(&handler),
				None => handlers.push(Arc::clone(&handler)),
			}
		}

		let keys = self.keys.keys(handler.name(), handler.modifier_names());
		let stored = self.fetch(&keys).await?;

		let missing: Vec<(String, String)> = keys
			.into_iter()
			.zip(stored)
			.zip(handler.modifiers())
			.filter(|((_, value), _)| value.is_none())
			.map(|((key, _), modifier)| (key, modifier.default_weight().encode()))
			.collect();

		if missing.is_empty() {
			debug!("all modifier weights already persisted");
			return Ok(());
		}

		debug!(missing = missing.len(), "persisting default modifier weights");
		self.store.batch_set(&missing).await?;
		Ok(())
	}

	/// Picks the modifier of `handler` that applies to `id`.
	#[instrument(skip(self, values))]
	pub async fn resolve(
		&self,
		handler: &str,
		id: &str,
		values: Option<Map<String, Value>>,
	) -> Result<String> {
		let handler = self
			.handler(handler)
			.await
			.ok_or_else(|| RolloutError::UnknownHandler(handler.to_string()))?;

		let keys = self.keys.keys(handler.name(), handler.modifier_names());
		let stored = self.fetch(&keys).await?;
		select(&handler, id, values, &stored).await
	}

	/// Resolves many requests against a single batched store read.
	///
	/// The outer error is reserved for the shared store read. Each request
	/// otherwise succeeds or fails on its own, positionally aligned with
	/// `requests`. A panicking condition only disqualifies its own modifier
	/// (see [`Condition::evaluate`](crate::Condition::evaluate)).
	#[instrument(skip(self, requests), fields(requests = requests.len()))]
	pub async fn resolve_batch(&self, requests: Vec<ResolveRequest>) -> Result<Vec<Result<String>>> {
		let handlers: Vec<Option<Arc<Handler>>> = {
			let registry = self.handlers.read().await;
			requests
				.iter()
				.map(|request| registry.iter().find(|h| h.name() == request.handler).cloned())
				.collect()
		};

		let mut keys = Vec::new();
		let mut spans: Vec<Range<usize>> = Vec::with_capacity(requests.len());
		for handler in &handlers {
			let start = keys.len();
			if let Some(handler) = handler {
				keys.extend(self.keys.keys(handler.name(), handler.modifier_names()));
			}
			spans.push(start..keys.len());
		}

		let stored = self.fetch(&keys).await?;

		let resolutions = requests.into_iter().zip(handlers).zip(spans).map(|((request, handler), span)| {
			let weights = &stored[span];
			async move {
				match handler {
					Some(handler) => select(&handler, &request.id, request.values, weights).await,
					None => Err(RolloutError::UnknownHandler(request.handler)),
				}
			}
		});

		Ok(join_all(resolutions).await)
	}

	/// Overwrites the persisted weights of `handler`'s modifiers.
	///
	/// This is the operator override path: values are normalized and written
	/// unconditionally in one batched write. The handler does not need to be
	/// registered in this process.
	#[instrument(skip(self, weights))]
	pub async fn update_weights<I, K, W>(&self, handler: &str, weights: I) -> Result<()>
	where
		I: IntoIterator<Item = (K, W)>,
		K: AsRef<str>,
		W: Into<Weight>,
	{
		let pairs: Vec<(String, String)> = weights
			.into_iter()
			.map(|(modifier, weight)| {
				(
					self.keys.key(handler, modifier.as_ref()),
					weight.into().normalized().encode(),
				)
			})
			.collect();

		if pairs.is_empty() {
			return Ok(());
		}

		debug!(modifiers = pairs.len(), "updating modifier weights");
		self.store.batch_set(&pairs).await?;
		Ok(())
	}

	/// Effective weight of every modifier of `handler`, in registration order.
	#[instrument(skip(self))]
	pub async fn list_modifier_weights(&self, handler: &str) -> Result<Vec<ModifierWeight>> {
		let handler = self
			.handler(handler)
			.await
			.ok_or_else(|| RolloutError::UnknownHandler(handler.to_string()))?;

		let keys = self.keys.keys(handler.name(), handler.modifier_names());
		let stored = self.fetch(&keys).await?;

		Ok(handler
			.modifiers()
			.iter()
			.zip(stored)
			.map(|(modifier, value)| ModifierWeight {
				modifier: modifier.name().to_string(),
				weight: value
					.as_deref()
					.map(Weight::decode)
					.unwrap_or_else(|| modifier.default_weight()),
				persisted: value.is_some(),
			})
			.collect())
	}

	/// Registered handler names, in registration order.
	pub async fn list_handlers(&self) -> Vec<String> {
		self.handlers
			.read()
			.await
			.iter()
			.map(|h| h.name().to_string())
			.collect()
	}

	pub async fn handler(&self, name: &str) -> Option<Arc<Handler>> {
		self.handlers
			.read()
			.await
			.iter()
			.find(|h| h.name() == name)
			.cloned()
	}

	/// Percentile of `id` within `handler`. Never touches the store.
	pub fn percentile(&self, handler: &str, id: &str) -> f64 {
		percentile_for(handler, id)
	}

	async fn fetch(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
		if keys.is_empty() {
			return Ok(Vec::new());
		}

		let values = self.store.batch_get(keys).await?;
		if values.len() != keys.len() {
			return Err(StoreError::Misaligned {
				expected: keys.len(),
				actual: values.len(),
			}
			.into());
		}
		Ok(values)
	}
}

/// Chooses a modifier given the stored weights of `handler`, aligned with its
/// modifiers.
async fn select(
	handler: &Handler,
	id: &str,
	values: Option<Map<String, Value>>,
	stored: &[Option<String>],
) -> Result<String> {
	let percentile = percentile_for(handler.name(), id);
	let context = Context::new(id, values);
	let mut deferred: Vec<(&str, ConditionFuture)> = Vec::new();

	for (modifier, value) in handler.modifiers().iter().zip(stored) {
		let weight = value
			.as_deref()
			.map(Weight::decode)
			.unwrap_or_else(|| modifier.default_weight());

		if !weight.admits(percentile) {
			continue;
		}

		match modifier.condition().evaluate(context.get(modifier.name())) {
			// Wins even over earlier modifiers whose conditions are still pending.
			Ok(ConditionOutcome::Sync(true)) => {
				debug!(handler = handler.name(), id, modifier = modifier.name(), percentile, "modifier selected");
				return Ok(modifier.name().to_string());
			}
			Ok(ConditionOutcome::Sync(false)) => {}
			Ok(ConditionOutcome::Async(future)) => deferred.push((modifier.name(), future)),
			Err(err) => {
				warn!(handler = handler.name(), modifier = modifier.name(), error = %err, "condition failed");
			}
		}
	}

	if !deferred.is_empty() {
		let (names, futures): (Vec<&str>, Vec<ConditionFuture>) = deferred.into_iter().unzip();
		let verdicts = join_all(futures).await;

		for (name, verdict) in names.into_iter().zip(verdicts) {
			match verdict {
				Ok(true) => {
					debug!(handler = handler.name(), id, modifier = name, percentile, "modifier selected");
					return Ok(name.to_string());
				}
				Ok(false) => {}
				Err(err) => {
					warn!(handler = handler.name(), modifier = name, error = %err, "condition failed");
				}
			}
		}
	}

	debug!(handler = handler.name(), id, percentile, "no modifier applies");
	Err(RolloutError::no_match(handler.name(), id))
}
