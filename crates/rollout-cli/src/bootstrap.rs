// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wiring from configuration to a ready resolver.

use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;

use rollout::{Handler, MemoryWeightStore, Modifier, Resolver, SqliteWeightStore, WeightStore};
use rollout_config::{HandlerConfig, LoggingConfig, RolloutConfig, StoreBackend, StoreConfig};

pub fn init_tracing(logging: &LoggingConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr);

	if logging.json {
		builder.json().init();
	} else {
		builder.init();
	}
}

pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn WeightStore>> {
	match config.backend {
		StoreBackend::Memory => Ok(Arc::new(MemoryWeightStore::new())),
		StoreBackend::Sqlite => {
			let store = SqliteWeightStore::connect(&config.url)
				.await
				.with_context(|| format!("failed to open weight store at {}", config.url))?;
			Ok(Arc::new(store))
		}
	}
}

pub fn handler_from_config(config: &HandlerConfig) -> Handler {
	Handler::new(&config.name).with_modifiers(
		config
			.modifiers
			.iter()
			.map(|m| Modifier::new(&m.name, m.percentage)),
	)
}

/// Builds a resolver and registers every configured handler, persisting
/// missing default weights.
pub async fn resolver_from_config(config: &RolloutConfig) -> anyhow::Result<Resolver> {
	let store = open_store(&config.store).await?;
	let resolver = Resolver::with_key_space(store, config.keys.key_space());

	for handler in &config.handlers {
		resolver
			.register_handler(handler_from_config(handler))
			.await
			.with_context(|| format!("failed to register handler '{}'", handler.name))?;
	}

	info!(handlers = config.handlers.len(), "resolver ready");
	Ok(resolver)
}
