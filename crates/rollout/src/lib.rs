// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deterministic feature rollouts.
//!
//! A [`Handler`] is a named feature with ordered [`Modifier`]s (variants).
//! Each modifier owns a share of the `[0, 100]` percentile space and an
//! optional [`Condition`]. The [`Resolver`] hashes an entity into a
//! percentile, finds the modifiers whose weight admits it and returns the
//! first one whose condition holds.
//!
//! Weights live in a shared [`WeightStore`] so every process agrees on them.
//! Registering a handler writes its in-code defaults only for modifiers that
//! have nothing stored; operators change weights with
//! [`Resolver::update_weights`].
//!
//! # Architecture
//!
//! - `resolver` - registration, resolution and batch resolution
//! - `condition` - synchronous and asynchronous eligibility predicates
//! - `context` - per-resolution values handed to conditions
//! - `store` - the store trait plus in-memory and SQLite backends
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use rollout::{Condition, Handler, MemoryWeightStore, Modifier, Resolver};
//!
//! let resolver = Resolver::new(Arc::new(MemoryWeightStore::new()));
//! resolver
//!     .register_handler(Handler::new("checkout").with_modifiers([
//!         Modifier::new("control", 50.0),
//!         Modifier::new("variant", (50.0, 100.0))
//!             .with_condition(Condition::from_fn(|v| v.is_some())),
//!     ]))
//!     .await?;
//!
//! let variant = resolver.resolve("checkout", "user-42", None).await?;
//! ```

pub mod condition;
pub mod context;
pub mod error;
pub mod handler;
pub mod resolver;
pub mod store;

pub use condition::{Condition, ConditionFuture, ConditionOutcome};
pub use context::Context;
pub use error::{ConditionError, Result, RolloutError, StoreError};
pub use handler::{Handler, Modifier};
pub use resolver::{ModifierWeight, ResolveRequest, Resolver};
pub use store::{MemoryWeightStore, SqliteWeightStore, WeightStore};

// Re-export core types for convenience
pub use rollout_core::{percentile, percentile_for, KeySpace, Weight};
