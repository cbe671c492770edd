// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Eligibility predicates attached to modifiers.
//!
//! A condition receives the context value stored under its modifier's name
//! and answers either immediately ([`ConditionOutcome::Sync`]) or with a
//! future ([`ConditionOutcome::Async`]). The resolver checks synchronous
//! answers in registration order and awaits all asynchronous ones together.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::ConditionError;

pub type ConditionFuture = BoxFuture<'static, Result<bool, ConditionError>>;

pub enum ConditionOutcome {
	Sync(bool),
	Async(ConditionFuture),
}

impl fmt::Debug for ConditionOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sync(value) => f.debug_tuple("Sync").field(value).finish(),
			Self::Async(_) => f.write_str("Async(..)"),
		}
	}
}

type Predicate =
	dyn Fn(Option<&Value>) -> Result<ConditionOutcome, ConditionError> + Send + Sync + 'static;

/// Shared, cloneable predicate.
#[derive(Clone)]
pub struct Condition {
	predicate: Arc<Predicate>,
}

impl Condition {
	pub fn new<F>(predicate: F) -> Self
	where
		F: Fn(Option<&Value>) -> Result<ConditionOutcome, ConditionError> + Send + Sync + 'static,
	{
		Self {
			predicate: Arc::new(predicate),
		}
	}

	/// Admits every entity; the default for modifiers without a condition.
	pub fn always() -> Self {
		Self::new(|_| Ok(ConditionOutcome::Sync(true)))
	}

	pub fn from_fn<F>(predicate: F) -> Self
	where
		F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
	{
		Self::new(move |value| Ok(ConditionOutcome::Sync(predicate(value))))
	}

	/// A synchronous predicate that may fail.
	pub fn try_from_fn<F>(predicate: F) -> Self
	where
		F: Fn(Option<&Value>) -> Result<bool, ConditionError> + Send + Sync + 'static,
	{
		Self::new(move |value| predicate(value).map(ConditionOutcome::Sync))
	}

	/// An asynchronous predicate. The context value is cloned into the future.
	pub fn from_async<F, Fut>(predicate: F) -> Self
	where
		F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<bool, ConditionError>> + Send + 'static,
	{
		Self::new(move |value| Ok(ConditionOutcome::Async(Box::pin(predicate(value.cloned())))))
	}

	/// Runs the predicate. A panic, in the predicate or in the future it
	/// returns, is reported as a [`ConditionError`] for this condition only.
	pub fn evaluate(&self, value: Option<&Value>) -> Result<ConditionOutcome, ConditionError> {
		match panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(value))) {
			Ok(Ok(ConditionOutcome::Async(future))) => Ok(ConditionOutcome::Async(Box::pin(
				AssertUnwindSafe(future)
					.catch_unwind()
					.map(|verdict| verdict.unwrap_or_else(|_| Err(panicked()))),
			))),
			Ok(outcome) => outcome,
			Err(_) => Err(panicked()),
		}
	}
}

fn panicked() -> ConditionError {
	ConditionError::failed("condition panicked")
}

impl Default for Condition {
	fn default() -> Self {
		Self::always()
	}
}

impl fmt::Debug for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Condition").finish_non_exhaustive()
	}
}
