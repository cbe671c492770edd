// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RolloutError>;

#[derive(Debug, Error)]
pub enum RolloutError {
	/// No modifier admitted the entity, or every admitted condition declined.
	#[error("no modifier of handler '{handler}' applies to id '{id}'")]
	NoMatch { handler: String, id: String },

	#[error("handler '{0}' is not registered")]
	UnknownHandler(String),

	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl RolloutError {
	pub fn no_match(handler: impl Into<String>, id: impl Into<String>) -> Self {
		Self::NoMatch {
			handler: handler.into(),
			id: id.into(),
		}
	}

	pub fn is_no_match(&self) -> bool {
		matches!(self, Self::NoMatch { .. })
	}
}

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("store returned {actual} values for {expected} keys")]
	Misaligned { expected: usize, actual: usize },

	#[error("backend error: {0}")]
	Backend(String),
}

impl StoreError {
	pub fn backend(message: impl Into<String>) -> Self {
		Self::Backend(message.into())
	}
}

/// A condition that could not produce a verdict.
///
/// Contained per modifier: the resolver logs it and treats the modifier as
/// not selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
	#[error("condition failed: {0}")]
	Failed(String),
}

impl ConditionError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}
