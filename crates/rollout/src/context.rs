// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{Map, Value};

/// Per-resolution values handed to modifier conditions.
///
/// The condition of modifier `m` receives the value stored under `m`. The
/// `id` entry is filled with the entity id unless the caller supplied a
/// truthy one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
	values: Map<String, Value>,
}

impl Context {
	pub fn new(id: &str, values: Option<Map<String, Value>>) -> Self {
		let mut values = values.unwrap_or_default();
		if !values.get("id").is_some_and(truthy) {
			values.insert("id".to_string(), Value::String(id.to_string()));
		}
		Self { values }
	}

	/// Value for the condition of `modifier`.
	pub fn get(&self, modifier: &str) -> Option<&Value> {
		self.values.get(modifier)
	}
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
fn truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}
