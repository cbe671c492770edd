// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Modifier weights and their stored representation.
//!
//! A weight is either a scalar threshold or a `{min, max}` range, both on the
//! `[0, 100]` percentile scale. Weights are persisted as text: a bare number
//! (`50`) or a JSON object (`{"min":50,"max":100}`). Decoding accepts both,
//! plus the looser legacy forms written by older clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A normalized rollout weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
	/// Admits percentiles in `(min, max]`.
	Range { min: f64, max: f64 },
	/// Admits percentiles strictly below the threshold.
	Scalar(f64),
}

impl Weight {
	/// A scalar weight, clamped to `[0, 100]`.
	pub fn scalar(value: f64) -> Self {
		Self::Scalar(clamp(value))
	}

	/// A range weight with both bounds clamped to `[0, 100]`.
	pub fn range(min: f64, max: f64) -> Self {
		Self::Range {
			min: clamp(min),
			max: clamp(max),
		}
	}

	/// Re-applies clamping, e.g. to a weight deserialized from config.
	pub fn normalized(self) -> Self {
		match self {
			Self::Range { min, max } => Self::range(min, max),
			Self::Scalar(value) => Self::scalar(value),
		}
	}

	/// Normalizes an untyped weight.
	///
	/// Objects (and arrays) become ranges built from their `min`/`max` members;
	/// anything else is coerced to a number. Values that are not numeric, or
	/// are missing, coerce to 0.
	pub fn normalize(raw: &Value) -> Self {
		match raw {
			Value::Object(fields) => Self::range(
				coerce(fields.get("min").unwrap_or(&Value::Null)),
				coerce(fields.get("max").unwrap_or(&Value::Null)),
			),
			Value::Array(_) => Self::range(0.0, 0.0),
			other => Self::scalar(coerce(other)),
		}
	}

	/// Decodes a stored weight.
	///
	/// Structured JSON is tried first; text that is not valid JSON is treated
	/// as a scalar.
	pub fn decode(stored: &str) -> Self {
		match serde_json::from_str::<Value>(stored) {
			Ok(value) => Self::normalize(&value),
			Err(_) => Self::scalar(coerce_str(stored)),
		}
	}

	/// Encodes the weight in its canonical stored form.
	pub fn encode(&self) -> String {
		match *self {
			Self::Range { min, max } => format!(
				r#"{{"min":{},"max":{}}}"#,
				wire_number(min),
				wire_number(max)
			),
			Self::Scalar(value) => wire_number(value).to_string(),
		}
	}

	/// Whether an entity at `percentile` falls inside this weight.
	///
	/// NOTE: the two forms use different boundary conventions. A scalar is
	/// `percentile < w` (no lower bound, upper bound excluded) while a range
	/// is `min < percentile <= max` (lower excluded, upper included). Stored
	/// rollouts depend on both, so they are kept apart rather than unified.
	pub fn admits(&self, percentile: f64) -> bool {
		match *self {
			Self::Range { min, max } => percentile > min && percentile <= max,
			Self::Scalar(value) => percentile < value,
		}
	}
}

impl Default for Weight {
	fn default() -> Self {
		Self::Scalar(0.0)
	}
}

impl From<f64> for Weight {
	fn from(value: f64) -> Self {
		Self::scalar(value)
	}
}

impl From<u32> for Weight {
	fn from(value: u32) -> Self {
		Self::scalar(f64::from(value))
	}
}

impl From<(f64, f64)> for Weight {
	fn from((min, max): (f64, f64)) -> Self {
		Self::range(min, max)
	}
}

impl fmt::Display for Weight {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Self::Range { min, max } => write!(f, "({}, {}]", wire_number(min), wire_number(max)),
			Self::Scalar(value) => write!(f, "< {}", wire_number(value)),
		}
	}
}

fn clamp(value: f64) -> f64 {
	if value.is_nan() {
		return 0.0;
	}
	value.clamp(0.0, 100.0)
}

fn coerce(value: &Value) -> f64 {
	match value {
		Value::Bool(true) => 1.0,
		Value::Number(n) => n.as_f64().unwrap_or(0.0),
		Value::String(s) => coerce_str(s),
		_ => 0.0,
	}
}

fn coerce_str(text: &str) -> f64 {
	let trimmed = text.trim();
	if trimmed.is_empty() {
		return 0.0;
	}
	trimmed.parse::<f64>().unwrap_or(0.0)
}

/// Integral values are written without a fractional part (`50`, not `50.0`).
fn wire_number(value: f64) -> Number {
	if value.fract() == 0.0 {
		Number::from(value as i64)
	} else {
		Number::from_f64(value).unwrap_or_else(|| Number::from(0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_normalize_clamps_scalars() {
		assert_eq!(Weight::normalize(&json!(-5)), Weight::Scalar(0.0));
		assert_eq!(Weight::normalize(&json!(150)), Weight::Scalar(100.0));
		assert_eq!(Weight::normalize(&json!(42.5)), Weight::Scalar(42.5));
	}

	#[test]
	fn test_normalize_coerces_non_numeric_to_zero() {
		assert_eq!(Weight::normalize(&Value::Null), Weight::Scalar(0.0));
		assert_eq!(Weight::normalize(&json!("banana")), Weight::Scalar(0.0));
		assert_eq!(Weight::normalize(&json!("")), Weight::Scalar(0.0));
		assert_eq!(Weight::normalize(&json!(false)), Weight::Scalar(0.0));
	}

	#[test]
	fn test_normalize_coerces_numeric_text_and_booleans() {
		assert_eq!(Weight::normalize(&json!("25")), Weight::Scalar(25.0));
		assert_eq!(Weight::normalize(&json!(" 7.5 ")), Weight::Scalar(7.5));
		assert_eq!(Weight::normalize(&json!(true)), Weight::Scalar(1.0));
	}

	#[test]
	fn test_normalize_ranges() {
		assert_eq!(
			Weight::normalize(&json!({"min": 50, "max": 100})),
			Weight::Range { min: 50.0, max: 100.0 }
		);
		assert_eq!(
			Weight::normalize(&json!({"min": -10, "max": 200})),
			Weight::Range { min: 0.0, max: 100.0 }
		);
		assert_eq!(
			Weight::normalize(&json!({"max": "30"})),
			Weight::Range { min: 0.0, max: 30.0 }
		);
	}

	#[test]
	fn test_typed_constructors_clamp() {
		assert_eq!(Weight::scalar(f64::NAN), Weight::Scalar(0.0));
		assert_eq!(Weight::scalar(f64::INFINITY), Weight::Scalar(100.0));
		assert_eq!(Weight::from(120u32), Weight::Scalar(100.0));
		assert_eq!(
			Weight::from((-1.0, 101.0)),
			Weight::Range { min: 0.0, max: 100.0 }
		);
		assert_eq!(
			Weight::Range { min: -3.0, max: 400.0 }.normalized(),
			Weight::Range { min: 0.0, max: 100.0 }
		);
	}

	#[test]
	fn test_scalar_admission_is_exclusive_upper() {
		let w = Weight::scalar(50.0);
		assert!(w.admits(0.0));
		assert!(w.admits(49.999));
		assert!(!w.admits(50.0));
		assert!(!w.admits(63.0));
	}

	#[test]
	fn test_range_admission_is_lower_exclusive_upper_inclusive() {
		let w = Weight::range(50.0, 100.0);
		assert!(!w.admits(50.0));
		assert!(w.admits(50.0001));
		assert!(w.admits(63.0));
		assert!(w.admits(100.0));

		let from_zero = Weight::range(0.0, 10.0);
		assert!(!from_zero.admits(0.0));
		assert!(from_zero.admits(10.0));
	}

	#[test]
	fn test_decode_accepts_both_wire_forms() {
		assert_eq!(Weight::decode("50"), Weight::Scalar(50.0));
		assert_eq!(Weight::decode("12.5"), Weight::Scalar(12.5));
		assert_eq!(
			Weight::decode(r#"{"min":50,"max":100}"#),
			Weight::Range { min: 50.0, max: 100.0 }
		);
		assert_eq!(
			Weight::decode(r#"{"max": 75.5, "min": 25}"#),
			Weight::Range { min: 25.0, max: 75.5 }
		);
	}

	#[test]
	fn test_decode_tolerates_legacy_and_garbage() {
		assert_eq!(Weight::decode(r#""30""#), Weight::Scalar(30.0));
		assert_eq!(Weight::decode("not json"), Weight::Scalar(0.0));
		assert_eq!(Weight::decode(""), Weight::Scalar(0.0));
		assert_eq!(Weight::decode("null"), Weight::Scalar(0.0));
		assert_eq!(Weight::decode("500"), Weight::Scalar(100.0));
	}

	#[test]
	fn test_decode_keeps_every_bit_of_a_stored_bound() {
		let stored = r#"{"min":0,"max":97.39015764456227}"#;
		assert_eq!(
			Weight::decode(stored),
			Weight::Range {
				min: 0.0,
				max: 97.39015764456227
			}
		);
		assert_eq!(Weight::range(0.0, 97.39015764456227).encode(), stored);
		assert_eq!(Weight::decode("97.39015764456227"), Weight::Scalar(97.39015764456227));
	}

	#[test]
	fn test_encode_canonical_text() {
		assert_eq!(Weight::scalar(50.0).encode(), "50");
		assert_eq!(Weight::scalar(33.3).encode(), "33.3");
		assert_eq!(Weight::range(50.0, 100.0).encode(), r#"{"min":50,"max":100}"#);
		assert_eq!(Weight::range(0.5, 20.0).encode(), r#"{"min":0.5,"max":20}"#);
	}

	#[test]
	fn test_deserialize_from_config_shapes() {
		let scalar: Weight = serde_json::from_value(json!(40)).unwrap();
		assert_eq!(scalar, Weight::Scalar(40.0));
		let range: Weight = serde_json::from_value(json!({"min": 10, "max": 20})).unwrap();
		assert_eq!(range, Weight::Range { min: 10.0, max: 20.0 });
	}

	#[test]
	fn test_display() {
		assert_eq!(Weight::scalar(50.0).to_string(), "< 50");
		assert_eq!(Weight::range(50.0, 100.0).to_string(), "(50, 100]");
	}
}
