// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the rollout resolver.
//!
//! This crate holds the pure, I/O-free building blocks shared by the
//! resolver (`rollout`), its configuration (`rollout-config`) and the
//! operator CLI (`rollout-cli`):
//!
//! - [`percentile`]: maps `handler + id` to a stable position in `[0, 100]`
//! - [`weight`]: normalizes, encodes and decodes modifier weights
//! - [`key`]: builds the store key for a handler/modifier pair
//!
//! # Example
//!
//! ```
//! use rollout_core::{percentile_for, KeySpace, Weight};
//!
//! let p = percentile_for("checkout", "user-42");
//! let control = Weight::scalar(50.0);
//! let variant = Weight::range(50.0, 100.0);
//!
//! assert!(!control.admits(p));
//! assert!(variant.admits(p));
//!
//! let keys = KeySpace::new(Some("prod"));
//! assert_eq!(keys.key("checkout", "variant"), "prod:checkout:variant");
//! ```

pub mod key;
pub mod percentile;
pub mod weight;

pub use key::KeySpace;
pub use percentile::{percentile, percentile_for};
pub use weight::Weight;
