// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stable percentile hashing.
//!
//! An entity's position inside a handler is derived from the MD5 digest of
//! `handler + id` (plain concatenation, no separator):
//!
//! 1. hex-encode the 128-bit digest (32 characters)
//! 2. keep the first 16 hex characters
//! 3. parse them as an unsigned integer `n`
//! 4. return `n / 0xffff_ffff_ffff_ffff * 100`
//!
//! Both the digest and the truncation must stay exactly as written: values
//! already persisted by other resolver instances (in any language) bucket
//! entities with this scheme, and changing it reshuffles every rollout.
//!
//! The result lies in `[0, 100]`; 100 is only reached by a digest whose first
//! eight bytes are all `0xff`.

use md5::{Digest, Md5};

/// Maps arbitrary text to a deterministic percentile.
pub fn percentile(text: &str) -> f64 {
	let digest = hex::encode(Md5::digest(text.as_bytes()));
	let truncated = &digest[..digest.len() / 2];
	// A hex-encoded digest always parses.
	let n = u64::from_str_radix(truncated, 16).unwrap_or_default();
	n as f64 / u64::MAX as f64 * 100.0
}

/// Percentile of `id` within `handler`.
pub fn percentile_for(handler: &str, id: &str) -> f64 {
	let mut input = String::with_capacity(handler.len() + id.len());
	input.push_str(handler);
	input.push_str(id);
	percentile(&input)
}
