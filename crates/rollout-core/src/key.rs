// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store key layout: `[prefix:]handler:modifier`.

/// Namespace under which modifier weights are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
	prefix: Option<String>,
}

impl KeySpace {
	/// An empty prefix is the same as no prefix.
	pub fn new(prefix: Option<impl Into<String>>) -> Self {
		let prefix = prefix.map(Into::into).filter(|p| !p.is_empty());
		Self { prefix }
	}

	pub fn unprefixed() -> Self {
		Self::default()
	}

	pub fn prefix(&self) -> Option<&str> {
		self.prefix.as_deref()
	}

	/// Key holding the weight of `modifier` within `handler`.
	pub fn key(&self, handler: &str, modifier: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{prefix}:{handler}:{modifier}"),
			None => format!("{handler}:{modifier}"),
		}
	}

	/// Keys for every modifier of `handler`, in the order given.
	pub fn keys<'a>(&self, handler: &str, modifiers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
		modifiers
			.into_iter()
			.map(|modifier| self.key(handler, modifier))
			.collect()
	}
}
