// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rollout_core::Weight;

use crate::condition::Condition;

/// A named variant of a handler.
#[derive(Debug, Clone)]
pub struct Modifier {
	name: String,
	weight: Weight,
	condition: Condition,
}

impl Modifier {
	/// A modifier with an always-true condition. The weight is normalized.
	pub fn new(name: impl Into<String>, weight: impl Into<Weight>) -> Self {
		Self {
			name: name.into(),
			weight: weight.into().normalized(),
			condition: Condition::always(),
		}
	}

	pub fn with_condition(mut self, condition: Condition) -> Self {
		self.condition = condition;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Weight configured in code, used when nothing is persisted.
	pub fn default_weight(&self) -> Weight {
		self.weight
	}

	pub fn condition(&self) -> &Condition {
		&self.condition
	}
}

/// A feature and its modifiers, in priority order.
#[derive(Debug, Clone)]
pub struct Handler {
	name: String,
	modifiers: Vec<Modifier>,
}

impl Handler {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			modifiers: Vec::new(),
		}
	}

	/// Appends a modifier. Re-adding a name replaces the earlier modifier
	/// but keeps its position.
	pub fn with_modifier(mut self, modifier: Modifier) -> Self {
		match self.modifiers.iter_mut().find(|m| m.name == modifier.name) {
			Some(existing) => *existing = modifier,
			None => self.modifiers.push(modifier),
		}
		self
	}

	pub fn with_modifiers(self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
		modifiers.into_iter().fold(self, Self::with_modifier)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn modifiers(&self) -> &[Modifier] {
		&self.modifiers
	}

	pub fn modifier(&self, name: &str) -> Option<&Modifier> {
		self.modifiers.iter().find(|m| m.name == name)
	}

	pub fn modifier_names(&self) -> impl Iterator<Item = &str> {
		self.modifiers.iter().map(Modifier::name)
	}
}
