// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;

use anyhow::{anyhow, bail, Context as _};
use serde_json::{Map, Value};

use rollout::{ResolveRequest, Resolver, RolloutError, Weight};

pub async fn handlers(resolver: &Resolver, out: &mut impl Write) -> anyhow::Result<()> {
	for name in resolver.list_handlers().await {
		writeln!(out, "{name}")?;
	}
	Ok(())
}

pub fn percentile(resolver: &Resolver, handler: &str, id: &str, out: &mut impl Write) -> anyhow::Result<()> {
	writeln!(out, "{:.6}", resolver.percentile(handler, id))?;
	Ok(())
}

pub async fn weights(resolver: &Resolver, handler: &str, out: &mut impl Write) -> anyhow::Result<()> {
	for entry in resolver.list_modifier_weights(handler).await? {
		let source = if entry.persisted { "stored" } else { "default" };
		writeln!(out, "{}\t{}\t{}", entry.modifier, entry.weight, source)?;
	}
	Ok(())
}

pub async fn update(
	resolver: &Resolver,
	handler: &str,
	assignments: &[String],
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let weights = assignments
		.iter()
		.map(|a| parse_assignment(a))
		.collect::<anyhow::Result<Vec<_>>>()?;

	resolver.update_weights(handler, weights.iter().cloned()).await?;
	for (modifier, weight) in &weights {
		writeln!(out, "{modifier}\t{weight}")?;
	}
	Ok(())
}

pub async fn resolve(
	resolver: &Resolver,
	handler: &str,
	ids: &[String],
	values: Option<&str>,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let values = values.map(parse_values).transpose()?;

	if let [id] = ids {
		let outcome = resolver.resolve(handler, id, values).await;
		return print_outcome(id, outcome, out);
	}

	let requests = ids
		.iter()
		.map(|id| ResolveRequest {
			handler: handler.to_string(),
			id: id.clone(),
			values: values.clone(),
		})
		.collect();

	for (id, outcome) in ids.iter().zip(resolver.resolve_batch(requests).await?) {
		print_outcome(id, outcome, out)?;
	}
	Ok(())
}

fn print_outcome(id: &str, outcome: rollout::Result<String>, out: &mut impl Write) -> anyhow::Result<()> {
	match outcome {
		Ok(modifier) => writeln!(out, "{id}\t{modifier}")?,
		Err(RolloutError::NoMatch { .. }) => writeln!(out, "{id}\tno match")?,
		Err(err) => return Err(err.into()),
	}
	Ok(())
}

/// Parses `modifier=weight`, where the weight uses the stored-value syntax
/// (`50` or `{"min":50,"max":100}`).
fn parse_assignment(assignment: &str) -> anyhow::Result<(String, Weight)> {
	let (modifier, weight) = assignment
		.split_once('=')
		.ok_or_else(|| anyhow!("expected modifier=weight, got '{assignment}'"))?;
	if modifier.is_empty() {
		bail!("missing modifier name in '{assignment}'");
	}
	Ok((modifier.to_string(), Weight::decode(weight)))
}

fn parse_values(text: &str) -> anyhow::Result<Map<String, Value>> {
	match serde_json::from_str(text).context("--values must be JSON")? {
		Value::Object(map) => Ok(map),
		_ => bail!("--values must be a JSON object"),
	}
}
