// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator CLI for inspecting and adjusting rollout weights.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;

/// Rollout - weighted modifier assignment backed by a shared weight store.
#[derive(Parser, Debug)]
#[command(name = "rollout", about = "Inspect and adjust rollout weights", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/rollout/rollout.toml)
	#[arg(long, short, env = "ROLLOUT_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List registered handlers
	Handlers,

	/// Print the percentile of an id within a handler
	Percentile { handler: String, id: String },

	/// Show the effective weight of every modifier of a handler
	Weights { handler: String },

	/// Overwrite modifier weights, e.g. `control=25 'variant={"min":25,"max":100}'`
	Update {
		handler: String,
		#[arg(required = true)]
		assignments: Vec<String>,
	},

	/// Resolve one or more ids to a modifier
	Resolve {
		handler: String,
		#[arg(required = true)]
		ids: Vec<String>,
		/// JSON object of per-modifier condition values
		#[arg(long)]
		values: Option<String>,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => rollout_config::load_config_with_file(path)?,
		None => rollout_config::load_config()?,
	};

	bootstrap::init_tracing(&config.logging);

	let resolver = bootstrap::resolver_from_config(&config).await?;
	let mut out = std::io::stdout().lock();

	match args.command {
		Command::Handlers => commands::handlers(&resolver, &mut out).await,
		Command::Percentile { handler, id } => commands::percentile(&resolver, &handler, &id, &mut out),
		Command::Weights { handler } => commands::weights(&resolver, &handler, &mut out).await,
		Command::Update {
			handler,
			assignments,
		} => commands::update(&resolver, &handler, &assignments, &mut out).await,
		Command::Resolve {
			handler,
			ids,
			values,
		} => commands::resolve(&resolver, &handler, &ids, values.as_deref(), &mut out).await,
	}
}
