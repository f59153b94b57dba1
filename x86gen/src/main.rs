//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	fs,
	io::{self, Write},
	path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use x86gen::{pipeline, TableConfig};

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Tab-separated instruction rows, one header line first.
	source: PathBuf,

	/// Where to write the JSON table (stdout when omitted).
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// JSON file overriding the built-in filters and mnemonic lists.
	#[arg(long)]
	config: Option<PathBuf>,

	/// Take rows exactly as written, without notation cleanup.
	#[arg(long)]
	no_normalize: bool,

	#[arg(long)]
	pretty: bool,

	/// Also log skipped rows.
	#[arg(short, long, conflicts_with = "quiet")]
	verbose: bool,

	/// Only log failed rows.
	#[arg(short, long)]
	quiet: bool,
}

fn init_logging(cli: &Args) {
	let level = match (cli.verbose, cli.quiet) {
		(true, _) => "debug",
		(_, true) => "warn",
		_ => "info",
	};

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
		.with_writer(io::stderr)
		.with_target(false)
		.init();
}

fn main() -> Result<()> {
	let cli = Args::parse();
	init_logging(&cli);

	let mut config = match &cli.config {
		Some(path) => TableConfig::load(path)?,
		None => TableConfig::default(),
	};
	if cli.no_normalize {
		config.normalize = false;
	}

	let input = fs::read_to_string(&cli.source)
		.with_context(|| format!("Failed to read \"{}\"", cli.source.display()))?;

	let (table, report) = pipeline::run(&input, &config);
	report.log_summary(&table);

	let json = table
		.to_json(cli.pretty)
		.context("Failed to serialize the instruction table")?;

	match &cli.output {
		Some(path) => fs::write(path, json)
			.with_context(|| format!("Failed to write \"{}\"", path.display()))?,
		None => {
			let mut stdout = io::stdout().lock();
			writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
		},
	}

	Ok(())
}
