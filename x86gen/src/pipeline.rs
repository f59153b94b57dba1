//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use tracing::{debug, info, warn};

use crate::{
	config::TableConfig,
	error::{RowError, RowFormatError, RowResult},
	expand::expand,
	flags::{aggregate, EncodingFlagsBuilder},
	normalize::normalize_row,
	opcode::parse_opcode,
	row::{read_rows, Row},
	signature::parse_signature,
	table::{InstructionTable, InstructionVariant},
};

/// A row that was attempted and did not make it into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
	pub row: Row,
	pub reason: RowError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
	pub total: usize,
	pub passed: usize,
	pub failed: usize,
	pub failures: Vec<RowFailure>,
	pub malformed: Vec<RowFormatError>,
}

impl RunReport {
	/// Rows that were neither inserted nor failed: filtered out or malformed.
	pub fn skipped(&self) -> usize {
		self.total - self.passed - self.failed
	}

	pub fn percent_passed(&self) -> f64 {
		percent(self.passed, self.passed + self.failed)
	}

	pub fn percent_parsed(&self) -> f64 {
		percent(self.passed + self.failed, self.total)
	}

	pub fn log_summary(&self, table: &InstructionTable) {
		info!(
			total = self.total,
			passed = self.passed,
			failed = self.failed,
			skipped = self.skipped(),
			"unique instructions: {}, variants: {}, percent passed: {:.2}%, percent parsed: {:.2}%",
			table.len(),
			table.variant_count(),
			self.percent_passed(),
			self.percent_parsed(),
		);
	}
}

fn percent(part: usize, whole: usize) -> f64 {
	match whole {
		0 => 0.0,
		whole => part as f64 / whole as f64 * 100.0,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
	BlockedFeature,
	UnsupportedMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
	Dropped(DropReason),
	/// Number of variants the row contributed.
	Inserted(usize),
	Failed(RowError),
}

/// Checks the feature and mode columns; dropped rows are never parsed.
pub fn admit(row: &Row, config: &TableConfig) -> Result<(), DropReason> {
	if config.is_feature_blocked(&row.feature_flags) {
		return Err(DropReason::BlockedFeature);
	}
	if !config.is_mode_supported(&row.mode_support) {
		return Err(DropReason::UnsupportedMode);
	}
	Ok(())
}

/// Parses one admitted row into the variants it contributes.
pub fn parse_row(row: &Row, config: &TableConfig) -> RowResult<Vec<InstructionVariant>> {
	let flags = EncodingFlagsBuilder::from_column(&row.flags);
	let (signature, flags) = parse_signature(&row.instruction, config, flags)?;
	let (opcode, flags) = parse_opcode(&row.opcode, flags)?;
	let flags = aggregate(&signature.operands, &row.operand_encoding, flags);

	if let Some(repeat) = signature.repeat {
		debug!(line = row.line, "ignoring {} prefix on {}", repeat, signature.mnemonic);
	}

	let variant = InstructionVariant {
		mnemonic: signature.mnemonic,
		operands: signature.operands,
		opcode,
		flags,
	};

	Ok(expand(variant, config))
}

/// Feeds rows into an [`InstructionTable`] one at a time.
///
/// A row that fails to parse is recorded in the report and leaves the table
/// untouched.
#[derive(Debug)]
pub struct RowPipeline<'a> {
	config: &'a TableConfig,
	table: InstructionTable,
	report: RunReport,
}

impl<'a> RowPipeline<'a> {
	pub fn new(config: &'a TableConfig) -> Self {
		Self {
			config,
			table: InstructionTable::new(),
			report: RunReport::default(),
		}
	}

	pub fn process(&mut self, row: &Row) -> RowOutcome {
		self.report.total += 1;

		let normalized;
		let row = match self.config.normalize {
			true => {
				normalized = normalize_row(row);
				&normalized
			},
			false => row,
		};

		if let Err(reason) = admit(row, self.config) {
			debug!(line = row.line, instruction = %row.instruction, "skipping row: {:?}", reason);
			return RowOutcome::Dropped(reason);
		}

		match parse_row(row, self.config).and_then(|variants| self.table.insert_all(variants)) {
			Ok(count) => {
				self.report.passed += 1;
				RowOutcome::Inserted(count)
			},
			Err(reason) => {
				warn!(
					line = row.line,
					opcode = %row.opcode,
					instruction = %row.instruction,
					flags = %row.flags,
					"instruction not parsed: {}",
					reason
				);
				self.report.failed += 1;
				self.report.failures.push(RowFailure {
					row: row.clone(),
					reason: reason.clone(),
				});
				RowOutcome::Failed(reason)
			},
		}
	}

	/// Counts a line that could not be split into a row.
	pub fn record_malformed(&mut self, error: RowFormatError) {
		warn!("{}", error);
		self.report.total += 1;
		self.report.malformed.push(error);
	}

	pub fn finish(mut self) -> (InstructionTable, RunReport) {
		self.table.finalize();
		(self.table, self.report)
	}
}

/// Runs every row of a tab-separated table through the pipeline.
pub fn run(text: &str, config: &TableConfig) -> (InstructionTable, RunReport) {
	let mut pipeline = RowPipeline::new(config);

	for row in read_rows(text) {
		match row {
			Ok(row) => {
				pipeline.process(&row);
			},
			Err(error) => pipeline.record_malformed(error),
		}
	}

	pipeline.finish()
}
