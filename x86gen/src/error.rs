//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{io, path::PathBuf};

use thiserror::Error;

pub type RowResult<T> = std::result::Result<T, RowError>;

/// Why a single row could not contribute to the table.
///
/// Every variant is scoped to the row that produced it; the pipeline records
/// it and moves on to the next row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
	#[error("unrecognized operand \"{0}\"")]
	UnrecognizedOperand(String),

	#[error("operand width left unresolved in {0}")]
	UnresolvedWidth(String),

	#[error("unsupported operand width {bits} in \"{token}\"")]
	UnsupportedWidth { token: String, bits: u32 },

	#[error("unset operand width in \"{0}\"")]
	UnsetWidth(String),

	#[error("unrecognized opcode-byte \"{0}\"")]
	UnrecognizedOpcodeByte(String),

	#[error("malformed instruction \"{0}\"")]
	MalformedInstruction(String),
}

/// A data line that does not have the six tab-separated columns of a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: expected 6 tab-separated columns, found {found}")]
pub struct RowFormatError {
	pub line: usize,
	pub found: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config \"{}\": {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("invalid config: {0}")]
	Json(#[from] serde_json::Error),
}
