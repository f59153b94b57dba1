//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::error::RowFormatError;

const COLUMNS: usize = 6;

/// One data line of the instruction table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
	/// 1-based line number in the source text.
	pub line: usize,
	pub opcode: String,
	pub instruction: String,
	pub operand_encoding: String,
	pub mode_support: String,
	pub feature_flags: String,
	pub flags: String,
}

impl Row {
	pub fn from_fields(line: usize, fields: [&str; COLUMNS]) -> Self {
		let [opcode, instruction, operand_encoding, mode_support, feature_flags, flags] = fields;

		Self {
			line,
			opcode: opcode.to_owned(),
			instruction: instruction.to_owned(),
			operand_encoding: operand_encoding.to_owned(),
			mode_support: mode_support.to_owned(),
			feature_flags: feature_flags.to_owned(),
			flags: flags.to_owned(),
		}
	}
}

fn parse_line(line: usize, text: &str) -> Result<Row, RowFormatError> {
	let fields: Vec<&str> = text.split('\t').collect();

	match <[&str; COLUMNS]>::try_from(fields.as_slice()) {
		Ok(fields) => Ok(Row::from_fields(line, fields)),
		Err(_) => Err(RowFormatError {
			line,
			found: fields.len(),
		}),
	}
}

/// Splits tab-separated text into rows, skipping the header line and blank lines.
pub fn read_rows(text: &str) -> impl Iterator<Item = Result<Row, RowFormatError>> + '_ {
	text.lines()
		.enumerate()
		.skip(1)
		.map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
		.filter(|(_, line)| !line.trim().is_empty())
		.map(|(line, text)| parse_line(line, text))
}

#[cfg(test)]
mod tests {
	use super::*;

	const HEADER: &str = "Opcode\tInstruction\tOp/En\t64/32-Bit Mode Support\tCPUID Feature Flag\tFlags";

	#[test]
	fn header_and_blank_lines_are_skipped() {
		let text = format!("{HEADER}\r\n04 ib\tADD AL, imm8\tI\tValid/Valid\t\t\r\n\r\n90\tNOP\tZO\tValid/Valid\t\t\n");
		let rows: Vec<_> = read_rows(&text).collect();

		assert_eq!(rows.len(), 2);
		assert_eq!(
			rows[0],
			Ok(Row {
				line: 2,
				opcode: "04 ib".into(),
				instruction: "ADD AL, imm8".into(),
				operand_encoding: "I".into(),
				mode_support: "Valid/Valid".into(),
				feature_flags: "".into(),
				flags: "".into(),
			})
		);
		assert_eq!(rows[1].as_ref().map(|row| row.line), Ok(4));
	}

	#[test]
	fn wrong_column_count_is_reported() {
		let text = format!("{HEADER}\n90\tNOP\tZO\n");
		let rows: Vec<_> = read_rows(&text).collect();

		assert_eq!(rows, vec![Err(RowFormatError { line: 2, found: 3 })]);
	}

	#[test]
	fn header_only() {
		assert_eq!(read_rows(HEADER).count(), 0);
		assert_eq!(read_rows("").count(), 0);
	}
}
