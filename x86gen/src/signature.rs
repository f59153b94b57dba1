//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use pest::Parser;
use x86gen_proc_macro::vocabulary;

use crate::{
	config::TableConfig,
	error::{RowError, RowResult},
	flags::{EncodingFlag, EncodingFlagsBuilder},
	grammar::{NotationParser, Rule},
	operand::{parse_operand, Operand, Width},
};

vocabulary! {
	/// String-instruction repeat prefixes. Their effect is not modeled.
	pub enum RepeatPrefix {
		Rep = "REP",
		Repe = "REPE",
		Repz = "REPZ",
		Repne = "REPNE",
		Repnz = "REPNZ",
	}
}

/// Mnemonic and operands of one row, before any width expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
	pub mnemonic: String,
	/// Stripped from the text and otherwise ignored.
	pub repeat: Option<RepeatPrefix>,
	pub operands: Vec<Operand>,
}

/// Parses the `Instruction` column, e.g. `ADD r/m16, r16` or `REPE CMPSB`.
///
/// Besides the operands' own flags this decides whether the variant needs the
/// 16-bit operand-size prefix.
pub fn parse_signature(
	text: &str,
	config: &TableConfig,
	mut flags: EncodingFlagsBuilder,
) -> RowResult<(Signature, EncodingFlagsBuilder)> {
	let pairs = NotationParser::parse(Rule::signature, text.trim())
		.map_err(|_| RowError::MalformedInstruction(text.to_owned()))?;

	let mut mnemonic = None;
	let mut repeat = None;
	let mut operands = Vec::new();

	for pair in pairs {
		match pair.as_rule() {
			Rule::repeat_prefix => repeat = RepeatPrefix::from_token(pair.as_str()),
			Rule::mnemonic => mnemonic = Some(pair.as_str().to_ascii_uppercase()),
			Rule::operand => {
				let (operand, next) = parse_operand(pair.as_str(), flags)?;
				operands.push(operand);
				flags = next;
			},
			Rule::EOI => {},
			_ => unreachable!(),
		}
	}

	let mnemonic = mnemonic.ok_or_else(|| RowError::MalformedInstruction(text.to_owned()))?;

	if needs_size_prefix(&mnemonic, &operands, config) {
		flags = flags.with(EncodingFlag::SizePrefix);
	}

	let signature = Signature {
		mnemonic,
		repeat,
		operands,
	};

	Ok((signature, flags))
}

fn needs_size_prefix(mnemonic: &str, operands: &[Operand], config: &TableConfig) -> bool {
	if config.force_size_prefix.contains(mnemonic) {
		return true;
	}

	let index = match config.second_operand_size_prefix.contains(mnemonic) {
		true => 1,
		false => 0,
	};

	operands.get(index).and_then(Operand::width) == Some(Width::W16)
}
