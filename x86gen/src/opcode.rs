//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use pest::Parser;

use crate::{
	error::{RowError, RowResult},
	flags::{EncodingFlag, EncodingFlagsBuilder},
	grammar::{NotationParser, Rule},
};

/// The fixed bytes of one instruction variant plus its ModRM.reg selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OpcodeEncoding {
	pub bytes: Vec<u8>,
	/// Sub-opcode (0-7) carried in ModRM.reg, written `/digit` in the manual.
	pub extension: Option<u8>,
}

impl OpcodeEncoding {
	/// Number of fixed opcode bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

impl Display for OpcodeEncoding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, byte) in self.bytes.iter().enumerate() {
			if i != 0 {
				f.write_str(" ")?;
			}
			write!(f, "{:02X}", byte)?;
		}
		Ok(())
	}
}

fn rex_flag(tail: &str) -> EncodingFlag {
	if tail.ends_with(".W") {
		EncodingFlag::RexWPrefix
	} else if tail.ends_with(".R") {
		EncodingFlag::RexRPrefix
	} else {
		EncodingFlag::RexPrefix
	}
}

/// Parses the `OpCode` column, e.g. `REX.W + B8+rd io` (after normalization,
/// `REX.W B8+rd io`).
///
/// Immediate and ModRM markers are dropped, register-in-opcode bytes keep only
/// their hex part, and REX markers become flags.
pub fn parse_opcode(
	text: &str,
	mut flags: EncodingFlagsBuilder,
) -> RowResult<(OpcodeEncoding, EncodingFlagsBuilder)> {
	let mut bytes = Vec::new();

	for token in text.split_whitespace() {
		let pairs = NotationParser::parse(Rule::opcode_token, token)
			.map_err(|_| RowError::UnrecognizedOpcodeByte(token.to_owned()))?;

		for pair in pairs.flatten() {
			match pair.as_rule() {
				Rule::hex_byte => {
					let byte = u8::from_str_radix(pair.as_str(), 16)
						.map_err(|_| RowError::UnrecognizedOpcodeByte(token.to_owned()))?;
					bytes.push(byte);
				},
				Rule::register_byte => {
					flags = flags
						.with(EncodingFlag::AddRegisterToOpCode)
						.with(EncodingFlag::NoModRegRM);
				},
				Rule::rex_tail => flags = flags.with(rex_flag(pair.as_str())),
				Rule::placeholder
				| Rule::extension_marker
				| Rule::rex_prefix
				| Rule::no_prefix
				| Rule::EOI => {},
				_ => unreachable!(),
			}
		}
	}

	let encoding = OpcodeEncoding {
		bytes,
		extension: opcode_extension(text),
	};

	Ok((encoding, flags))
}

/// Finds the first `/digit` marker (0-7) anywhere in the opcode text.
pub fn opcode_extension(text: &str) -> Option<u8> {
	text.as_bytes().windows(2).find_map(|window| match window {
		[b'/', digit @ b'0'..=b'7'] => Some(digit - b'0'),
		_ => None,
	})
}
