//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Cleanup of manual notation that survives table extraction: footnote
//! markers glued onto operand widths, numbered vector registers, spaced-out
//! `+ rd` suffixes and the like. Clean rows pass through unchanged.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{flags::EncodingFlag, row::Row};

#[derive(Debug, Clone)]
struct Rewrite {
	pattern: String,
	replacement: String,
	flag: Option<EncodingFlag>,
}

impl Rewrite {
	fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			replacement: replacement.into(),
			flag: None,
		}
	}

	fn flagged(pattern: &str, replacement: &str, flag: EncodingFlag) -> Self {
		Self {
			flag: Some(flag),
			..Self::new(pattern, replacement)
		}
	}
}

lazy_static! {
	static ref INSTRUCTION_REWRITES: Vec<Rewrite> = {
		// `r8*`-style markers: byte registers that cannot be AH/CH/DH/BH under REX
		let mut rewrites = vec![
			Rewrite::flagged("8**", "8", EncodingFlag::NoUpper8BitEncoding),
			Rewrite::flagged("8*", "8", EncodingFlag::NoUpper8BitEncoding),
			Rewrite::flagged("81", "8", EncodingFlag::NoUpper8BitEncoding),
		];

		for (pattern, replacement) in [
			("r32a", "r32"),
			("r32b", "r32"),
			("r64a", "r64"),
			("r64b", "r64"),
			("Sreg2", "Sreg"),
			("r/m82", "r/m8"),
			("r/m162", "r/m16"),
			("r/m642", "r/m64"),
			("moffs83", "moffs8"),
			("moffs163", "moffs16"),
			("moffs323", "moffs32"),
			("moffs643", "moffs64"),
			("r16/r32/r64", "reg"),
		] {
			rewrites.push(Rewrite::new(pattern, replacement));
		}

		// memory forms first so `xmm1/m128` does not become `xmm/m128` via `xmm1`
		for file in ["xmm", "ymm", "zmm", " mm"] {
			for n in 1..=3 {
				rewrites.push(Rewrite::new(format!("{file}{n}/m"), format!("{file}/m")));
			}
		}
		for file in ["xmm", "ymm", "zmm", " mm"] {
			for n in 1..=3 {
				rewrites.push(Rewrite::new(format!("{file}{n}"), file));
			}
		}

		rewrites
	};

	static ref OPCODE_REWRITES: Vec<Rewrite> = {
		let mut rewrites = vec![
			Rewrite::new("REX + ", "REX "),
			Rewrite::new("REX.W + ", "REX.W "),
			Rewrite::new("REX.w ", "REX.W "),
			Rewrite::new("/r1", "/r"),
			Rewrite::new("/r2", "/r"),
		];

		for size in ["b", "w", "d", "o"] {
			rewrites.push(Rewrite::new(format!("+ r{size}"), format!("+r{size}")));
			rewrites.push(Rewrite::new(format!(" +r{size}"), format!("+r{size}")));
		}

		for (pattern, replacement) in [
			("/05", "/5"),
			("01/7", "01 /7"),
			("0F3A", "0F 3A"),
			("0F38", "0F 38"),
			("ib1", "ib"),
			("13/r", "13 /r"),
		] {
			rewrites.push(Rewrite::new(pattern, replacement));
		}

		rewrites
	};

	static ref MODE_ALIASES: HashMap<&'static str, &'static str> = HashMap::from([
		("vv", "Valid/Valid"),
		("v", "Valid"),
		("valid", "Valid"),
		("i", "Invalid"),
		("inv", "Invalid"),
		("invalid", "Invalid"),
		("ne", "N.E."),
		("np", "N.P."),
		("ni", "N.I."),
		("ns", "N.S."),
	]);
}

fn apply(text: &str, rewrites: &[Rewrite], derived: &mut Vec<EncodingFlag>) -> String {
	rewrites.iter().fold(text.to_owned(), |text, rewrite| {
		if !text.contains(&rewrite.pattern) {
			return text;
		}

		if let Some(flag) = rewrite.flag {
			if !derived.contains(&flag) {
				derived.push(flag);
			}
		}

		text.replace(&rewrite.pattern, &rewrite.replacement)
	})
}

/// Puts exactly `", "` between operands.
pub fn normalize_separators(instruction: &str) -> String {
	let instruction = instruction.trim();

	match instruction.split_once(' ') {
		Some((head, operands)) => {
			let operands: Vec<_> = operands.split(',').map(str::trim).collect();
			format!("{} {}", head, operands.join(", "))
		},
		None => instruction.to_owned(),
	}
}

/// Expands short mode markers such as `V/V` or `Inv.` segment by segment.
pub fn normalize_mode(mode_support: &str) -> String {
	let segments: Vec<String> = mode_support
		.split('/')
		.map(|segment| {
			let key: String = segment
				.chars()
				.filter(char::is_ascii_alphabetic)
				.map(|char| char.to_ascii_lowercase())
				.collect();

			match MODE_ALIASES.get(key.as_str()) {
				Some(alias) => (*alias).to_owned(),
				None => segment.trim().to_owned(),
			}
		})
		.collect();

	segments.join("/")
}

pub fn normalize_row(row: &Row) -> Row {
	let mut derived = Vec::new();

	let instruction = apply(
		&normalize_separators(&row.instruction),
		&INSTRUCTION_REWRITES,
		&mut derived,
	);
	let opcode = apply(row.opcode.trim(), &OPCODE_REWRITES, &mut derived);

	let mut flags = row.flags.trim().to_owned();
	for flag in derived {
		if flags.split(", ").any(|token| token == flag.token()) {
			continue;
		}
		if !flags.is_empty() {
			flags.push_str(", ");
		}
		flags.push_str(flag.token());
	}

	Row {
		line: row.line,
		opcode,
		instruction,
		operand_encoding: row.operand_encoding.trim().to_owned(),
		mode_support: normalize_mode(&row.mode_support),
		feature_flags: row.feature_flags.clone(),
		flags,
	}
}
