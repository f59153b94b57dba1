//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{collections::BTreeSet, fmt::Display};

use x86gen_proc_macro::vocabulary;

use crate::operand::Operand;

vocabulary! {
	/// Encoding properties this generator knows how to derive or weigh.
	pub enum EncodingFlag {
		RexPrefix = "RexPrefix",
		RexWPrefix = "RexWPrefix",
		RexRPrefix = "RexRPrefix",
		/// The register index lives in the low three bits of the last opcode byte.
		AddRegisterToOpCode = "AddRegisterToOpCode",
		NoModRegRM = "NoModRegRM",
		SizePrefix = "SizePrefix",
		SignExtends = "SignExtends",
		ZeroExtends = "ZeroExtends",
		RelativeJump = "RelativeJump",
		/// AH, CH, DH and BH cannot be encoded alongside a REX prefix.
		NoUpper8BitEncoding = "NoUpper8BitEncoding",
	}
}

impl EncodingFlag {
	/// Bytes this flag adds to, or saves from, an encoding.
	pub const fn footprint(self) -> i32 {
		match self {
			Self::RexPrefix | Self::RexWPrefix | Self::SizePrefix => 1,
			Self::NoModRegRM => -1,
			_ => 0,
		}
	}
}

/// The finished flag set of one instruction variant.
///
/// Known flags iterate in declaration order, followed by any free-text tokens
/// from the source table in lexical order, so rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EncodingFlags {
	known: BTreeSet<EncodingFlag>,
	passthrough: BTreeSet<String>,
}

impl EncodingFlags {
	pub fn contains(&self, flag: EncodingFlag) -> bool {
		self.known.contains(&flag)
	}

	pub fn contains_token(&self, token: &str) -> bool {
		match EncodingFlag::from_token(token) {
			Some(flag) => self.contains(flag),
			None => self.passthrough.contains(token),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.known.is_empty() && self.passthrough.is_empty()
	}

	pub fn len(&self) -> usize {
		self.known.len() + self.passthrough.len()
	}

	pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
		self.known
			.iter()
			.map(|flag| flag.token())
			.chain(self.passthrough.iter().map(String::as_str))
	}

	/// Sum of the byte weights of every flag; passthrough tokens weigh nothing.
	pub fn footprint(&self) -> i32 {
		self.known.iter().map(|flag| flag.footprint()).sum()
	}

	/// The `EncodingType` field of a table entry, absent when there are no flags.
	pub fn render(&self) -> Option<String> {
		match self.is_empty() {
			true => None,
			false => Some(self.to_string()),
		}
	}
}

impl Display for EncodingFlags {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, token) in self.tokens().enumerate() {
			if i != 0 {
				f.write_str(" | ")?;
			}
			f.write_str(token)?;
		}
		Ok(())
	}
}

/// Accumulates the flags of one row while it moves through the parsers.
///
/// Each stage takes the builder by value and hands it back, so a row's flags
/// can never leak into another row.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct EncodingFlagsBuilder {
	flags: EncodingFlags,
}

impl EncodingFlagsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds the builder from the free-text `Flags` column (`", "`-separated).
	pub fn from_column(column: &str) -> Self {
		column
			.split(", ")
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.fold(Self::new(), Self::with_token)
	}

	pub fn with(mut self, flag: EncodingFlag) -> Self {
		self.flags.known.insert(flag);
		self
	}

	pub fn with_token(mut self, token: &str) -> Self {
		match EncodingFlag::from_token(token) {
			Some(flag) => {
				self.flags.known.insert(flag);
			},
			None => {
				self.flags.passthrough.insert(token.to_owned());
			},
		}
		self
	}

	pub fn contains(&self, flag: EncodingFlag) -> bool {
		self.flags.contains(flag)
	}

	pub fn finish(self) -> EncodingFlags {
		self.flags
	}
}

/// Applies the operand-encoding rule and closes the flag set for insertion.
///
/// Two-operand forms whose `Op/En` column reads `I` encode the register
/// implicitly, so they carry no ModRM byte.
pub fn aggregate(
	operands: &[Operand],
	operand_encoding: &str,
	flags: EncodingFlagsBuilder,
) -> EncodingFlags {
	let flags = match operands.len() == 2 && operand_encoding.trim() == "I" {
		true => flags.with(EncodingFlag::NoModRegRM),
		false => flags,
	};

	flags.finish()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operand::{NamedRegister, OperandClass, Width};

	#[test]
	fn column_tokens_split_on_comma_space() {
		let flags = EncodingFlagsBuilder::from_column("SignExtends, Lockable").finish();

		assert!(flags.contains(EncodingFlag::SignExtends));
		assert!(flags.contains_token("Lockable"));
		assert_eq!(flags.len(), 2);
	}

	#[test]
	fn empty_column_yields_no_flags() {
		let flags = EncodingFlagsBuilder::from_column("").finish();
		assert!(flags.is_empty());
		assert_eq!(flags.render(), None);
	}

	#[test]
	fn union_is_idempotent() {
		let flags = EncodingFlagsBuilder::from_column("RexWPrefix")
			.with(EncodingFlag::RexWPrefix)
			.with_token("RexWPrefix")
			.finish();

		assert_eq!(flags.len(), 1);
		assert_eq!(flags.render().as_deref(), Some("RexWPrefix"));
	}

	#[test]
	fn rendering_is_ordered() {
		let flags = EncodingFlagsBuilder::new()
			.with_token("Zeta")
			.with(EncodingFlag::RelativeJump)
			.with_token("Alpha")
			.with(EncodingFlag::RexPrefix)
			.finish();

		assert_eq!(flags.to_string(), "RexPrefix | RelativeJump | Alpha | Zeta");
	}

	#[test]
	fn footprint_weighs_prefixes_and_missing_modrm() {
		let flags = EncodingFlagsBuilder::new()
			.with(EncodingFlag::RexWPrefix)
			.with(EncodingFlag::SizePrefix)
			.with(EncodingFlag::NoModRegRM)
			.with(EncodingFlag::RexRPrefix)
			.with_token("Whatever")
			.finish();

		assert_eq!(flags.footprint(), 1);
	}

	#[test]
	fn immediate_encoding_class_drops_modrm_for_two_operands() {
		let operands = [
			Operand::Named(NamedRegister::Al),
			Operand::Sized(OperandClass::Immediate, Width::W8),
		];

		let flags = aggregate(&operands, "I", EncodingFlagsBuilder::new());
		assert!(flags.contains(EncodingFlag::NoModRegRM));

		let flags = aggregate(&operands, "MI", EncodingFlagsBuilder::new());
		assert!(!flags.contains(EncodingFlag::NoModRegRM));

		let flags = aggregate(&operands[1..], "I", EncodingFlagsBuilder::new());
		assert!(!flags.contains(EncodingFlag::NoModRegRM));
	}
}
