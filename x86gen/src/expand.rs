//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::{config::TableConfig, operand::Width, table::InstructionVariant};

/// Widths a `reg`/`m` operand of `mnemonic` expands to.
pub fn expansion_widths(mnemonic: &str, config: &TableConfig) -> &'static [Width] {
	match config.unsized_includes_8bit.contains(mnemonic) {
		true => &[Width::W8, Width::W16, Width::W32, Width::W64],
		false => &[Width::W16, Width::W32, Width::W64],
	}
}

/// Turns a parsed variant into the variants to insert.
///
/// A variant without width-generic operands is returned as is. Otherwise one
/// copy per expansion width is produced, with every generic operand given
/// that same width, and the generic variant itself is dropped.
pub fn expand(variant: InstructionVariant, config: &TableConfig) -> Vec<InstructionVariant> {
	if variant.is_resolved() {
		return vec![variant];
	}

	expansion_widths(&variant.mnemonic, config)
		.iter()
		.map(|&width| variant.resolved(width))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		flags::{EncodingFlag, EncodingFlagsBuilder},
		opcode::OpcodeEncoding,
		operand::{Operand, OperandClass},
	};

	fn variant(mnemonic: &str, operands: Vec<Operand>) -> InstructionVariant {
		InstructionVariant {
			mnemonic: mnemonic.to_owned(),
			operands,
			opcode: OpcodeEncoding {
				bytes: vec![0x0F, 0x03],
				extension: None,
			},
			flags: EncodingFlagsBuilder::new()
				.with(EncodingFlag::RexWPrefix)
				.finish(),
		}
	}

	#[test]
	fn sized_variants_pass_through() {
		let add = variant(
			"ADD",
			vec![Operand::Sized(OperandClass::Register, Width::W32)],
		);
		assert_eq!(expand(add.clone(), &TableConfig::default()), vec![add]);
	}

	#[test]
	fn generic_operands_expand_to_three_widths() {
		let lsl = variant(
			"LSL",
			vec![
				Operand::Generic(OperandClass::Register),
				Operand::Sized(OperandClass::RegisterOrMemory, Width::W16),
			],
		);
		let expanded = expand(lsl, &TableConfig::default());

		let rendered: Vec<_> = expanded.iter().map(ToString::to_string).collect();
		assert_eq!(rendered, ["LSL R16, RM16", "LSL R32, RM16", "LSL R64, RM16"]);
		assert!(expanded.iter().all(InstructionVariant::is_resolved));
		assert!(expanded
			.iter()
			.all(|v| v.flags.contains(EncodingFlag::RexWPrefix) && v.opcode.len() == 2));
	}

	#[test]
	fn allow_listed_mnemonics_add_eight_bits() {
		let lea = variant(
			"LEA",
			vec![
				Operand::Sized(OperandClass::Register, Width::W64),
				Operand::Generic(OperandClass::Memory),
			],
		);
		let expanded = expand(lea, &TableConfig::default());

		assert_eq!(expanded.len(), 4);
		assert_eq!(expanded[0].to_string(), "LEA R64, M8");
		assert_eq!(expanded[3].to_string(), "LEA R64, M64");
	}

	#[test]
	fn every_generic_operand_shares_the_width() {
		let both = variant(
			"MOVMSK",
			vec![
				Operand::Generic(OperandClass::Register),
				Operand::Generic(OperandClass::Memory),
			],
		);
		let rendered: Vec<_> = expand(both, &TableConfig::default())
			.iter()
			.map(ToString::to_string)
			.collect();

		assert_eq!(rendered, ["MOVMSK R16, M16", "MOVMSK R32, M32", "MOVMSK R64, M64"]);
	}

	#[test]
	fn allow_list_comes_from_config() {
		let mut config = TableConfig::default();
		config.unsized_includes_8bit.clear();

		assert_eq!(expansion_widths("LEA", &config).len(), 3);
	}
}
