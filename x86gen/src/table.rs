//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{
	error::{RowError, RowResult},
	flags::EncodingFlags,
	opcode::OpcodeEncoding,
	operand::{Operand, Width},
};

/// One concrete encoding of an instruction: the unit stored in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstructionVariant {
	pub mnemonic: String,
	/// In the manual's operand order.
	pub operands: Vec<Operand>,
	pub opcode: OpcodeEncoding,
	pub flags: EncodingFlags,
}

impl InstructionVariant {
	pub fn is_resolved(&self) -> bool {
		!self.operands.iter().any(Operand::is_generic)
	}

	/// A copy with every width-generic operand set to `width`.
	pub fn resolved(&self, width: Width) -> Self {
		Self {
			operands: self
				.operands
				.iter()
				.map(|operand| operand.resolve(width))
				.collect(),
			..self.clone()
		}
	}

	/// Estimated encoded length in bytes, used to order a mnemonic's variants.
	pub fn footprint(&self) -> i32 {
		self.opcode.len() as i32
			+ self.operands.iter().map(Operand::footprint).sum::<i32>()
			+ self.flags.footprint()
	}

	pub fn entry(&self) -> TableEntry {
		TableEntry {
			instruction: self.to_string(),
			op_code: self.opcode.to_string(),
			encoding_type: self.flags.render(),
			op_code_extension: self.opcode.extension,
		}
	}
}

impl Display for InstructionVariant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.mnemonic)?;
		for (i, operand) in self.operands.iter().enumerate() {
			f.write_str(if i == 0 { " " } else { ", " })?;
			write!(f, "{}", operand)?;
		}
		Ok(())
	}
}

/// Serialized form of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableEntry {
	pub instruction: String,
	pub op_code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub encoding_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub op_code_extension: Option<u8>,
}

/// Every variant, grouped by mnemonic.
///
/// Variants are appended in the order rows are processed; [`finalize`] then
/// orders each group by footprint, keeping insertion order among ties.
///
/// [`finalize`]: InstructionTable::finalize
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionTable {
	variants: BTreeMap<String, Vec<InstructionVariant>>,
}

impl InstructionTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, variant: InstructionVariant) -> RowResult<()> {
		if !variant.is_resolved() {
			return Err(RowError::UnresolvedWidth(variant.to_string()));
		}

		self.variants
			.entry(variant.mnemonic.clone())
			.or_default()
			.push(variant);
		Ok(())
	}

	/// Inserts all of `variants` or, if any is still unresolved, none of them.
	pub fn insert_all(&mut self, variants: Vec<InstructionVariant>) -> RowResult<usize> {
		if let Some(unresolved) = variants.iter().find(|variant| !variant.is_resolved()) {
			return Err(RowError::UnresolvedWidth(unresolved.to_string()));
		}

		let count = variants.len();
		for variant in variants {
			self.insert(variant)?;
		}
		Ok(count)
	}

	pub fn finalize(&mut self) {
		for variants in self.variants.values_mut() {
			variants.sort_by_key(InstructionVariant::footprint);
		}
	}

	pub fn get(&self, mnemonic: &str) -> Option<&[InstructionVariant]> {
		self.variants.get(mnemonic).map(Vec::as_slice)
	}

	/// Number of distinct mnemonics.
	pub fn len(&self) -> usize {
		self.variants.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variants.is_empty()
	}

	pub fn variant_count(&self) -> usize {
		self.variants.values().map(Vec::len).sum()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[InstructionVariant])> {
		self.variants
			.iter()
			.map(|(mnemonic, variants)| (mnemonic.as_str(), variants.as_slice()))
	}

	pub fn entries(&self) -> BTreeMap<String, Vec<TableEntry>> {
		self.iter()
			.map(|(mnemonic, variants)| {
				(
					mnemonic.to_owned(),
					variants.iter().map(InstructionVariant::entry).collect(),
				)
			})
			.collect()
	}

	pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
		match pretty {
			true => serde_json::to_string_pretty(&self.entries()),
			false => serde_json::to_string(&self.entries()),
		}
	}
}
