//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Policy data the generator applies on top of the notation.
///
/// Every key is optional in a config file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
	/// Rows whose feature column contains any of these are dropped.
	pub blocked_features: Vec<String>,
	/// Rows are kept only when the first `/` segment of their mode column equals this.
	pub supported_mode: String,
	/// Mnemonics whose width-generic operands also expand to 8 bits.
	pub unsized_includes_8bit: BTreeSet<String>,
	pub force_size_prefix: BTreeSet<String>,
	/// Mnemonics whose size prefix follows the second operand instead of the first.
	pub second_operand_size_prefix: BTreeSet<String>,
	pub normalize: bool,
}

fn strings<const N: usize>(items: [&str; N]) -> impl Iterator<Item = String> + '_ {
	items.into_iter().map(str::to_owned)
}

impl Default for TableConfig {
	fn default() -> Self {
		Self {
			blocked_features: strings([
				"AVX512F", "AVX512PF", "AVX512VL", "AVX", "AVX2", "AVX512DQ", "FMA", "WAITPKG",
			])
			.collect(),
			supported_mode: "Valid".to_owned(),
			unsized_includes_8bit: strings(["LEA"]).collect(),
			force_size_prefix: strings(["CBW", "CWD", "MOVSW", "STOSW", "CMPSW", "SCASW", "LODSW"])
				.collect(),
			second_operand_size_prefix: strings(["CRC32"]).collect(),
			normalize: true,
		}
	}
}

impl TableConfig {
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_owned(),
			source,
		})?;

		Self::from_json(&text)
	}

	pub fn is_feature_blocked(&self, feature_flags: &str) -> bool {
		self.blocked_features
			.iter()
			.any(|feature| feature_flags.contains(feature.as_str()))
	}

	pub fn is_mode_supported(&self, mode_support: &str) -> bool {
		mode_support.split('/').next().map(str::trim) == Some(self.supported_mode.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_block_vector_extensions() {
		let config = TableConfig::default();

		assert!(config.is_feature_blocked("AVX512BW"));
		assert!(config.is_feature_blocked("FMA"));
		assert!(config.is_feature_blocked("SSE4_1 AVX"));
		assert!(!config.is_feature_blocked("SSE2"));
		assert!(!config.is_feature_blocked(""));
	}

	#[test]
	fn mode_uses_the_first_segment() {
		let config = TableConfig::default();

		assert!(config.is_mode_supported("Valid/Valid"));
		assert!(config.is_mode_supported("Valid"));
		assert!(!config.is_mode_supported("Invalid/Valid"));
		assert!(!config.is_mode_supported("N.E./Valid"));
		assert!(!config.is_mode_supported(""));
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config =
			TableConfig::from_json(r#"{ "unsized_includes_8bit": ["LEA", "MOVSX"] }"#).unwrap();

		assert!(config.unsized_includes_8bit.contains("MOVSX"));
		assert_eq!(config.supported_mode, "Valid");
		assert!(config.force_size_prefix.contains("CBW"));
		assert!(config.normalize);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(
			TableConfig::from_json(r#"{ "blocked": [] }"#),
			Err(ConfigError::Json(_))
		));
	}
}
