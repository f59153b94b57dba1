//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Builds an x86-64 instruction encoding table from the rows of the
//! instruction-set reference.
//!
//! Each row (`OpCode`, `Instruction`, `Op/En`, mode support, feature flags,
//! free-text flags) is parsed into one or more [`InstructionVariant`]s, which
//! are collected per mnemonic and ordered so that the most compact encoding
//! of a given operand shape comes first.

pub mod config;
pub mod error;
pub mod expand;
pub mod flags;
mod grammar;
pub mod normalize;
pub mod opcode;
pub mod operand;
pub mod pipeline;
pub mod row;
pub mod signature;
pub mod table;

pub use config::TableConfig;
pub use error::{ConfigError, RowError, RowFormatError};
pub use flags::{EncodingFlag, EncodingFlags};
pub use opcode::OpcodeEncoding;
pub use operand::{NamedRegister, Operand, OperandClass, Width};
pub use pipeline::{run, RowPipeline, RunReport};
pub use row::Row;
pub use table::{InstructionTable, InstructionVariant, TableEntry};
