//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use x86gen_proc_macro::vocabulary;

use crate::{
	error::{RowError, RowResult},
	flags::{EncodingFlag, EncodingFlagsBuilder},
};

vocabulary! {
	/// Operand classes written with a width suffix, e.g. the `r/m` of `r/m16`.
	pub enum OperandClass {
		Register = "r",
		Memory = "m",
		Immediate = "imm",
		RegisterOrMemory = "r/m",
		XmmOrMemory = "xmm/m",
		MmxOrMemory = "mm/m",
		MemoryOffset = "moffs",
		/// A general register other than the accumulator.
		RegisterNoAccumulator = "regna",
	}

	/// Registers and register files the notation names outright.
	pub enum NamedRegister {
		Al = "AL",
		Ax = "AX",
		Eax = "EAX",
		Rax = "RAX",
		Cl = "CL",
		Cx = "CX",
		Ecx = "ECX",
		Rcx = "RCX",
		Dl = "DL",
		Dx = "DX",
		Edx = "EDX",
		Rdx = "RDX",
		ControlRegister = "creg",
		DebugRegister = "dreg",
		TestRegister = "treg",
		SegmentRegister = "Sreg",
		Cs = "CS",
		Fs = "FS",
		Gs = "GS",
		Xmm = "xmm",
		Mmx = "mm",
	}
}

impl OperandClass {
	/// Name of the class in the generated table.
	pub const fn category(self) -> &'static str {
		match self {
			Self::Register => "R",
			Self::Memory => "M",
			Self::Immediate => "IMM",
			Self::RegisterOrMemory => "RM",
			Self::XmmOrMemory => "XMMRM",
			Self::MmxOrMemory => "MMXRM",
			Self::MemoryOffset => "MOFFS",
			Self::RegisterNoAccumulator => "RNA",
		}
	}
}

impl NamedRegister {
	/// Name of the register in the generated table.
	pub const fn name(self) -> &'static str {
		match self {
			Self::ControlRegister => "CR",
			Self::DebugRegister => "DR",
			Self::TestRegister => "TR",
			Self::SegmentRegister => "SEG",
			Self::Xmm => "XMM",
			Self::Mmx => "MMX",
			other => other.token(),
		}
	}

	pub const fn width(self) -> Width {
		match self {
			Self::Al | Self::Cl | Self::Dl => Width::W8,
			Self::Ax
			| Self::Cx
			| Self::Dx
			| Self::SegmentRegister
			| Self::Cs
			| Self::Fs
			| Self::Gs => Width::W16,
			Self::Eax | Self::Ecx | Self::Edx => Width::W32,
			Self::Rax
			| Self::Rcx
			| Self::Rdx
			| Self::ControlRegister
			| Self::DebugRegister
			| Self::TestRegister
			| Self::Mmx => Width::W64,
			Self::Xmm => Width::W128,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
	W8 = 8,
	W16 = 16,
	W32 = 32,
	W64 = 64,
	W128 = 128,
}

impl Width {
	pub const ALL: [Self; 5] = [Self::W8, Self::W16, Self::W32, Self::W64, Self::W128];

	pub const fn bits(self) -> u32 {
		self as u32
	}

	pub const fn bytes(self) -> u32 {
		self.bits() / 8
	}

	pub const fn from_bits(bits: u32) -> Option<Self> {
		match bits {
			8 => Some(Self::W8),
			16 => Some(Self::W16),
			32 => Some(Self::W32),
			64 => Some(Self::W64),
			128 => Some(Self::W128),
			_ => None,
		}
	}
}

/// One operand of one instruction variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
	/// A class whose width is part of its name, e.g. `r/m16` or `imm8`.
	Sized(OperandClass, Width),
	/// `reg` or a bare `m`; only valid until the expander picks a width.
	Generic(OperandClass),
	Named(NamedRegister),
	/// The constant `1` of the shift-by-one forms.
	One,
}

impl Operand {
	pub const fn width(&self) -> Option<Width> {
		match self {
			Self::Sized(_, width) => Some(*width),
			Self::Named(register) => Some(register.width()),
			Self::Generic(_) | Self::One => None,
		}
	}

	pub const fn is_generic(&self) -> bool {
		matches!(self, Self::Generic(_))
	}

	/// Gives a generic operand a concrete width; anything else is unchanged.
	pub const fn resolve(self, width: Width) -> Self {
		match self {
			Self::Generic(class) => Self::Sized(class, width),
			other => other,
		}
	}

	/// Bytes the operand adds after the opcode: immediates by width, memory
	/// offsets always a full address.
	pub const fn footprint(&self) -> i32 {
		match self {
			Self::Sized(OperandClass::Immediate, width) => width.bytes() as i32,
			Self::Sized(OperandClass::MemoryOffset, _) => 8,
			_ => 0,
		}
	}
}

impl Display for Operand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Sized(class, width) => write!(f, "{}{}", class.category(), width.bits()),
			Self::Generic(class) => f.write_str(class.category()),
			Self::Named(register) => f.write_str(register.name()),
			Self::One => f.write_str("1"),
		}
	}
}

/// Parses one operand token of the manual's mnemonic syntax.
///
/// A `rel` operand is an immediate that additionally marks the variant as a
/// relative jump.
pub fn parse_operand(
	token: &str,
	flags: EncodingFlagsBuilder,
) -> RowResult<(Operand, EncodingFlagsBuilder)> {
	// integer and floating-point memory operands encode like any other memory operand
	let unsuffixed = token
		.strip_suffix("int")
		.or_else(|| token.strip_suffix("fp"))
		.unwrap_or(token);

	let class = unsuffixed.trim_end_matches(|char: char| char.is_ascii_digit());
	let digits = &unsuffixed[class.len()..];

	let (class, flags) = match class {
		"rel" => ("imm", flags.with(EncodingFlag::RelativeJump)),
		_ => (class, flags),
	};

	let unrecognized = || RowError::UnrecognizedOperand(token.to_owned());

	if digits.is_empty() {
		let operand = match class {
			"reg" => Operand::Generic(OperandClass::Register),
			"m" => Operand::Generic(OperandClass::Memory),
			_ => Operand::Named(NamedRegister::from_token(class).ok_or_else(unrecognized)?),
		};

		return Ok((operand, flags));
	}

	if class.is_empty() && digits == "1" {
		return Ok((Operand::One, flags));
	}

	let class = OperandClass::from_token(class).ok_or_else(unrecognized)?;
	let bits = digits.parse::<u32>().unwrap_or(u32::MAX);
	let width = match bits {
		0 => return Err(RowError::UnsetWidth(token.to_owned())),
		bits => Width::from_bits(bits).ok_or_else(|| RowError::UnsupportedWidth {
			token: token.to_owned(),
			bits,
		})?,
	};

	Ok((Operand::Sized(class, width), flags))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(token: &str) -> RowResult<Operand> {
		parse_operand(token, EncodingFlagsBuilder::new()).map(|(operand, _)| operand)
	}

	#[test]
	fn sized_classes() {
		assert_eq!(
			parse("r/m16"),
			Ok(Operand::Sized(OperandClass::RegisterOrMemory, Width::W16))
		);
		assert_eq!(parse("imm8"), Ok(Operand::Sized(OperandClass::Immediate, Width::W8)));
		assert_eq!(
			parse("moffs64"),
			Ok(Operand::Sized(OperandClass::MemoryOffset, Width::W64))
		);
		assert_eq!(
			parse("xmm/m128"),
			Ok(Operand::Sized(OperandClass::XmmOrMemory, Width::W128))
		);
		assert_eq!(parse("r64"), Ok(Operand::Sized(OperandClass::Register, Width::W64)));
		assert_eq!(
			parse("regna32"),
			Ok(Operand::Sized(OperandClass::RegisterNoAccumulator, Width::W32))
		);
		assert_eq!(parse("regna32").unwrap().to_string(), "RNA32");
	}

	#[test]
	fn type_suffixes_are_ignored() {
		assert_eq!(parse("m32fp"), Ok(Operand::Sized(OperandClass::Memory, Width::W32)));
		assert_eq!(parse("m16int"), Ok(Operand::Sized(OperandClass::Memory, Width::W16)));
	}

	#[test]
	fn relative_operands_become_immediates() {
		let (operand, flags) = parse_operand("rel32", EncodingFlagsBuilder::new()).unwrap();

		assert_eq!(operand, Operand::Sized(OperandClass::Immediate, Width::W32));
		assert!(flags.contains(EncodingFlag::RelativeJump));
	}

	#[test]
	fn literal_one() {
		let operand = parse("1").unwrap();
		assert_eq!(operand, Operand::One);
		assert_eq!(operand.width(), None);
		assert_eq!(operand.to_string(), "1");
	}

	#[test]
	fn generic_operands_are_unresolved() {
		assert_eq!(parse("reg"), Ok(Operand::Generic(OperandClass::Register)));
		assert_eq!(parse("m"), Ok(Operand::Generic(OperandClass::Memory)));
		assert!(parse("m").unwrap().is_generic());
		assert_eq!(
			parse("reg").unwrap().resolve(Width::W32),
			Operand::Sized(OperandClass::Register, Width::W32)
		);
	}

	#[test]
	fn named_registers_hide_their_width() {
		let operand = parse("Sreg").unwrap();
		assert_eq!(operand, Operand::Named(NamedRegister::SegmentRegister));
		assert_eq!(operand.width(), Some(Width::W16));
		assert_eq!(operand.to_string(), "SEG");

		assert_eq!(parse("xmm").unwrap().to_string(), "XMM");
		assert_eq!(parse("ECX").unwrap().width(), Some(Width::W32));
		assert_eq!(parse("creg").unwrap().to_string(), "CR");
	}

	#[test]
	fn rendering_appends_width() {
		assert_eq!(parse("r/m8").unwrap().to_string(), "RM8");
		assert_eq!(parse("mm/m64").unwrap().to_string(), "MMXRM64");
		assert_eq!(parse("rel8").unwrap().to_string(), "IMM8");
	}

	#[test]
	fn unknown_classes_fail() {
		assert_eq!(parse("zz8"), Err(RowError::UnrecognizedOperand("zz8".into())));
		assert_eq!(parse("m16:16"), Err(RowError::UnrecognizedOperand("m16:16".into())));
		assert_eq!(parse("ST(i)"), Err(RowError::UnrecognizedOperand("ST(i)".into())));
		assert_eq!(parse("rel"), Err(RowError::UnrecognizedOperand("rel".into())));
		assert_eq!(parse("8"), Err(RowError::UnrecognizedOperand("8".into())));
	}

	#[test]
	fn bad_widths_fail() {
		assert_eq!(
			parse("r12"),
			Err(RowError::UnsupportedWidth {
				token: "r12".into(),
				bits: 12,
			})
		);
		assert_eq!(parse("m0"), Err(RowError::UnsetWidth("m0".into())));
	}

	#[test]
	fn every_supported_width_parses() {
		for width in Width::ALL {
			let token = format!("r/m{}", width.bits());
			assert_eq!(
				parse(&token),
				Ok(Operand::Sized(OperandClass::RegisterOrMemory, width))
			);
			assert_eq!(Width::from_bits(width.bits()), Some(width));
		}
	}

	#[test]
	fn immediate_and_offset_footprints() {
		assert_eq!(parse("imm16").unwrap().footprint(), 2);
		assert_eq!(parse("imm64").unwrap().footprint(), 8);
		assert_eq!(parse("moffs8").unwrap().footprint(), 8);
		assert_eq!(parse("r/m32").unwrap().footprint(), 0);
		assert_eq!(parse("AL").unwrap().footprint(), 0);
	}
}
