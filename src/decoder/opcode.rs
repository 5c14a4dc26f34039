//! The NMOS 6502 opcode table.

use std::fmt::{Display, Formatter};

use sidpack_derive::{Parse, VariantName};

use crate::VariantName as _;

/// Instruction mnemonics of the NMOS 6502, including the undocumented ones.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Parse, VariantName)]
#[allow(missing_docs)]
pub enum Mnemonic {
	Adc,
	And,
	Asl,
	Bcc,
	Bcs,
	Beq,
	Bit,
	Bmi,
	Bne,
	Bpl,
	Brk,
	Bvc,
	Bvs,
	Clc,
	Cld,
	Cli,
	Clv,
	Cmp,
	Cpx,
	Cpy,
	Dec,
	Dex,
	Dey,
	Eor,
	Inc,
	Inx,
	Iny,
	Jmp,
	Jsr,
	Lda,
	Ldx,
	Ldy,
	Lsr,
	Nop,
	Ora,
	Pha,
	Php,
	Pla,
	Plp,
	Rol,
	Ror,
	Rti,
	Rts,
	Sbc,
	Sec,
	Sed,
	Sei,
	Sta,
	Stx,
	Sty,
	Tax,
	Tay,
	Tsx,
	Txa,
	Txs,
	Tya,
	// undocumented
	Slo,
	Rla,
	Sre,
	Rra,
	Sax,
	Lax,
	Dcp,
	Isc,
	Anc,
	Alr,
	Arr,
	Xaa,
	Axs,
	Ahx,
	Shy,
	Shx,
	Tas,
	Las,
	/// Halts the CPU.
	Jam,
	/// Not an instruction: a byte that was decoded as data.
	Byte,
}

impl Mnemonic {
	/// Whether this is one of the conditional branches.
	#[must_use]
	pub const fn is_branch(self) -> bool {
		matches!(self, Self::Bcc | Self::Bcs | Self::Beq | Self::Bmi | Self::Bne | Self::Bpl | Self::Bvc | Self::Bvs)
	}
}

impl Display for Mnemonic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Byte => f.write_str(".byte"),
			_ => f.write_str(self.variant_name()),
		}
	}
}

/// The ways a 6502 instruction can address its operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AddressingMode {
	/// No operand.
	Implied,
	/// Operates on A, written `ASL A`.
	Accumulator,
	/// `#$xx`
	Immediate,
	/// `$xx`
	ZeroPage,
	/// `$xx,X`
	ZeroPageX,
	/// `$xx,Y`
	ZeroPageY,
	/// `$xxxx`
	Absolute,
	/// `$xxxx,X`
	AbsoluteX,
	/// `$xxxx,Y`
	AbsoluteY,
	/// `($xxxx)`, only used by `JMP`.
	Indirect,
	/// `($xx,X)`
	IndexedIndirect,
	/// `($xx),Y`
	IndirectIndexed,
	/// Signed 8-bit branch offset.
	Relative,
}

impl AddressingMode {
	/// Number of operand bytes following the opcode.
	#[must_use]
	pub const fn operand_size(self) -> u8 {
		match self {
			Self::Implied | Self::Accumulator => 0,
			Self::Immediate
			| Self::ZeroPage
			| Self::ZeroPageX
			| Self::ZeroPageY
			| Self::IndexedIndirect
			| Self::IndirectIndexed
			| Self::Relative => 1,
			Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
		}
	}

	/// Whether the operand is a full 16-bit memory address.
	#[must_use]
	pub const fn has_absolute_address(self) -> bool {
		matches!(self, Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect)
	}

	/// Whether the operand is a zero page address.
	#[must_use]
	pub const fn has_zero_page_address(self) -> bool {
		matches!(self, Self::ZeroPage | Self::ZeroPageX | Self::ZeroPageY | Self::IndexedIndirect | Self::IndirectIndexed)
	}
}

/// One entry of the opcode table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Opcode {
	/// Instruction mnemonic.
	pub mnemonic:        Mnemonic,
	/// Addressing mode of the operand.
	pub addressing_mode: AddressingMode,
	/// Whether the opcode is undocumented.
	pub illegal:         bool,
}

impl Opcode {
	/// Total instruction size including the opcode byte.
	#[must_use]
	pub const fn size(&self) -> u8 {
		1 + self.addressing_mode.operand_size()
	}
}

const fn op(mnemonic: Mnemonic, addressing_mode: AddressingMode) -> Opcode {
	Opcode { mnemonic, addressing_mode, illegal: false }
}

const fn illegal(mnemonic: Mnemonic, addressing_mode: AddressingMode) -> Opcode {
	Opcode { mnemonic, addressing_mode, illegal: true }
}

/// All 256 opcodes, indexed by opcode byte.
pub static OPCODE_TABLE: [Opcode; 256] = [
	/* 00 */ op(Mnemonic::Brk, AddressingMode::Implied),
	/* 01 */ op(Mnemonic::Ora, AddressingMode::IndexedIndirect),
	/* 02 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 03 */ illegal(Mnemonic::Slo, AddressingMode::IndexedIndirect),
	/* 04 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPage),
	/* 05 */ op(Mnemonic::Ora, AddressingMode::ZeroPage),
	/* 06 */ op(Mnemonic::Asl, AddressingMode::ZeroPage),
	/* 07 */ illegal(Mnemonic::Slo, AddressingMode::ZeroPage),
	/* 08 */ op(Mnemonic::Php, AddressingMode::Implied),
	/* 09 */ op(Mnemonic::Ora, AddressingMode::Immediate),
	/* 0A */ op(Mnemonic::Asl, AddressingMode::Accumulator),
	/* 0B */ illegal(Mnemonic::Anc, AddressingMode::Immediate),
	/* 0C */ illegal(Mnemonic::Nop, AddressingMode::Absolute),
	/* 0D */ op(Mnemonic::Ora, AddressingMode::Absolute),
	/* 0E */ op(Mnemonic::Asl, AddressingMode::Absolute),
	/* 0F */ illegal(Mnemonic::Slo, AddressingMode::Absolute),
	/* 10 */ op(Mnemonic::Bpl, AddressingMode::Relative),
	/* 11 */ op(Mnemonic::Ora, AddressingMode::IndirectIndexed),
	/* 12 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 13 */ illegal(Mnemonic::Slo, AddressingMode::IndirectIndexed),
	/* 14 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* 15 */ op(Mnemonic::Ora, AddressingMode::ZeroPageX),
	/* 16 */ op(Mnemonic::Asl, AddressingMode::ZeroPageX),
	/* 17 */ illegal(Mnemonic::Slo, AddressingMode::ZeroPageX),
	/* 18 */ op(Mnemonic::Clc, AddressingMode::Implied),
	/* 19 */ op(Mnemonic::Ora, AddressingMode::AbsoluteY),
	/* 1A */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* 1B */ illegal(Mnemonic::Slo, AddressingMode::AbsoluteY),
	/* 1C */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* 1D */ op(Mnemonic::Ora, AddressingMode::AbsoluteX),
	/* 1E */ op(Mnemonic::Asl, AddressingMode::AbsoluteX),
	/* 1F */ illegal(Mnemonic::Slo, AddressingMode::AbsoluteX),
	/* 20 */ op(Mnemonic::Jsr, AddressingMode::Absolute),
	/* 21 */ op(Mnemonic::And, AddressingMode::IndexedIndirect),
	/* 22 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 23 */ illegal(Mnemonic::Rla, AddressingMode::IndexedIndirect),
	/* 24 */ op(Mnemonic::Bit, AddressingMode::ZeroPage),
	/* 25 */ op(Mnemonic::And, AddressingMode::ZeroPage),
	/* 26 */ op(Mnemonic::Rol, AddressingMode::ZeroPage),
	/* 27 */ illegal(Mnemonic::Rla, AddressingMode::ZeroPage),
	/* 28 */ op(Mnemonic::Plp, AddressingMode::Implied),
	/* 29 */ op(Mnemonic::And, AddressingMode::Immediate),
	/* 2A */ op(Mnemonic::Rol, AddressingMode::Accumulator),
	/* 2B */ illegal(Mnemonic::Anc, AddressingMode::Immediate),
	/* 2C */ op(Mnemonic::Bit, AddressingMode::Absolute),
	/* 2D */ op(Mnemonic::And, AddressingMode::Absolute),
	/* 2E */ op(Mnemonic::Rol, AddressingMode::Absolute),
	/* 2F */ illegal(Mnemonic::Rla, AddressingMode::Absolute),
	/* 30 */ op(Mnemonic::Bmi, AddressingMode::Relative),
	/* 31 */ op(Mnemonic::And, AddressingMode::IndirectIndexed),
	/* 32 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 33 */ illegal(Mnemonic::Rla, AddressingMode::IndirectIndexed),
	/* 34 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* 35 */ op(Mnemonic::And, AddressingMode::ZeroPageX),
	/* 36 */ op(Mnemonic::Rol, AddressingMode::ZeroPageX),
	/* 37 */ illegal(Mnemonic::Rla, AddressingMode::ZeroPageX),
	/* 38 */ op(Mnemonic::Sec, AddressingMode::Implied),
	/* 39 */ op(Mnemonic::And, AddressingMode::AbsoluteY),
	/* 3A */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* 3B */ illegal(Mnemonic::Rla, AddressingMode::AbsoluteY),
	/* 3C */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* 3D */ op(Mnemonic::And, AddressingMode::AbsoluteX),
	/* 3E */ op(Mnemonic::Rol, AddressingMode::AbsoluteX),
	/* 3F */ illegal(Mnemonic::Rla, AddressingMode::AbsoluteX),
	/* 40 */ op(Mnemonic::Rti, AddressingMode::Implied),
	/* 41 */ op(Mnemonic::Eor, AddressingMode::IndexedIndirect),
	/* 42 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 43 */ illegal(Mnemonic::Sre, AddressingMode::IndexedIndirect),
	/* 44 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPage),
	/* 45 */ op(Mnemonic::Eor, AddressingMode::ZeroPage),
	/* 46 */ op(Mnemonic::Lsr, AddressingMode::ZeroPage),
	/* 47 */ illegal(Mnemonic::Sre, AddressingMode::ZeroPage),
	/* 48 */ op(Mnemonic::Pha, AddressingMode::Implied),
	/* 49 */ op(Mnemonic::Eor, AddressingMode::Immediate),
	/* 4A */ op(Mnemonic::Lsr, AddressingMode::Accumulator),
	/* 4B */ illegal(Mnemonic::Alr, AddressingMode::Immediate),
	/* 4C */ op(Mnemonic::Jmp, AddressingMode::Absolute),
	/* 4D */ op(Mnemonic::Eor, AddressingMode::Absolute),
	/* 4E */ op(Mnemonic::Lsr, AddressingMode::Absolute),
	/* 4F */ illegal(Mnemonic::Sre, AddressingMode::Absolute),
	/* 50 */ op(Mnemonic::Bvc, AddressingMode::Relative),
	/* 51 */ op(Mnemonic::Eor, AddressingMode::IndirectIndexed),
	/* 52 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 53 */ illegal(Mnemonic::Sre, AddressingMode::IndirectIndexed),
	/* 54 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* 55 */ op(Mnemonic::Eor, AddressingMode::ZeroPageX),
	/* 56 */ op(Mnemonic::Lsr, AddressingMode::ZeroPageX),
	/* 57 */ illegal(Mnemonic::Sre, AddressingMode::ZeroPageX),
	/* 58 */ op(Mnemonic::Cli, AddressingMode::Implied),
	/* 59 */ op(Mnemonic::Eor, AddressingMode::AbsoluteY),
	/* 5A */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* 5B */ illegal(Mnemonic::Sre, AddressingMode::AbsoluteY),
	/* 5C */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* 5D */ op(Mnemonic::Eor, AddressingMode::AbsoluteX),
	/* 5E */ op(Mnemonic::Lsr, AddressingMode::AbsoluteX),
	/* 5F */ illegal(Mnemonic::Sre, AddressingMode::AbsoluteX),
	/* 60 */ op(Mnemonic::Rts, AddressingMode::Implied),
	/* 61 */ op(Mnemonic::Adc, AddressingMode::IndexedIndirect),
	/* 62 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 63 */ illegal(Mnemonic::Rra, AddressingMode::IndexedIndirect),
	/* 64 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPage),
	/* 65 */ op(Mnemonic::Adc, AddressingMode::ZeroPage),
	/* 66 */ op(Mnemonic::Ror, AddressingMode::ZeroPage),
	/* 67 */ illegal(Mnemonic::Rra, AddressingMode::ZeroPage),
	/* 68 */ op(Mnemonic::Pla, AddressingMode::Implied),
	/* 69 */ op(Mnemonic::Adc, AddressingMode::Immediate),
	/* 6A */ op(Mnemonic::Ror, AddressingMode::Accumulator),
	/* 6B */ illegal(Mnemonic::Arr, AddressingMode::Immediate),
	/* 6C */ op(Mnemonic::Jmp, AddressingMode::Indirect),
	/* 6D */ op(Mnemonic::Adc, AddressingMode::Absolute),
	/* 6E */ op(Mnemonic::Ror, AddressingMode::Absolute),
	/* 6F */ illegal(Mnemonic::Rra, AddressingMode::Absolute),
	/* 70 */ op(Mnemonic::Bvs, AddressingMode::Relative),
	/* 71 */ op(Mnemonic::Adc, AddressingMode::IndirectIndexed),
	/* 72 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 73 */ illegal(Mnemonic::Rra, AddressingMode::IndirectIndexed),
	/* 74 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* 75 */ op(Mnemonic::Adc, AddressingMode::ZeroPageX),
	/* 76 */ op(Mnemonic::Ror, AddressingMode::ZeroPageX),
	/* 77 */ illegal(Mnemonic::Rra, AddressingMode::ZeroPageX),
	/* 78 */ op(Mnemonic::Sei, AddressingMode::Implied),
	/* 79 */ op(Mnemonic::Adc, AddressingMode::AbsoluteY),
	/* 7A */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* 7B */ illegal(Mnemonic::Rra, AddressingMode::AbsoluteY),
	/* 7C */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* 7D */ op(Mnemonic::Adc, AddressingMode::AbsoluteX),
	/* 7E */ op(Mnemonic::Ror, AddressingMode::AbsoluteX),
	/* 7F */ illegal(Mnemonic::Rra, AddressingMode::AbsoluteX),
	/* 80 */ illegal(Mnemonic::Nop, AddressingMode::Immediate),
	/* 81 */ op(Mnemonic::Sta, AddressingMode::IndexedIndirect),
	/* 82 */ illegal(Mnemonic::Nop, AddressingMode::Immediate),
	/* 83 */ illegal(Mnemonic::Sax, AddressingMode::IndexedIndirect),
	/* 84 */ op(Mnemonic::Sty, AddressingMode::ZeroPage),
	/* 85 */ op(Mnemonic::Sta, AddressingMode::ZeroPage),
	/* 86 */ op(Mnemonic::Stx, AddressingMode::ZeroPage),
	/* 87 */ illegal(Mnemonic::Sax, AddressingMode::ZeroPage),
	/* 88 */ op(Mnemonic::Dey, AddressingMode::Implied),
	/* 89 */ illegal(Mnemonic::Nop, AddressingMode::Immediate),
	/* 8A */ op(Mnemonic::Txa, AddressingMode::Implied),
	/* 8B */ illegal(Mnemonic::Xaa, AddressingMode::Immediate),
	/* 8C */ op(Mnemonic::Sty, AddressingMode::Absolute),
	/* 8D */ op(Mnemonic::Sta, AddressingMode::Absolute),
	/* 8E */ op(Mnemonic::Stx, AddressingMode::Absolute),
	/* 8F */ illegal(Mnemonic::Sax, AddressingMode::Absolute),
	/* 90 */ op(Mnemonic::Bcc, AddressingMode::Relative),
	/* 91 */ op(Mnemonic::Sta, AddressingMode::IndirectIndexed),
	/* 92 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* 93 */ illegal(Mnemonic::Ahx, AddressingMode::IndirectIndexed),
	/* 94 */ op(Mnemonic::Sty, AddressingMode::ZeroPageX),
	/* 95 */ op(Mnemonic::Sta, AddressingMode::ZeroPageX),
	/* 96 */ op(Mnemonic::Stx, AddressingMode::ZeroPageY),
	/* 97 */ illegal(Mnemonic::Sax, AddressingMode::ZeroPageY),
	/* 98 */ op(Mnemonic::Tya, AddressingMode::Implied),
	/* 99 */ op(Mnemonic::Sta, AddressingMode::AbsoluteY),
	/* 9A */ op(Mnemonic::Txs, AddressingMode::Implied),
	/* 9B */ illegal(Mnemonic::Tas, AddressingMode::AbsoluteY),
	/* 9C */ illegal(Mnemonic::Shy, AddressingMode::AbsoluteX),
	/* 9D */ op(Mnemonic::Sta, AddressingMode::AbsoluteX),
	/* 9E */ illegal(Mnemonic::Shx, AddressingMode::AbsoluteY),
	/* 9F */ illegal(Mnemonic::Ahx, AddressingMode::AbsoluteY),
	/* A0 */ op(Mnemonic::Ldy, AddressingMode::Immediate),
	/* A1 */ op(Mnemonic::Lda, AddressingMode::IndexedIndirect),
	/* A2 */ op(Mnemonic::Ldx, AddressingMode::Immediate),
	/* A3 */ illegal(Mnemonic::Lax, AddressingMode::IndexedIndirect),
	/* A4 */ op(Mnemonic::Ldy, AddressingMode::ZeroPage),
	/* A5 */ op(Mnemonic::Lda, AddressingMode::ZeroPage),
	/* A6 */ op(Mnemonic::Ldx, AddressingMode::ZeroPage),
	/* A7 */ illegal(Mnemonic::Lax, AddressingMode::ZeroPage),
	/* A8 */ op(Mnemonic::Tay, AddressingMode::Implied),
	/* A9 */ op(Mnemonic::Lda, AddressingMode::Immediate),
	/* AA */ op(Mnemonic::Tax, AddressingMode::Implied),
	/* AB */ illegal(Mnemonic::Lax, AddressingMode::Immediate),
	/* AC */ op(Mnemonic::Ldy, AddressingMode::Absolute),
	/* AD */ op(Mnemonic::Lda, AddressingMode::Absolute),
	/* AE */ op(Mnemonic::Ldx, AddressingMode::Absolute),
	/* AF */ illegal(Mnemonic::Lax, AddressingMode::Absolute),
	/* B0 */ op(Mnemonic::Bcs, AddressingMode::Relative),
	/* B1 */ op(Mnemonic::Lda, AddressingMode::IndirectIndexed),
	/* B2 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* B3 */ illegal(Mnemonic::Lax, AddressingMode::IndirectIndexed),
	/* B4 */ op(Mnemonic::Ldy, AddressingMode::ZeroPageX),
	/* B5 */ op(Mnemonic::Lda, AddressingMode::ZeroPageX),
	/* B6 */ op(Mnemonic::Ldx, AddressingMode::ZeroPageY),
	/* B7 */ illegal(Mnemonic::Lax, AddressingMode::ZeroPageY),
	/* B8 */ op(Mnemonic::Clv, AddressingMode::Implied),
	/* B9 */ op(Mnemonic::Lda, AddressingMode::AbsoluteY),
	/* BA */ op(Mnemonic::Tsx, AddressingMode::Implied),
	/* BB */ illegal(Mnemonic::Las, AddressingMode::AbsoluteY),
	/* BC */ op(Mnemonic::Ldy, AddressingMode::AbsoluteX),
	/* BD */ op(Mnemonic::Lda, AddressingMode::AbsoluteX),
	/* BE */ op(Mnemonic::Ldx, AddressingMode::AbsoluteY),
	/* BF */ illegal(Mnemonic::Lax, AddressingMode::AbsoluteY),
	/* C0 */ op(Mnemonic::Cpy, AddressingMode::Immediate),
	/* C1 */ op(Mnemonic::Cmp, AddressingMode::IndexedIndirect),
	/* C2 */ illegal(Mnemonic::Nop, AddressingMode::Immediate),
	/* C3 */ illegal(Mnemonic::Dcp, AddressingMode::IndexedIndirect),
	/* C4 */ op(Mnemonic::Cpy, AddressingMode::ZeroPage),
	/* C5 */ op(Mnemonic::Cmp, AddressingMode::ZeroPage),
	/* C6 */ op(Mnemonic::Dec, AddressingMode::ZeroPage),
	/* C7 */ illegal(Mnemonic::Dcp, AddressingMode::ZeroPage),
	/* C8 */ op(Mnemonic::Iny, AddressingMode::Implied),
	/* C9 */ op(Mnemonic::Cmp, AddressingMode::Immediate),
	/* CA */ op(Mnemonic::Dex, AddressingMode::Implied),
	/* CB */ illegal(Mnemonic::Axs, AddressingMode::Immediate),
	/* CC */ op(Mnemonic::Cpy, AddressingMode::Absolute),
	/* CD */ op(Mnemonic::Cmp, AddressingMode::Absolute),
	/* CE */ op(Mnemonic::Dec, AddressingMode::Absolute),
	/* CF */ illegal(Mnemonic::Dcp, AddressingMode::Absolute),
	/* D0 */ op(Mnemonic::Bne, AddressingMode::Relative),
	/* D1 */ op(Mnemonic::Cmp, AddressingMode::IndirectIndexed),
	/* D2 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* D3 */ illegal(Mnemonic::Dcp, AddressingMode::IndirectIndexed),
	/* D4 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* D5 */ op(Mnemonic::Cmp, AddressingMode::ZeroPageX),
	/* D6 */ op(Mnemonic::Dec, AddressingMode::ZeroPageX),
	/* D7 */ illegal(Mnemonic::Dcp, AddressingMode::ZeroPageX),
	/* D8 */ op(Mnemonic::Cld, AddressingMode::Implied),
	/* D9 */ op(Mnemonic::Cmp, AddressingMode::AbsoluteY),
	/* DA */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* DB */ illegal(Mnemonic::Dcp, AddressingMode::AbsoluteY),
	/* DC */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* DD */ op(Mnemonic::Cmp, AddressingMode::AbsoluteX),
	/* DE */ op(Mnemonic::Dec, AddressingMode::AbsoluteX),
	/* DF */ illegal(Mnemonic::Dcp, AddressingMode::AbsoluteX),
	/* E0 */ op(Mnemonic::Cpx, AddressingMode::Immediate),
	/* E1 */ op(Mnemonic::Sbc, AddressingMode::IndexedIndirect),
	/* E2 */ illegal(Mnemonic::Nop, AddressingMode::Immediate),
	/* E3 */ illegal(Mnemonic::Isc, AddressingMode::IndexedIndirect),
	/* E4 */ op(Mnemonic::Cpx, AddressingMode::ZeroPage),
	/* E5 */ op(Mnemonic::Sbc, AddressingMode::ZeroPage),
	/* E6 */ op(Mnemonic::Inc, AddressingMode::ZeroPage),
	/* E7 */ illegal(Mnemonic::Isc, AddressingMode::ZeroPage),
	/* E8 */ op(Mnemonic::Inx, AddressingMode::Implied),
	/* E9 */ op(Mnemonic::Sbc, AddressingMode::Immediate),
	/* EA */ op(Mnemonic::Nop, AddressingMode::Implied),
	/* EB */ illegal(Mnemonic::Sbc, AddressingMode::Immediate),
	/* EC */ op(Mnemonic::Cpx, AddressingMode::Absolute),
	/* ED */ op(Mnemonic::Sbc, AddressingMode::Absolute),
	/* EE */ op(Mnemonic::Inc, AddressingMode::Absolute),
	/* EF */ illegal(Mnemonic::Isc, AddressingMode::Absolute),
	/* F0 */ op(Mnemonic::Beq, AddressingMode::Relative),
	/* F1 */ op(Mnemonic::Sbc, AddressingMode::IndirectIndexed),
	/* F2 */ illegal(Mnemonic::Jam, AddressingMode::Implied),
	/* F3 */ illegal(Mnemonic::Isc, AddressingMode::IndirectIndexed),
	/* F4 */ illegal(Mnemonic::Nop, AddressingMode::ZeroPageX),
	/* F5 */ op(Mnemonic::Sbc, AddressingMode::ZeroPageX),
	/* F6 */ op(Mnemonic::Inc, AddressingMode::ZeroPageX),
	/* F7 */ illegal(Mnemonic::Isc, AddressingMode::ZeroPageX),
	/* F8 */ op(Mnemonic::Sed, AddressingMode::Implied),
	/* F9 */ op(Mnemonic::Sbc, AddressingMode::AbsoluteY),
	/* FA */ illegal(Mnemonic::Nop, AddressingMode::Implied),
	/* FB */ illegal(Mnemonic::Isc, AddressingMode::AbsoluteY),
	/* FC */ illegal(Mnemonic::Nop, AddressingMode::AbsoluteX),
	/* FD */ op(Mnemonic::Sbc, AddressingMode::AbsoluteX),
	/* FE */ op(Mnemonic::Inc, AddressingMode::AbsoluteX),
	/* FF */ illegal(Mnemonic::Isc, AddressingMode::AbsoluteX),
];
