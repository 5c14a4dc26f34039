//! 6502 instruction decoding.
//!
//! Decoding always advances by the size of the instruction just decoded. Bytes that can't be decoded as an instruction
//! (illegal opcodes when those are disabled, instructions cut off by the end of the buffer) become one-byte data
//! pseudo-instructions, so decoding never fails and never loses track of the byte stream.

use std::fmt::{Display, Formatter};

pub mod opcode;
pub mod trace;
#[cfg(test)] mod test;

pub use opcode::{AddressingMode, Mnemonic, OPCODE_TABLE, Opcode};

/// Options that change how bytes are decoded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecoderOptions {
	/// Decode undocumented opcodes (`LAX`, `SAX`, `DCP` and friends) as instructions. Otherwise, they are data.
	pub illegal_opcodes: bool,
}

/// Why a byte was decoded as data instead of as an instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DecodeAnomaly {
	/// The opcode is undocumented and those are disabled, or it halts the CPU.
	IllegalOpcode,
	/// The instruction would need `size` bytes, but the buffer ends before that.
	TruncatedInstruction {
		/// Size the instruction would have had.
		size: u8,
	},
}

/// A decoded instruction or data byte. Instructions are never modified once decoded; relocation patches the underlying
/// byte buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
	/// Address of the opcode byte.
	pub address:         u16,
	/// Position of the opcode byte in the decoded buffer.
	pub offset:          usize,
	/// The opcode byte.
	pub opcode:          u8,
	/// Instruction mnemonic; [`Mnemonic::Byte`] for data.
	pub mnemonic:        Mnemonic,
	/// Addressing mode; [`AddressingMode::Implied`] for data.
	pub addressing_mode: AddressingMode,
	operand:             [u8; 2],
	/// Number of bytes this instruction occupies, 1 to 3.
	pub size:            u8,
	/// Set for data pseudo-instructions.
	pub anomaly:         Option<DecodeAnomaly>,
}

impl Instruction {
	fn data(address: u16, offset: usize, opcode: u8, anomaly: DecodeAnomaly) -> Self {
		Self {
			address,
			offset,
			opcode,
			mnemonic: Mnemonic::Byte,
			addressing_mode: AddressingMode::Implied,
			operand: [0; 2],
			size: 1,
			anomaly: Some(anomaly),
		}
	}

	/// Whether this is an instruction and not a data byte.
	#[must_use]
	pub const fn is_code(&self) -> bool {
		self.anomaly.is_none()
	}

	/// Whether this is an undocumented instruction.
	#[must_use]
	pub fn is_illegal(&self) -> bool {
		self.is_code() && OPCODE_TABLE[usize::from(self.opcode)].illegal
	}

	/// The operand bytes, without the opcode.
	#[must_use]
	pub fn operand(&self) -> &[u8] {
		&self.operand[.. usize::from(self.size - 1)]
	}

	/// The 16-bit memory address this instruction accesses, for the absolute and indirect modes.
	#[must_use]
	pub fn absolute_target(&self) -> Option<u16> {
		(self.is_code() && self.addressing_mode.has_absolute_address()).then(|| u16::from_le_bytes(self.operand))
	}

	/// The zero page address this instruction accesses, for the zero page modes.
	#[must_use]
	pub fn zero_page_address(&self) -> Option<u8> {
		(self.is_code() && self.addressing_mode.has_zero_page_address()).then_some(self.operand[0])
	}

	/// Target of a relative branch: the address after the branch plus the signed offset, wrapping around the address
	/// space.
	#[must_use]
	pub fn branch_target(&self) -> Option<u16> {
		#[allow(clippy::cast_possible_wrap)]
		let offset = i16::from(self.operand[0] as i8);
		(self.is_code() && self.addressing_mode == AddressingMode::Relative)
			.then(|| self.next_address().wrapping_add_signed(offset))
	}

	/// Where control may continue other than the next instruction: branch, `JSR` and absolute `JMP` targets.
	#[must_use]
	pub fn flow_target(&self) -> Option<u16> {
		match (self.mnemonic, self.addressing_mode) {
			(Mnemonic::Jsr | Mnemonic::Jmp, AddressingMode::Absolute) => self.absolute_target(),
			(_, AddressingMode::Relative) => self.branch_target(),
			_ => None,
		}
	}

	/// Whether execution never falls through to the next instruction.
	#[must_use]
	pub const fn ends_flow(&self) -> bool {
		!self.is_code() || matches!(self.mnemonic, Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Jmp | Mnemonic::Brk)
	}

	/// Address directly after this instruction.
	#[must_use]
	pub const fn next_address(&self) -> u16 {
		self.address.wrapping_add(self.size as u16)
	}

	/// Buffer offset directly after this instruction.
	#[must_use]
	pub const fn end_offset(&self) -> usize {
		self.offset + self.size as usize
	}
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mnemonic = self.mnemonic;
		let [low, _] = self.operand;
		let word = u16::from_le_bytes(self.operand);
		match self.addressing_mode {
			_ if !self.is_code() => write!(f, "{mnemonic} ${:02X}", self.opcode),
			AddressingMode::Implied => write!(f, "{mnemonic}"),
			AddressingMode::Accumulator => write!(f, "{mnemonic} A"),
			AddressingMode::Immediate => write!(f, "{mnemonic} #${low:02X}"),
			AddressingMode::ZeroPage => write!(f, "{mnemonic} ${low:02X}"),
			AddressingMode::ZeroPageX => write!(f, "{mnemonic} ${low:02X},X"),
			AddressingMode::ZeroPageY => write!(f, "{mnemonic} ${low:02X},Y"),
			AddressingMode::Absolute => write!(f, "{mnemonic} ${word:04X}"),
			AddressingMode::AbsoluteX => write!(f, "{mnemonic} ${word:04X},X"),
			AddressingMode::AbsoluteY => write!(f, "{mnemonic} ${word:04X},Y"),
			AddressingMode::Indirect => write!(f, "{mnemonic} (${word:04X})"),
			AddressingMode::IndexedIndirect => write!(f, "{mnemonic} (${low:02X},X)"),
			AddressingMode::IndirectIndexed => write!(f, "{mnemonic} (${low:02X}),Y"),
			AddressingMode::Relative => write!(f, "{mnemonic} ${:04X}", self.branch_target().unwrap_or_default()),
		}
	}
}

/// Decodes the instruction at `offset` of `buffer`, where `buffer` is loaded at `base`. Returns `None` only if
/// `offset` is past the end of the buffer.
#[must_use]
pub fn decode_one(buffer: &[u8], base: u16, offset: usize, options: DecoderOptions) -> Option<Instruction> {
	let &opcode = buffer.get(offset)?;
	#[allow(clippy::cast_possible_truncation)]
	let address = base.wrapping_add(offset as u16);
	let entry = OPCODE_TABLE[usize::from(opcode)];

	if entry.illegal && (!options.illegal_opcodes || entry.mnemonic == Mnemonic::Jam) {
		return Some(Instruction::data(address, offset, opcode, DecodeAnomaly::IllegalOpcode));
	}

	let size = entry.size();
	let Some(operand_bytes) = buffer.get(offset + 1 .. offset + usize::from(size)) else {
		trace!("instruction at ${address:04X} cut off by the end of the buffer");
		return Some(Instruction::data(address, offset, opcode, DecodeAnomaly::TruncatedInstruction { size }));
	};
	let mut operand = [0; 2];
	operand[.. operand_bytes.len()].copy_from_slice(operand_bytes);

	Some(Instruction {
		address,
		offset,
		opcode,
		mnemonic: entry.mnemonic,
		addressing_mode: entry.addressing_mode,
		operand,
		size,
		anomaly: None,
	})
}

/// Decodes `length` bytes of `buffer` starting at `start`. The sizes of the returned instructions add up to exactly the
/// number of bytes in the range; an instruction that would extend past the range becomes a data byte.
#[must_use]
pub fn decode_range(
	buffer: &[u8],
	base: u16,
	start: usize,
	length: usize,
	options: DecoderOptions,
) -> Vec<Instruction> {
	let end = start.saturating_add(length).min(buffer.len());
	let window = &buffer[.. end];
	let mut instructions = Vec::new();
	let mut offset = start;
	while let Some(instruction) = decode_one(window, base, offset, options) {
		offset = instruction.end_offset();
		instructions.push(instruction);
	}
	instructions
}
