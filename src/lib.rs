//! 6502 music driver relocation.
//!
//! The pipeline of this crate takes the machine code of a C64 music driver, finds the code that is reachable from the
//! driver's entry points ([`decoder::trace`]), collects every address the code refers to ([`scanner`]), and moves the
//! driver to a new base address by patching exactly the references into the driver itself ([`relocator`]). Hardware
//! registers such as the SID chip's and other fixed memory are never touched. Before bytes are written, the new memory
//! layout is checked for overlaps ([`layout`]). [`pipeline::relocate`] runs all of these steps in order.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::warn;

#[macro_use] mod logging;

#[cfg(feature = "binaries")] pub mod cli;
pub mod decoder;
mod error;
pub mod layout;
pub mod pipeline;
pub mod relocator;
pub mod scanner;

pub use error::RelocationError;
pub use sf2file;

/// Provides the display name of an enum variant.
pub trait VariantName {
	/// The name of this variant as it is conventionally written.
	fn variant_name(&self) -> &'static str;
}

/// The machine code record handed to the relocator by whatever reads the outer file format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidImage {
	/// Address the code is loaded to.
	pub load_address: u16,
	/// Entry point that initializes the driver.
	pub init_address: u16,
	/// Entry point called once per frame; 0 if the driver installs its own interrupt handler.
	pub play_address: u16,
	/// The code and data, starting at the load address.
	pub code:         Vec<u8>,
}

impl SidImage {
	/// Reads a PRG file: a little-endian load address followed by the data. The entry points are chosen as in
	/// [`Self::from_raw`].
	///
	/// # Errors
	/// If the file is shorter than the load address.
	pub fn from_prg(bytes: &[u8]) -> Result<Self, RelocationError> {
		let [low, high, code @ ..] = bytes else {
			return Err(RelocationError::EmptyImage);
		};
		let load_address = u16::from_le_bytes([*low, *high]);
		Ok(Self::from_raw(load_address, code.to_vec()))
	}

	/// Wraps raw code loaded at `load_address`. Init is the load address. Play is `load + 3` only if the code starts with
	/// the conventional `JMP init / JMP play` table; otherwise it is 0, and nothing but init is traced.
	#[must_use]
	pub fn from_raw(load_address: u16, code: Vec<u8>) -> Self {
		let play_address = if starts_with_jump_table(&code) {
			load_address.wrapping_add(3)
		} else {
			warn!("no JMP init / JMP play table at ${load_address:04X}, the play routine must be given explicitly");
			0
		};
		Self { load_address, init_address: load_address, play_address, code }
	}

	/// Serializes the image as a PRG file.
	#[must_use]
	pub fn to_prg(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.code.len() + 2);
		bytes.extend_from_slice(&self.load_address.to_le_bytes());
		bytes.extend_from_slice(&self.code);
		bytes
	}

	/// The addresses the image occupies, or `None` if it is empty or does not fit the address space.
	#[must_use]
	pub fn address_range(&self) -> Option<AddressRange> {
		let length = u16::try_from(self.code.len()).ok().filter(|length| *length > 0)?;
		let end = self.load_address.checked_add(length - 1)?;
		Some(AddressRange::new(self.load_address, end))
	}
}

/// An inclusive range of 6502 addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressRange {
	/// First address in the range.
	pub start: u16,
	/// Last address in the range.
	pub end:   u16,
}

impl AddressRange {
	/// Creates a range; the bounds are swapped if given in the wrong order.
	#[must_use]
	pub const fn new(start: u16, end: u16) -> Self {
		if start <= end { Self { start, end } } else { Self { start: end, end: start } }
	}

	/// Whether the address lies in this range.
	#[must_use]
	pub const fn contains(&self, address: u16) -> bool {
		self.start <= address && address <= self.end
	}

	/// Number of addresses in the range (1 to 65536).
	#[must_use]
	pub const fn len(&self) -> u32 {
		self.end as u32 - self.start as u32 + 1
	}

	/// Ranges always contain at least one address.
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		false
	}

	/// The addresses both ranges have in common.
	#[must_use]
	pub fn intersection(&self, other: &Self) -> Option<Self> {
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		(start <= end).then_some(Self { start, end })
	}
}

impl Display for AddressRange {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "${:04X}-${:04X}", self.start, self.end)
	}
}

impl FromStr for AddressRange {
	type Err = String;

	/// Parses `START-END` or a single address, both written as accepted by [`parse_address`].
	fn from_str(string: &str) -> Result<Self, Self::Err> {
		match string.split_once('-') {
			Some((start, end)) => Ok(Self::new(parse_address(start)?, parse_address(end)?)),
			None => parse_address(string).map(|address| Self::new(address, address)),
		}
	}
}

/// Whether the code starts with two `JMP absolute` instructions.
fn starts_with_jump_table(code: &[u8]) -> bool {
	const JMP_ABSOLUTE: u8 = 0x4C;
	matches!(code, [JMP_ABSOLUTE, _, _, JMP_ABSOLUTE, _, _, ..])
}

/// Parses a 16-bit address. Hexadecimal is the default for addresses, so `d400`, `$d400` and `0xd400` are all the same
/// address; a `#` prefix forces decimal.
///
/// # Errors
/// If the string is not a number or the number does not fit 16 bits.
pub fn parse_address(string: &str) -> Result<u16, String> {
	let string = string.trim();
	let parsed = if let Some(decimal) = string.strip_prefix('#') {
		decimal.parse::<u16>()
	} else {
		let hex = string.strip_prefix('$').or_else(|| string.strip_prefix("0x")).unwrap_or(string);
		u16::from_str_radix(hex, 16)
	};
	parsed.map_err(|err| format!("invalid address `{string}`: {err}"))
}

/// Formats bytes as a hex dump with 16 bytes per line, each line prefixed with its address.
#[must_use]
pub fn pretty_hex(bytes: &[u8], base: u16) -> String {
	let mut string = String::new();
	// need approximately high nibble + low nibble + ' ' per byte, plus the address
	string.reserve(bytes.len() * 3 + bytes.len() / 16 * 7);
	for (index, section) in bytes.chunks(16).enumerate() {
		#[allow(clippy::cast_possible_truncation)]
		let address = base.wrapping_add((index * 16) as u16);
		string += &format!("{address:04X}:");
		for byte in section {
			string += &format!(" {byte:02X}");
		}
		string.push('\n');
	}
	string
}
