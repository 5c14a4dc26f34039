//! Finding and classifying the addresses a driver refers to.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::decoder::{AddressingMode, Instruction, Mnemonic};
use crate::relocator::ReservedZeroPage;
use crate::{AddressRange, RelocationError};

/// What kind of memory an absolute operand points to. Decides whether the operand moves with the code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Classification {
	/// Part of the driver; moves with it.
	Relocatable,
	/// Hardware I/O, such as the SID registers. Never moves.
	HardwareRegister,
	/// Zero page, addressed with a full 16-bit operand.
	ZeroPage,
	/// Any other fixed memory, such as KERNAL routines or another program's data.
	External,
}

impl Display for Classification {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Relocatable => "relocatable",
			Self::HardwareRegister => "hardware register",
			Self::ZeroPage => "zero page",
			Self::External => "external",
		})
	}
}

/// The caller's description of the address space: which addresses belong to the driver and which are hardware.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegionMap {
	relocatable: AddressRange,
	hardware:    AddressRange,
}

impl RegionMap {
	/// Creates a region map from the two ranges.
	///
	/// # Errors
	/// If the ranges overlap, since that would make classification ambiguous.
	pub fn new(relocatable: AddressRange, hardware: AddressRange) -> Result<Self, RelocationError> {
		if relocatable.intersection(&hardware).is_some() {
			return Err(RelocationError::OverlappingRegions { relocatable, hardware });
		}
		Ok(Self { relocatable, hardware })
	}

	/// The addresses that belong to the driver.
	#[must_use]
	pub const fn relocatable(&self) -> AddressRange {
		self.relocatable
	}

	/// The hardware register window.
	#[must_use]
	pub const fn hardware(&self) -> AddressRange {
		self.hardware
	}

	/// Classifies a target address. The zero page takes precedence over both ranges.
	#[must_use]
	pub const fn classify(&self, target: u16) -> Classification {
		if target <= 0xFF {
			Classification::ZeroPage
		} else if self.relocatable.contains(target) {
			Classification::Relocatable
		} else if self.hardware.contains(target) {
			Classification::HardwareRegister
		} else {
			Classification::External
		}
	}
}

/// An instruction's absolute operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct AddressReference {
	/// Buffer offset of the operand's low byte.
	pub byte_offset:         usize,
	/// Address of the instruction.
	pub instruction_address: u16,
	/// The operand.
	pub target_address:      u16,
	/// Mnemonic of the instruction.
	pub mnemonic:            Mnemonic,
	/// One of the absolute or indirect modes.
	pub addressing_mode:     AddressingMode,
	/// Where the operand points.
	pub classification:      Classification,
}

impl Display for AddressReference {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"${:04X} {} ${:04X} ({})",
			self.instruction_address, self.mnemonic, self.target_address, self.classification
		)
	}
}

/// An instruction's zero page operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ZeroPageOperand {
	/// Buffer offset of the operand byte.
	pub byte_offset:         usize,
	/// Address of the instruction.
	pub instruction_address: u16,
	/// The operand.
	pub address:             u8,
	/// One of the zero page modes.
	pub addressing_mode:     AddressingMode,
}

/// Everything the scanner found, in instruction order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanResult {
	/// Absolute operands.
	pub references: Vec<AddressReference>,
	/// Zero page operands.
	pub zero_page:  Vec<ZeroPageOperand>,
}

impl ScanResult {
	/// Number of references with the given classification.
	#[must_use]
	pub fn count(&self, classification: Classification) -> usize {
		self.references.iter().filter(|reference| reference.classification == classification).count()
	}

	/// How often each zero page address is used, through zero page operands as well as absolute operands below $100.
	#[must_use]
	pub fn zero_page_usage(&self) -> BTreeMap<u8, usize> {
		let absolute = self
			.references
			.iter()
			.filter(|reference| reference.classification == Classification::ZeroPage)
			.map(|reference| reference.target_address.to_le_bytes()[0]);
		let mut usage = BTreeMap::new();
		for address in self.zero_page.iter().map(|operand| operand.address).chain(absolute) {
			*usage.entry(address).or_insert(0) += 1;
		}
		usage
	}

	/// Summarizes the scan, including the uses of reserved zero page addresses.
	#[must_use]
	pub fn summary(&self, reserved: &ReservedZeroPage) -> ScanSummary {
		let usage = self.zero_page_usage();
		ScanSummary {
			address_bearing:     self.references.len(),
			relocatable:         self.count(Classification::Relocatable),
			hardware_registers:  self.count(Classification::HardwareRegister),
			zero_page:           self.count(Classification::ZeroPage),
			external:            self.count(Classification::External),
			zero_page_addresses: usage.len(),
			reserved_usages:     usage.into_iter().filter(|(address, _)| reserved.contains(*address)).collect(),
		}
	}
}

/// Counts printed before relocating.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
	/// Instructions with an absolute operand.
	pub address_bearing:     usize,
	/// References into the driver.
	pub relocatable:         usize,
	/// References to hardware registers.
	pub hardware_registers:  usize,
	/// Absolute references into the zero page.
	pub zero_page:           usize,
	/// References to other fixed memory.
	pub external:            usize,
	/// Distinct zero page addresses used.
	pub zero_page_addresses: usize,
	/// Reserved zero page addresses the driver uses, with their use counts.
	pub reserved_usages:     Vec<(u8, usize)>,
}

impl Display for ScanSummary {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "address-bearing instructions: {}", self.address_bearing)?;
		writeln!(f, "  relocatable:        {}", self.relocatable)?;
		writeln!(f, "  hardware registers: {}", self.hardware_registers)?;
		writeln!(f, "  zero page:          {}", self.zero_page)?;
		writeln!(f, "  external:           {}", self.external)?;
		writeln!(f, "zero page addresses used: {}", self.zero_page_addresses)?;
		if self.reserved_usages.is_empty() {
			writeln!(f, "reserved zero page usages: none")
		} else {
			let usages: Vec<String> =
				self.reserved_usages.iter().map(|(address, count)| format!("${address:02X} ({count}x)")).collect();
			writeln!(f, "reserved zero page usages: {}", usages.join(", "))
		}
	}
}

/// Collects the absolute and zero page operands of the given instructions. Data pseudo-instructions are skipped.
pub fn scan<'a>(instructions: impl IntoIterator<Item = &'a Instruction>, regions: &RegionMap) -> ScanResult {
	let mut result = ScanResult::default();
	for instruction in instructions {
		if let Some(target_address) = instruction.absolute_target() {
			let classification = regions.classify(target_address);
			trace!("${:04X} {instruction}: {classification}", instruction.address);
			result.references.push(AddressReference {
				byte_offset: instruction.offset + 1,
				instruction_address: instruction.address,
				target_address,
				mnemonic: instruction.mnemonic,
				addressing_mode: instruction.addressing_mode,
				classification,
			});
		} else if let Some(address) = instruction.zero_page_address() {
			result.zero_page.push(ZeroPageOperand {
				byte_offset: instruction.offset + 1,
				instruction_address: instruction.address,
				address,
				addressing_mode: instruction.addressing_mode,
			});
		}
	}
	debug!(
		"scanned {} absolute and {} zero page operands, {} relocatable",
		result.references.len(),
		result.zero_page.len(),
		result.count(Classification::Relocatable)
	);
	result
}

#[cfg(test)]
mod test {
	use rstest::rstest;

	use super::*;
	use crate::decoder::{DecoderOptions, decode_range};

	fn regions() -> RegionMap {
		RegionMap::new(AddressRange::new(0x1000, 0x1FFF), AddressRange::new(0xD000, 0xDFFF)).unwrap()
	}

	#[test]
	fn overlapping_regions() {
		let result = RegionMap::new(AddressRange::new(0xC000, 0xD3FF), AddressRange::new(0xD000, 0xDFFF));
		assert!(matches!(result, Err(RelocationError::OverlappingRegions { .. })));
	}

	#[rstest]
	#[case(0x0000, Classification::ZeroPage)]
	#[case(0x00FF, Classification::ZeroPage)]
	#[case(0x0100, Classification::External)]
	#[case(0x1000, Classification::Relocatable)]
	#[case(0x1FFF, Classification::Relocatable)]
	#[case(0x2000, Classification::External)]
	#[case(0xD400, Classification::HardwareRegister)]
	#[case(0xFFFE, Classification::External)]
	fn classification(#[case] target: u16, #[case] expected: Classification) {
		assert_eq!(regions().classify(target), expected);
	}

	#[test]
	fn zero_page_wins_over_regions() {
		let low = RegionMap::new(AddressRange::new(0x0000, 0x0FFF), AddressRange::new(0xD000, 0xDFFF)).unwrap();
		assert_eq!(low.classify(0x0080), Classification::ZeroPage);
		assert_eq!(low.classify(0x0100), Classification::Relocatable);
	}

	#[test]
	fn sid_store_is_hardware() {
		let instructions = decode_range(&[0xA9, 0x00, 0x8D, 0x00, 0xD4], 0x1000, 0, 5, DecoderOptions::default());
		let result = scan(&instructions, &regions());
		assert_eq!(result.references.len(), 1);
		assert_eq!(result.references[0].classification, Classification::HardwareRegister);
		assert_eq!(result.references[0].byte_offset, 3);
		assert_eq!(result.references[0].to_string(), "$1002 STA $D400 (hardware register)");
		assert!(result.zero_page.is_empty());
	}

	#[test]
	fn every_reference_has_one_classification() {
		// LDA $1234 / STA $D418 / JSR $FFD2 / LDA $00FB / LDA ($FB),Y / STA $FC / JMP ($1000)
		let code = [
			0xAD, 0x34, 0x12, 0x8D, 0x18, 0xD4, 0x20, 0xD2, 0xFF, 0xAD, 0xFB, 0x00, 0xB1, 0xFB, 0x85, 0xFC, 0x6C, 0x00,
			0x10,
		];
		let instructions = decode_range(&code, 0x1000, 0, code.len(), DecoderOptions::default());
		let result = scan(&instructions, &regions());
		let total: usize = [
			Classification::Relocatable,
			Classification::HardwareRegister,
			Classification::ZeroPage,
			Classification::External,
		]
		.into_iter()
		.map(|classification| result.count(classification))
		.sum();
		assert_eq!(total, result.references.len());
		assert_eq!(result.references.len(), 5);
		assert_eq!(result.count(Classification::Relocatable), 2);
		assert_eq!(result.references[4].addressing_mode, AddressingMode::Indirect);

		let usage = result.zero_page_usage();
		assert_eq!(usage.get(&0xFB), Some(&2));
		assert_eq!(usage.get(&0xFC), Some(&1));

		let summary = result.summary(&ReservedZeroPage::new([AddressRange::new(0xFB, 0xFF)]));
		assert_eq!(summary.address_bearing, 5);
		assert_eq!(summary.external, 1);
		assert_eq!(summary.zero_page_addresses, 2);
		assert_eq!(summary.reserved_usages, vec![(0xFB, 2), (0xFC, 1)]);
		assert!(summary.to_string().contains("reserved zero page usages: $FB (2x), $FC (1x)"));
	}
}
