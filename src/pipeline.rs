//! The complete relocation pipeline.
//!
//! Tracing, scanning and planning only read the original image; the layout is checked and the plan is applied to a
//! copy only after all of them succeeded.

use log::{debug, info, warn};
use sf2file::Sf2File;

use crate::decoder::DecoderOptions;
use crate::decoder::trace::trace;
use crate::layout::{BlockKind, LayoutReport, MemoryBlock, report};
use crate::relocator::{AppliedRelocation, RelocationPlan, ReservedZeroPage, ZeroPageRemap};
use crate::scanner::{AddressReference, Classification, RegionMap, ScanResult, ScanSummary, scan};
use crate::{AddressRange, RelocationError, SidImage};

/// The C64's I/O area, which contains the SID, VIC and CIA registers.
pub const DEFAULT_HARDWARE: AddressRange = AddressRange::new(0xD000, 0xDFFF);

/// External references at most this far past the moved region are likely uninitialized driver memory.
const NEAR_REGION_END: u32 = 0x100;

/// Everything the caller decides about a relocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelocationConfig {
	/// Where the driver moves to.
	pub new_base:    u16,
	/// Hardware register window; never relocated.
	pub hardware:    AddressRange,
	/// Addresses that count as part of the driver. Defaults to the region that moves.
	pub relocatable: Option<AddressRange>,
	/// Last address of the region that moves. Defaults to the last byte of the image; later addresses cover
	/// uninitialized driver memory that moves along with the code.
	pub region_end:  Option<u16>,
	/// Code the tracer can't find by itself.
	pub code_ranges: Vec<AddressRange>,
	/// Zero page addresses to move.
	pub remap:       ZeroPageRemap,
	/// Zero page addresses the remap must not touch.
	pub reserved:    ReservedZeroPage,
	/// Decoder options.
	pub decoder:     DecoderOptions,
	/// Other memory the relocated driver must not overlap.
	pub blocks:      Vec<MemoryBlock>,
}

impl RelocationConfig {
	/// A configuration with all defaults.
	#[must_use]
	pub fn new(new_base: u16) -> Self {
		Self {
			new_base,
			hardware: DEFAULT_HARDWARE,
			relocatable: None,
			region_end: None,
			code_ranges: Vec::new(),
			remap: ZeroPageRemap::default(),
			reserved: ReservedZeroPage::default(),
			decoder: DecoderOptions::default(),
			blocks: Vec::new(),
		}
	}
}

/// The result of a relocation.
#[derive(Clone, Debug, PartialEq)]
pub struct RelocationOutcome {
	/// The relocated image, with entry points inside the region moved along.
	pub image:        SidImage,
	/// Number of instructions the tracer found.
	pub instructions: usize,
	/// All operands found.
	pub scan:         ScanResult,
	/// Counts for the user.
	pub summary:      ScanSummary,
	/// What was patched and what was dropped.
	pub applied:      AppliedRelocation,
	/// The relocated layout.
	pub layout:       LayoutReport,
}

impl RelocationOutcome {
	/// Whether every relocatable reference was patched.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.applied.dropped.is_empty()
	}
}

/// Relocates a driver image.
///
/// # Errors
/// If the image or region doesn't fit the address space, the region map is ambiguous, the zero page remap is
/// rejected, or the relocated driver overlaps other memory. References that can't be relocated are not errors; they
/// are reported in the outcome.
pub fn relocate(image: &SidImage, config: &RelocationConfig) -> Result<RelocationOutcome, RelocationError> {
	if image.code.is_empty() {
		return Err(RelocationError::EmptyImage);
	}
	let image_range = image
		.address_range()
		.ok_or(RelocationError::ImageTooLarge { load_address: image.load_address, length: image.code.len() })?;
	let region_end = config.region_end.unwrap_or(image_range.end);
	if region_end < image_range.end {
		return Err(RelocationError::RegionTooSmall { image: image_range, region_end });
	}
	let region = AddressRange::new(image.load_address, region_end);
	let new_end = u32::from(config.new_base) + region.len() - 1;
	let new_region = u16::try_from(new_end)
		.map(|end| AddressRange::new(config.new_base, end))
		.map_err(|_| RelocationError::ImageDoesNotFit { new_base: config.new_base, length: region.len() })?;
	let regions = RegionMap::new(config.relocatable.unwrap_or(region), config.hardware)?;
	info!("relocating {region} to {new_region}");

	let code = trace(
		&image.code,
		image.load_address,
		&[image.init_address, image.play_address],
		&config.code_ranges,
		config.decoder,
	);
	let scan_result = scan(code.instructions(), &regions);
	let summary = scan_result.summary(&config.reserved);
	for reference in external_references_near_end(&scan_result, region) {
		warn!("{reference} is just past the end of the driver; extend the region if it is driver memory");
	}
	let plan = RelocationPlan::new(
		&scan_result,
		image.load_address,
		config.new_base,
		region.len(),
		config.remap.clone(),
		&config.reserved,
	)?;

	let mut blocks = vec![MemoryBlock::new("relocated driver", new_region, BlockKind::Code)];
	blocks.extend(config.blocks.iter().cloned());
	let layout = report(&blocks);
	if !layout.is_clean() {
		return Err(RelocationError::LayoutConflicts { count: layout.conflicts.len(), report: layout.to_string() });
	}

	let delta = plan.delta();
	let mut relocated_code = image.code.clone();
	let applied = plan.apply(&mut relocated_code)?;
	debug!("{} of {} relocatable references patched", applied.operands_patched, summary.relocatable);

	let move_entry_point = |address: u16| {
		if region.contains(address) { u16::try_from(i32::from(address) + delta).unwrap_or(address) } else { address }
	};
	Ok(RelocationOutcome {
		image: SidImage {
			load_address: config.new_base,
			init_address: move_entry_point(image.init_address),
			play_address: move_entry_point(image.play_address),
			code:         relocated_code,
		},
		instructions: code.len(),
		scan: scan_result,
		summary,
		applied,
		layout,
	})
}

/// External references that point into the page after `region`.
fn external_references_near_end(scan: &ScanResult, region: AddressRange) -> impl Iterator<Item = &AddressReference> {
	let end = u32::from(region.end);
	scan.references.iter().filter(move |reference| {
		let target = u32::from(reference.target_address);
		reference.classification == Classification::External && target > end && target <= end + NEAR_REGION_END
	})
}

/// Memory blocks for all tables of a driver file.
///
/// # Errors
/// If the file has no valid table definitions.
pub fn table_blocks(file: &Sf2File) -> Result<Vec<MemoryBlock>, RelocationError> {
	Ok(file
		.table_definitions()?
		.iter()
		.enumerate()
		.filter_map(|(index, definition)| {
			MemoryBlock::from_table(format!("table {index} (kind ${:02X})", definition.kind_tag), definition)
		})
		.collect())
}

#[cfg(test)]
mod test {
	use sf2file::parser::parse_from_bytes;
	use sf2file::writer::{table_definitions_block, write_blocks};
	use sf2file::{TableDefinition, TableLayout};

	use super::*;

	#[rustfmt::skip]
	const DRIVER: [u8; 22] = [
		0x4C, 0x06, 0x10, // $1000 JMP init
		0x4C, 0x0C, 0x10, // $1003 JMP play
		0xA9, 0x0F,       // $1006 init: LDA #$0F
		0x8D, 0x18, 0xD4, // $1008 STA $D418
		0x60,             // $100B RTS
		0xAE, 0x13, 0x10, // $100C play: LDX $1013
		0x8E, 0x01, 0xD4, // $100F STX $D401
		0x60,             // $1012 RTS
		0x4C, 0x00, 0x10, // $1013 data that looks like code
	];

	fn driver() -> SidImage {
		SidImage::from_raw(0x1000, DRIVER.to_vec())
	}

	#[test]
	fn relocates_driver() {
		let outcome = relocate(&driver(), &RelocationConfig::new(0x2000)).unwrap();
		assert!(outcome.is_complete());
		assert_eq!(outcome.image.code, vec![
			0x4C, 0x06, 0x20, 0x4C, 0x0C, 0x20, 0xA9, 0x0F, 0x8D, 0x18, 0xD4, 0x60, 0xAE, 0x13, 0x20, 0x8E, 0x01, 0xD4,
			0x60, 0x4C, 0x00, 0x10,
		]);
		assert_eq!(outcome.image.load_address, 0x2000);
		assert_eq!(outcome.image.init_address, 0x2000);
		assert_eq!(outcome.image.play_address, 0x2003);
		assert_eq!(outcome.instructions, 8);
		assert_eq!(outcome.summary.address_bearing, 5);
		assert_eq!(outcome.summary.relocatable, 3);
		assert_eq!(outcome.summary.hardware_registers, 2);
		assert_eq!(outcome.applied.bytes_written, 6);
		assert!(outcome.layout.is_clean());
	}

	#[test]
	fn play_is_not_guessed_without_jump_table() {
		// JMP $1006 / $1003: table bytes / RTS
		let image = SidImage::from_raw(0x1000, vec![0x4C, 0x06, 0x10, 0xAD, 0x04, 0x10, 0x60]);
		let outcome = relocate(&image, &RelocationConfig::new(0x2000)).unwrap();
		assert_eq!(outcome.image.code, vec![0x4C, 0x06, 0x20, 0xAD, 0x04, 0x10, 0x60]);
		assert_eq!(outcome.instructions, 2);
		assert_eq!(outcome.image.play_address, 0);
	}

	#[test]
	fn external_references_just_past_the_driver() {
		// LDA $1010 / STA $D400 / LDA $3000 / RTS
		let image = SidImage::from_raw(0x1000, vec![0xAD, 0x10, 0x10, 0x8D, 0x00, 0xD4, 0xAD, 0x00, 0x30, 0x60]);
		let region = image.address_range().unwrap();
		let outcome = relocate(&image, &RelocationConfig::new(0x2000)).unwrap();
		assert_eq!(outcome.summary.external, 2);
		let near: Vec<u16> =
			external_references_near_end(&outcome.scan, region).map(|reference| reference.target_address).collect();
		assert_eq!(near, vec![0x1010]);
		assert!(outcome.is_complete());
		assert_eq!(outcome.image.code[1 .. 3], [0x10, 0x10]);

		let extended = AddressRange::new(0x1000, 0x1010);
		assert_eq!(external_references_near_end(&outcome.scan, extended).count(), 0);
	}

	#[test]
	fn relocating_down_moves_entry_points() {
		let outcome = relocate(&driver(), &RelocationConfig::new(0x0E00)).unwrap();
		assert_eq!(outcome.image.init_address, 0x0E00);
		assert_eq!(outcome.image.code[1 .. 3], [0x06, 0x0E]);
	}

	#[test]
	fn layout_conflicts_stop_relocation() {
		let mut config = RelocationConfig::new(0x2000);
		config.blocks.push("tables:table:2010-20ff".parse().unwrap());
		let error = relocate(&driver(), &config).unwrap_err();
		let RelocationError::LayoutConflicts { count, report } = error else {
			panic!("unexpected error {error:?}");
		};
		assert_eq!(count, 1);
		assert!(report.contains("critical: 1"));
	}

	#[test]
	fn region_must_fit() {
		assert!(matches!(
			relocate(&driver(), &RelocationConfig::new(0xFFF0)),
			Err(RelocationError::ImageDoesNotFit { new_base: 0xFFF0, length: 22 })
		));
		assert!(matches!(
			relocate(&SidImage::from_raw(0x1000, Vec::new()), &RelocationConfig::new(0x2000)),
			Err(RelocationError::EmptyImage)
		));
		let mut config = RelocationConfig::new(0x2000);
		config.region_end = Some(0x1010);
		assert!(matches!(relocate(&driver(), &config), Err(RelocationError::RegionTooSmall { .. })));
		let mut config = RelocationConfig::new(0x2000);
		config.relocatable = Some(AddressRange::new(0x1000, 0xD3FF));
		assert!(matches!(relocate(&driver(), &config), Err(RelocationError::OverlappingRegions { .. })));
	}

	#[test]
	fn uninitialized_memory_after_the_image() {
		// LDA $1100 / RTS, with $1100 being a variable after the image
		let image = SidImage::from_raw(0x1000, vec![0xAD, 0x00, 0x11, 0x60]);
		let mut config = RelocationConfig::new(0x3000);
		config.relocatable = Some(AddressRange::new(0x1000, 0x11FF));
		let outcome = relocate(&image, &config).unwrap();
		assert!(!outcome.is_complete());
		assert_eq!(outcome.applied.dropped[0].reference.classification, Classification::Relocatable);
		assert_eq!(outcome.image.code, vec![0xAD, 0x00, 0x11, 0x60]);

		config.region_end = Some(0x11FF);
		let outcome = relocate(&image, &config).unwrap();
		assert!(outcome.is_complete());
		assert_eq!(outcome.image.code, vec![0xAD, 0x00, 0x31, 0x60]);
		assert_eq!(outcome.layout.legend[0].1.end, 0x31FF);
	}

	#[test]
	fn zero_page_remap_through_pipeline() {
		// LDA $FB / STA $D400 / RTS
		let image = SidImage {
			load_address: 0x1000,
			init_address: 0x1000,
			play_address: 0x1005,
			code:         vec![0xA5, 0xFB, 0x8D, 0x00, 0xD4, 0x60],
		};
		let mut config = RelocationConfig::new(0x1000);
		config.remap = ZeroPageRemap::new([(0xFB, 0x02)]).unwrap();
		config.reserved = ReservedZeroPage::new([AddressRange::new(0x02, 0x02)]);
		assert!(matches!(relocate(&image, &config), Err(RelocationError::RemapConflict { .. })));

		config.reserved = ReservedZeroPage::default();
		let outcome = relocate(&image, &config).unwrap();
		assert_eq!(outcome.image.code, vec![0xA5, 0x02, 0x8D, 0x00, 0xD4, 0x60]);
		assert_eq!(outcome.applied.zero_page_patched, 1);
	}

	#[test]
	fn tables_from_driver_file() {
		let definitions = [
			TableDefinition { kind_tag: 0x80, layout: TableLayout::ColumnMajor, address: 0x1800, columns: 2, rows: 4 },
			TableDefinition { kind_tag: 0x81, layout: TableLayout::RowMajor, address: 0x1900, columns: 0, rows: 4 },
		];
		let mut bytes = vec![0x00, 0x10, 0x37, 0x13];
		bytes.extend(write_blocks(&[table_definitions_block(&definitions).unwrap()]));
		let file = parse_from_bytes(&bytes).unwrap();

		let blocks = table_blocks(&file).unwrap();
		assert_eq!(blocks, vec![MemoryBlock::new(
			"table 0 (kind $80)",
			AddressRange::new(0x1800, 0x1807),
			BlockKind::Table
		)]);

		let mut config = RelocationConfig::new(0x17F0);
		config.blocks = blocks;
		assert!(matches!(relocate(&driver(), &config), Err(RelocationError::LayoutConflicts { count: 1, .. })));
	}
}
