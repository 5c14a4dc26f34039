use rstest::rstest;

use super::*;
use crate::AddressRange;
use crate::decoder::{DecoderOptions, decode_range};
use crate::scanner::{RegionMap, scan};

fn scan_code(code: &[u8], base: u16, relocatable: AddressRange) -> ScanResult {
	let regions = RegionMap::new(relocatable, AddressRange::new(0xD000, 0xDFFF)).unwrap();
	let instructions = decode_range(code, base, 0, code.len(), DecoderOptions::default());
	scan(&instructions, &regions)
}

fn no_remap() -> ZeroPageRemap {
	ZeroPageRemap::default()
}

#[test]
fn absolute_load_moves_down() {
	let mut code = vec![0xAD, 0x00, 0x10];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let plan = RelocationPlan::new(&result, 0x1000, 0x0E00, 0x1000, no_remap(), &ReservedZeroPage::default()).unwrap();
	assert_eq!(plan.delta(), -0x200);
	assert_eq!(plan.patches(), &[OperandPatch { byte_offset: 1, original: 0x1000, relocated: 0x0E00 }]);

	let applied = plan.apply(&mut code).unwrap();
	assert_eq!(code, vec![0xAD, 0x00, 0x0E]);
	assert_eq!(applied.operands_patched, 1);
	assert_eq!(applied.bytes_written, 2);
	// the low byte of a page-aligned move stays the same
	assert_eq!(applied.bytes_changed, 1);
	assert!(applied.dropped.is_empty());
}

#[test]
fn hardware_registers_stay() {
	let mut code = vec![0xA9, 0x00, 0x8D, 0x00, 0xD4];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let plan = RelocationPlan::new(&result, 0x1000, 0x4000, 5, no_remap(), &ReservedZeroPage::default()).unwrap();
	assert!(plan.patches().is_empty());
	assert!(plan.is_complete());
	let applied = plan.apply(&mut code).unwrap();
	assert_eq!(applied.bytes_written, 0);
	assert_eq!(code, vec![0xA9, 0x00, 0x8D, 0x00, 0xD4]);
}

#[test]
fn references_outside_region_are_dropped() {
	// LDA $1234 / STA $1900
	let mut code = vec![0xAD, 0x34, 0x12, 0x8D, 0x00, 0x19];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let plan = RelocationPlan::new(&result, 0x1000, 0x2000, 0x800, no_remap(), &ReservedZeroPage::default()).unwrap();
	assert!(!plan.is_complete());
	assert_eq!(plan.patches().len(), 1);
	let dropped = plan.dropped()[0];
	assert_eq!(dropped.reference.target_address, 0x1900);
	assert_eq!(dropped.reason, DropReason::OutsideRegion { region_start: 0x1000, region_length: 0x800 });
	assert_eq!(
		dropped.to_string(),
		"$1003 STA $1900 (relocatable): target is outside of the relocation region $1000-$17FF"
	);

	let applied = plan.apply(&mut code).unwrap();
	assert_eq!(code, vec![0xAD, 0x34, 0x22, 0x8D, 0x00, 0x19]);
	assert_eq!(applied.dropped.len(), 1);
}

#[test]
fn relocation_past_address_space_is_dropped() {
	let code = [0xAD, 0x00, 0x19];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let plan = RelocationPlan::new(&result, 0x1000, 0xF800, 0x1000, no_remap(), &ReservedZeroPage::default()).unwrap();
	assert_eq!(plan.dropped()[0].reason, DropReason::WrapsAddressSpace { relocated: 0x1_0100 });
	assert!(plan.patches().is_empty());
}

#[test]
fn second_apply_is_rejected() {
	let mut code = vec![0x20, 0x06, 0x10, 0x4C, 0x00, 0x10, 0x60];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1006));
	let plan = RelocationPlan::new(&result, 0x1000, 0x1100, 7, no_remap(), &ReservedZeroPage::default()).unwrap();
	plan.clone().apply(&mut code).unwrap();
	let relocated = code.clone();
	assert_eq!(relocated, vec![0x20, 0x06, 0x11, 0x4C, 0x00, 0x11, 0x60]);

	let error = plan.apply(&mut code).unwrap_err();
	assert!(matches!(error, RelocationError::StalePatchSite { offset: 1, .. }));
	assert_eq!(code, relocated);
}

#[test]
fn short_buffer_is_rejected() {
	let code = [0xEA, 0xEA, 0xAD, 0x00, 0x10];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let plan = RelocationPlan::new(&result, 0x1000, 0x2000, 5, no_remap(), &ReservedZeroPage::default()).unwrap();
	let mut short = [0xEA, 0xEA, 0xAD, 0x00];
	let error = plan.apply(&mut short).unwrap_err();
	assert!(matches!(error, RelocationError::BufferLengthMismatch { offset: 3, length: 4 }));
	assert_eq!(short, [0xEA, 0xEA, 0xAD, 0x00]);
}

#[test]
fn zero_page_remapping() {
	// LDA $FB / STA ($FC),Y / LDA $00FB / INC $FD
	let mut code = vec![0xA5, 0xFB, 0x91, 0xFC, 0xAD, 0xFB, 0x00, 0xE6, 0xFD];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let remap = ZeroPageRemap::new([(0xFB, 0x02), (0xFC, 0x03)]).unwrap();
	let plan = RelocationPlan::new(&result, 0x1000, 0x1000, 9, remap, &ReservedZeroPage::default()).unwrap();
	assert_eq!(plan.zero_page_patches().len(), 3);
	assert_eq!(plan.bytes_to_write(), 3);

	let applied = plan.apply(&mut code).unwrap();
	assert_eq!(code, vec![0xA5, 0x02, 0x91, 0x03, 0xAD, 0x02, 0x00, 0xE6, 0xFD]);
	assert_eq!(applied.zero_page_patched, 3);
	assert_eq!(applied.bytes_changed, 3);
}

#[test]
fn remap_construction() {
	assert!(matches!(
		ZeroPageRemap::new([(0xFB, 0x02), (0xFB, 0x03)]),
		Err(RelocationError::RemapConflict {
			from:   0xFB,
			to:     0x03,
			reason: RemapConflictReason::DuplicateSource { previous: 0x02 },
		})
	));
	assert!(matches!(
		ZeroPageRemap::new([(0xFB, 0x02), (0xFC, 0x02)]),
		Err(RelocationError::RemapConflict { reason: RemapConflictReason::SharedTarget { other_source: 0xFB }, .. })
	));
	let remap = ZeroPageRemap::new([(0xFC, 0xFD), (0xFB, 0xFC)]).unwrap();
	assert_eq!(remap.iter().collect::<Vec<_>>(), vec![(0xFB, 0xFC), (0xFC, 0xFD)]);
	assert_eq!(remap.get(0xFB), Some(0xFC));
	assert_eq!(remap.get(0xFD), None);
}

#[rstest]
#[case::reserved_source(&[(0x90, 0x02)], RemapConflictReason::ReservedSource)]
#[case::reserved_target(&[(0xFB, 0x91)], RemapConflictReason::ReservedTarget)]
#[case::target_in_use(&[(0xFB, 0xFD)], RemapConflictReason::TargetInUse { uses: 1 })]
fn remap_conflicts(#[case] pairs: &[(u8, u8)], #[case] expected: RemapConflictReason) {
	// LDA $FB / STA $FD / LDA $90
	let code = [0xA5, 0xFB, 0x85, 0xFD, 0xA5, 0x90];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let reserved = ReservedZeroPage::new([AddressRange::new(0x90, 0x9F)]);
	let remap = ZeroPageRemap::new(pairs.iter().copied()).unwrap();
	let error = RelocationPlan::new(&result, 0x1000, 0x2000, 6, remap, &reserved).unwrap_err();
	assert!(matches!(error, RelocationError::RemapConflict { reason, .. } if reason == expected));
}

#[test]
fn remap_target_freed_by_remap() {
	// $FD is in use, but it is remapped away itself
	let mut code = vec![0xA5, 0xFB, 0x85, 0xFD];
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1FFF));
	let remap = ZeroPageRemap::new([(0xFB, 0xFD), (0xFD, 0xFE)]).unwrap();
	let plan = RelocationPlan::new(&result, 0x1000, 0x1000, 4, remap, &ReservedZeroPage::default()).unwrap();
	plan.apply(&mut code).unwrap();
	assert_eq!(code, vec![0xA5, 0xFD, 0x85, 0xFE]);
}

#[rstest]
fn patch_count_matches_bytes_written(
	#[values(0x0800, 0x0801, 0x1000, 0x10FF, 0x3000, 0xC000)] new_base: u16,
	#[values(false, true)] with_remap: bool,
) {
	// JSR $100B / LDA $1010,X / STA $D400 / STA $FB / JMP ($100E) / RTS / .word $1000 / .byte 0
	let mut code = vec![
		0x20, 0x0B, 0x10, 0xBD, 0x10, 0x10, 0x8D, 0x00, 0xD4, 0x85, 0xFB, 0x60, 0x6C, 0x0E, 0x10, 0x00, 0x10,
	];
	let original = code.clone();
	let result = scan_code(&code, 0x1000, AddressRange::new(0x1000, 0x1010));
	let remap = if with_remap { ZeroPageRemap::new([(0xFB, 0x10)]).unwrap() } else { no_remap() };
	let plan = RelocationPlan::new(&result, 0x1000, new_base, 0x11, remap, &ReservedZeroPage::default()).unwrap();
	let expected_written = plan.bytes_to_write();

	let applied = plan.apply(&mut code).unwrap();
	assert_eq!(code.len(), original.len());
	assert_eq!(applied.operands_patched, 3);
	assert_eq!(applied.zero_page_patched, usize::from(with_remap));
	assert_eq!(applied.bytes_written, 2 * applied.operands_patched + applied.zero_page_patched);
	assert_eq!(applied.bytes_written, expected_written);
	let differing = code.iter().zip(&original).filter(|(new, old)| new != old).count();
	assert_eq!(differing, applied.bytes_changed);
	assert!(differing <= applied.bytes_written);
	// the hardware store never moves
	assert_eq!(code[6 .. 9], original[6 .. 9]);
}
