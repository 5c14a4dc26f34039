use rstest::rstest;
use sf2file::{TableDefinition, TableLayout};

use super::*;

fn block(name: &str, start: u16, end: u16, kind: BlockKind) -> MemoryBlock {
	MemoryBlock::new(name, AddressRange::new(start, end), kind)
}

fn code_and_data() -> Vec<MemoryBlock> {
	vec![block("driver", 0x0800, 0x0FFF, BlockKind::Code), block("tables", 0x0F00, 0x1100, BlockKind::Data)]
}

#[test]
fn code_overlapping_data() {
	let conflicts = detect(&code_and_data());
	assert_eq!(conflicts.len(), 1);
	assert_eq!(conflicts[0].overlap, AddressRange::new(0x0F00, 0x0FFF));
	assert_eq!(conflicts[0].size(), 0x100);
	assert_eq!(conflicts[0].severity, Severity::Critical);
	assert_eq!(
		conflicts[0].to_string(),
		"code \"driver\" $0800-$0FFF overlaps data \"tables\" $0F00-$1100 at $0F00-$0FFF (256 bytes, critical)"
	);
	assert_eq!(validate(&code_and_data()).unwrap_err().len(), 1);
}

#[rstest]
#[case(BlockKind::Data, BlockKind::Data, 1, Severity::Low)]
#[case(BlockKind::Data, BlockKind::Table, 32, Severity::Low)]
#[case(BlockKind::Table, BlockKind::Table, 33, Severity::Medium)]
#[case(BlockKind::Data, BlockKind::Free, 128, Severity::Medium)]
#[case(BlockKind::Data, BlockKind::Data, 129, Severity::High)]
#[case(BlockKind::Data, BlockKind::Data, 512, Severity::High)]
#[case(BlockKind::Data, BlockKind::Data, 513, Severity::Critical)]
#[case(BlockKind::Code, BlockKind::Free, 1, Severity::Critical)]
#[case(BlockKind::Table, BlockKind::Code, 1, Severity::Critical)]
fn severities(#[case] first: BlockKind, #[case] second: BlockKind, #[case] size: u32, #[case] expected: Severity) {
	assert_eq!(Severity::of(first, second, size), expected);
	let second_start = 0x3000 - u16::try_from(size).unwrap();
	let blocks = [block("a", 0x2000, 0x2FFF, first), block("b", second_start, 0x3FFF, second)];
	assert_eq!(detect(&blocks)[0].severity, expected);
}

#[rstest]
#[case(0x1000, 0x1FFF, 0x2000, 0x2FFF, None)]
#[case(0x1000, 0x1FFF, 0x1FFF, 0x2FFF, Some((0x1FFF, 0x1FFF)))]
#[case(0x1000, 0x1FFF, 0x1100, 0x1200, Some((0x1100, 0x1200)))]
#[case(0x0000, 0xFFFF, 0xFFFF, 0xFFFF, Some((0xFFFF, 0xFFFF)))]
fn overlap_is_symmetric(
	#[case] first_start: u16,
	#[case] first_end: u16,
	#[case] second_start: u16,
	#[case] second_end: u16,
	#[case] expected: Option<(u16, u16)>,
) {
	let first = block("first", first_start, first_end, BlockKind::Data);
	let second = block("second", second_start, second_end, BlockKind::Table);
	let forward = detect(&[first.clone(), second.clone()]);
	let backward = detect(&[second, first]);
	assert_eq!(forward.len(), backward.len());
	assert_eq!(forward.first().map(|conflict| (conflict.overlap.start, conflict.overlap.end)), expected);
	assert_eq!(forward.first().map(|conflict| conflict.overlap), backward.first().map(|conflict| conflict.overlap));
	assert_eq!(forward.first().map(|conflict| conflict.severity), backward.first().map(|conflict| conflict.severity));
}

#[test]
fn every_pair_is_reported() {
	let blocks = [
		block("a", 0x1000, 0x10FF, BlockKind::Data),
		block("b", 0x1080, 0x117F, BlockKind::Data),
		block("c", 0x10F0, 0x10F0, BlockKind::Table),
		block("d", 0x4000, 0x4FFF, BlockKind::Code),
	];
	let conflicts = detect(&blocks);
	let pairs: Vec<(&str, &str)> =
		conflicts.iter().map(|conflict| (conflict.first.name.as_str(), conflict.second.name.as_str())).collect();
	assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
	assert!(validate(&blocks[3 ..]).is_ok());
	assert!(detect(&[]).is_empty());
}

#[test]
fn byte_map_and_suggestion() {
	let report = report(&code_and_data());
	assert_eq!(report.count(Severity::Critical), 1);
	assert!(!report.is_clean());
	let expected_first_line = format!("$0000 ........AAAAAAA!BB{}", ".".repeat(46));
	assert_eq!(report.byte_map[0], expected_first_line);
	assert_eq!(report.byte_map[1], format!("$4000 {}", ".".repeat(64)));
	assert_eq!(report.byte_map.len(), 4);
	assert_eq!(report.legend[1].0, 'B');

	assert_eq!(report.suggestions, vec![Suggestion {
		block:            "tables".to_owned(),
		conflicting_with: "driver".to_owned(),
		size:             0x201,
		new_start:        Some(0x0200),
	}]);
	assert_eq!(report.suggestions[0].to_string(), "move block tables to $0200 to clear the overlap with block driver");
	assert!((report.fragmentation - (1.0 - 2305.0 / 65536.0)).abs() < 1e-9);

	let text = report.to_string();
	assert!(text.starts_with("memory layout: 2 block(s), 1 overlap(s)\n  critical: 1, high: 0, medium: 0, low: 0\n"));
	assert!(text.contains("  A = code \"driver\" $0800-$0FFF\n"));
	assert!(text.ends_with("fragmentation: 96.5%\n"));
}

#[test]
fn code_is_never_moved() {
	let blocks = [block("music", 0x1000, 0x10FF, BlockKind::Data), block("player", 0x1080, 0x13FF, BlockKind::Code)];
	let report = report(&blocks);
	assert_eq!(report.suggestions[0].block, "music");
	// $0200-$0FFF is free and large enough
	assert_eq!(report.suggestions[0].new_start, Some(0x0200));
}

#[test]
fn no_gap_left() {
	let blocks =
		[block("everything", 0x0200, 0xFFFF, BlockKind::Data), block("extra", 0x8000, 0x80FF, BlockKind::Data)];
	let report = report(&blocks);
	assert_eq!(report.suggestions[0].new_start, None);
	assert_eq!(
		report.suggestions[0].to_string(),
		"no free gap of 256 bytes for block extra; it overlaps block everything"
	);
}

#[test]
fn free_blocks_are_not_occupied() {
	let blocks = [block("unused", 0x0000, 0xFFFF, BlockKind::Free)];
	let report = report(&blocks);
	assert!(report.is_clean());
	assert!((report.fragmentation - 1.0).abs() < f64::EPSILON);
	assert_eq!(report.byte_map[3], format!("$C000 {}", "A".repeat(64)));
}

#[rstest]
#[case("tables:table:1800-19ff", Some(("tables", BlockKind::Table, 0x1800, 0x19FF)))]
#[case("io:DATA:$d000-$dfff", Some(("io", BlockKind::Data, 0xD000, 0xDFFF)))]
#[case("vector:code:fffa", Some(("vector", BlockKind::Code, 0xFFFA, 0xFFFA)))]
#[case("basic:rom:a000-bfff", None)]
#[case("nothing", None)]
#[case(":code:1000-1fff", None)]
#[case("bad:free:10000", None)]
fn block_parsing(#[case] block_text: &str, #[case] expected: Option<(&str, BlockKind, u16, u16)>) {
	let parsed = block_text.parse::<MemoryBlock>();
	match expected {
		Some((name, kind, start, end)) => {
			let parsed = parsed.unwrap();
			assert_eq!(parsed, block(name, start, end, kind));
		},
		None => assert!(matches!(parsed, Err(RelocationError::InvalidBlock { .. }))),
	}
}

#[test]
fn blocks_from_tables() {
	let definition =
		TableDefinition { kind_tag: 0, layout: TableLayout::ColumnMajor, address: 0x1800, columns: 4, rows: 3 };
	assert_eq!(
		MemoryBlock::from_table("instruments", &definition),
		Some(block("instruments", 0x1800, 0x180B, BlockKind::Table))
	);
	let empty = TableDefinition { rows: 0, ..definition };
	assert_eq!(MemoryBlock::from_table("empty", &empty), None);
	let overflowing = TableDefinition { address: 0xFFF0, columns: 0x20, rows: 1, ..definition };
	assert_eq!(MemoryBlock::from_table("wrap", &overflowing).map(|block| block.end), Some(0xFFFF));
}
