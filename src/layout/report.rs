//! Human-readable layout reports.

use std::fmt::{Display, Formatter};

use super::{BlockKind, MemoryBlock, OverlapConflict, Severity, detect};

/// Bytes per byte map cell.
const CELL_SIZE: usize = 256;
/// Byte map cells per line.
const CELLS_PER_LINE: usize = 64;
/// Suggestions never move blocks into the zero page or the stack.
const FIRST_SUGGESTED_ADDRESS: usize = 0x0200;
const ADDRESS_SPACE: usize = 0x1_0000;
const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A proposal to resolve one overlap by moving one of the blocks.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Suggestion {
	/// Name of the block to move.
	pub block:            String,
	/// Name of the block it overlaps.
	pub conflicting_with: String,
	/// Size of the block to move.
	pub size:             u32,
	/// The lowest address where the block fits without overlapping anything, if there is one.
	pub new_start:        Option<u16>,
}

impl Display for Suggestion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.new_start {
			Some(start) => write!(
				f,
				"move block {} to ${start:04X} to clear the overlap with block {}",
				self.block, self.conflicting_with
			),
			None => write!(
				f,
				"no free gap of {} bytes for block {}; it overlaps block {}",
				self.size, self.block, self.conflicting_with
			),
		}
	}
}

/// Everything known about a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutReport {
	/// Number of blocks in the layout.
	pub block_count:   usize,
	/// All overlaps.
	pub conflicts:     Vec<OverlapConflict>,
	/// Each block's glyph in the byte map.
	pub legend:        Vec<(char, MemoryBlock)>,
	/// The address space drawn with one character per 256 bytes.
	pub byte_map:      Vec<String>,
	/// One suggestion per overlap.
	pub suggestions:   Vec<Suggestion>,
	/// Share of the address space not claimed by any non-free block.
	pub fragmentation: f64,
}

impl LayoutReport {
	/// Number of overlaps with the given severity.
	#[must_use]
	pub fn count(&self, severity: Severity) -> usize {
		self.conflicts.iter().filter(|conflict| conflict.severity == severity).count()
	}

	/// Whether there are no overlaps.
	#[must_use]
	pub fn is_clean(&self) -> bool {
		self.conflicts.is_empty()
	}
}

impl Display for LayoutReport {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "memory layout: {} block(s), {} overlap(s)", self.block_count, self.conflicts.len())?;
		let counts: Vec<String> =
			Severity::ALL.iter().map(|severity| format!("{severity}: {}", self.count(*severity))).collect();
		writeln!(f, "  {}", counts.join(", "))?;
		for conflict in &self.conflicts {
			writeln!(f, "  {conflict}")?;
		}
		writeln!(f, "byte map ({CELL_SIZE} bytes per character, `!` = shared, `.` = empty):")?;
		for line in &self.byte_map {
			writeln!(f, "  {line}")?;
		}
		for (glyph, block) in &self.legend {
			writeln!(f, "  {glyph} = {block}")?;
		}
		if !self.suggestions.is_empty() {
			writeln!(f, "suggestions:")?;
			for suggestion in &self.suggestions {
				writeln!(f, "  {suggestion}")?;
			}
		}
		writeln!(f, "fragmentation: {:.1}%", self.fragmentation * 100.0)
	}
}

fn glyph(index: usize) -> char {
	GLYPHS.get(index).map_or('#', |glyph| char::from(*glyph))
}

fn byte_map(blocks: &[MemoryBlock]) -> Vec<String> {
	let mut claims = [0_usize; ADDRESS_SPACE / CELL_SIZE];
	let mut owner = [None; ADDRESS_SPACE / CELL_SIZE];
	for (index, block) in blocks.iter().enumerate() {
		for cell in usize::from(block.start) / CELL_SIZE ..= usize::from(block.end) / CELL_SIZE {
			claims[cell] += 1;
			owner[cell] = Some(index);
		}
	}

	let cells: Vec<char> = claims
		.iter()
		.zip(owner)
		.map(|(&claims, owner)| match (claims, owner) {
			(0, _) | (_, None) => '.',
			(1, Some(index)) => glyph(index),
			_ => '!',
		})
		.collect();
	cells
		.chunks(CELLS_PER_LINE)
		.enumerate()
		.map(|(line, cells)| format!("${:04X} {}", line * CELLS_PER_LINE * CELL_SIZE, cells.iter().collect::<String>()))
		.collect()
}

/// Marks the bytes of every non-free block.
fn occupied<'a>(blocks: impl IntoIterator<Item = &'a MemoryBlock>) -> Vec<bool> {
	let mut occupied = vec![false; ADDRESS_SPACE];
	for block in blocks.into_iter().filter(|block| block.kind != BlockKind::Free) {
		occupied[usize::from(block.start) ..= usize::from(block.end)].fill(true);
	}
	occupied
}

/// Lowest start address of a run of `size` unoccupied bytes.
fn lowest_gap(occupied: &[bool], size: u32) -> Option<u16> {
	let size = usize::try_from(size).ok()?;
	let mut run_start = FIRST_SUGGESTED_ADDRESS;
	for (address, taken) in occupied.iter().enumerate().skip(FIRST_SUGGESTED_ADDRESS) {
		if *taken {
			run_start = address + 1;
		} else if address + 1 - run_start >= size {
			return u16::try_from(run_start).ok();
		}
	}
	None
}

fn suggest(blocks: &[MemoryBlock], conflict: &OverlapConflict) -> Suggestion {
	// code stays put when the other block can move instead
	let (moved, kept) = if conflict.second.kind == BlockKind::Code && conflict.first.kind != BlockKind::Code {
		(&conflict.first, &conflict.second)
	} else {
		(&conflict.second, &conflict.first)
	};
	let others = occupied(blocks.iter().filter(|block| *block != moved));
	Suggestion {
		block:            moved.name.clone(),
		conflicting_with: kept.name.clone(),
		size:             moved.len(),
		new_start:        lowest_gap(&others, moved.len()),
	}
}

/// Analyzes a layout: overlaps, byte map, suggestions and fragmentation.
#[must_use]
pub fn report(blocks: &[MemoryBlock]) -> LayoutReport {
	let conflicts = detect(blocks);
	let suggestions = conflicts.iter().map(|conflict| suggest(blocks, conflict)).collect();
	let occupied_bytes = occupied(blocks).into_iter().filter(|taken| *taken).count();
	#[allow(clippy::cast_precision_loss)]
	let fragmentation = 1.0 - occupied_bytes as f64 / ADDRESS_SPACE as f64;

	LayoutReport {
		block_count: blocks.len(),
		conflicts,
		legend: blocks.iter().enumerate().map(|(index, block)| (glyph(index), block.clone())).collect(),
		byte_map: byte_map(blocks),
		suggestions,
		fragmentation,
	}
}
