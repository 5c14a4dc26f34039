//! Memory layout validation.
//!
//! After relocation, the driver's code must not land on top of the music data, the tables or anything else the caller
//! knows to live in memory. Layouts are described as a list of named [`MemoryBlock`]s and checked pairwise.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use sf2file::TableDefinition;
use sidpack_derive::Parse;

use crate::{AddressRange, RelocationError};

mod report;
#[cfg(test)] mod test;

pub use report::{LayoutReport, Suggestion, report};

/// What a block of memory holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Parse)]
pub enum BlockKind {
	/// Executable code. Overlapping code is always critical.
	Code,
	/// Music data.
	Data,
	/// A driver table.
	Table,
	/// Memory known to be unused.
	Free,
}

impl Display for BlockKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Code => "code",
			Self::Data => "data",
			Self::Table => "table",
			Self::Free => "free",
		})
	}
}

/// A named, inclusive range of memory.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemoryBlock {
	/// Name used in reports.
	pub name:  String,
	/// First address.
	pub start: u16,
	/// Last address.
	pub end:   u16,
	/// What the block holds.
	pub kind:  BlockKind,
}

impl MemoryBlock {
	/// Creates a block covering `range`.
	#[must_use]
	pub fn new(name: impl Into<String>, range: AddressRange, kind: BlockKind) -> Self {
		Self { name: name.into(), start: range.start, end: range.end, kind }
	}

	/// The block for a driver table, or `None` if the table is empty. A table running past the end of memory is cut off
	/// at $FFFF.
	#[must_use]
	pub fn from_table(name: impl Into<String>, definition: &TableDefinition) -> Option<Self> {
		let last = definition.last_address()?;
		let end = u16::try_from(last).unwrap_or(u16::MAX);
		Some(Self::new(name, AddressRange::new(definition.address, end), BlockKind::Table))
	}

	/// The addresses the block covers.
	#[must_use]
	pub const fn range(&self) -> AddressRange {
		AddressRange::new(self.start, self.end)
	}

	/// Number of bytes in the block.
	#[must_use]
	pub const fn len(&self) -> u32 {
		self.range().len()
	}

	/// Blocks always contain at least one byte.
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		false
	}
}

impl Display for MemoryBlock {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} \"{}\" {}", self.kind, self.name, self.range())
	}
}

impl FromStr for MemoryBlock {
	type Err = RelocationError;

	/// Parses `NAME:KIND:START-END`, for example `tables:table:1800-19ff`.
	fn from_str(block: &str) -> Result<Self, Self::Err> {
		let invalid = |reason: String| RelocationError::InvalidBlock { block: block.to_owned(), reason };
		let mut parts = block.splitn(3, ':');
		let (Some(name), Some(kind), Some(range)) = (parts.next(), parts.next(), parts.next()) else {
			return Err(invalid("expected three parts separated by `:`".to_owned()));
		};
		if name.is_empty() {
			return Err(invalid("the name is empty".to_owned()));
		}
		let kind = kind.parse::<BlockKind>().map_err(invalid)?;
		let range = range.parse::<AddressRange>().map_err(invalid)?;
		Ok(Self::new(name, range, kind))
	}
}

/// How bad an overlap is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Severity {
	/// Up to 32 bytes.
	Low,
	/// Up to 128 bytes.
	Medium,
	/// Up to 512 bytes.
	High,
	/// More than 512 bytes, or any overlap with code.
	Critical,
}

impl Severity {
	/// All severities, most severe first.
	pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

	/// Severity of an overlap of `size` bytes between blocks of the given kinds.
	#[must_use]
	pub fn of(first: BlockKind, second: BlockKind, size: u32) -> Self {
		match size {
			_ if first == BlockKind::Code || second == BlockKind::Code => Self::Critical,
			513 .. => Self::Critical,
			129 .. => Self::High,
			33 .. => Self::Medium,
			_ => Self::Low,
		}
	}
}

impl Display for Severity {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
			Self::Critical => "critical",
		})
	}
}

/// Two blocks that share memory.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OverlapConflict {
	/// The block listed first.
	pub first:    MemoryBlock,
	/// The block listed second.
	pub second:   MemoryBlock,
	/// The shared addresses.
	pub overlap:  AddressRange,
	/// How bad the overlap is.
	pub severity: Severity,
}

impl OverlapConflict {
	/// Number of shared bytes.
	#[must_use]
	pub const fn size(&self) -> u32 {
		self.overlap.len()
	}
}

impl Display for OverlapConflict {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} overlaps {} at {} ({} bytes, {})",
			self.first,
			self.second,
			self.overlap,
			self.size(),
			self.severity
		)
	}
}

/// Finds every pair of overlapping blocks, in list order.
#[must_use]
pub fn detect(blocks: &[MemoryBlock]) -> Vec<OverlapConflict> {
	let mut conflicts = Vec::new();
	for (index, first) in blocks.iter().enumerate() {
		for second in &blocks[index + 1 ..] {
			if let Some(overlap) = first.range().intersection(&second.range()) {
				let severity = Severity::of(first.kind, second.kind, overlap.len());
				conflicts.push(OverlapConflict { first: first.clone(), second: second.clone(), overlap, severity });
			}
		}
	}
	conflicts
}

/// Checks that no blocks overlap.
///
/// # Errors
/// A description of every overlap.
pub fn validate(blocks: &[MemoryBlock]) -> Result<(), Vec<String>> {
	let conflicts = detect(blocks);
	if conflicts.is_empty() { Ok(()) } else { Err(conflicts.iter().map(ToString::to_string).collect()) }
}
