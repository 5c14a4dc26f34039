//! Finding the code in a binary.
//!
//! Music drivers freely mix code with data tables, and decoding a table as code produces plausible-looking absolute
//! operands that must never be patched. So code is only ever discovered by following execution: from the entry points,
//! decode sequentially, follow branch, `JSR` and absolute `JMP` targets that stay inside the image, and stop at
//! `RTS`, `RTI`, `JMP`, `BRK` and anything that isn't a valid instruction. Callers who know more (jump tables,
//! self-modifying code) can declare additional code ranges.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{DecoderOptions, Instruction, decode_one, decode_range};
use crate::AddressRange;

/// The instructions found in a binary, keyed by their offset. No two instructions share a byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeMap {
	instructions: BTreeMap<usize, Instruction>,
	covered:      Vec<bool>,
}

impl CodeMap {
	fn new(length: usize) -> Self {
		Self { instructions: BTreeMap::new(), covered: vec![false; length] }
	}

	/// Records an instruction unless it shares a byte with one already recorded.
	fn insert(&mut self, instruction: Instruction) -> bool {
		let bytes = instruction.offset .. instruction.end_offset();
		match self.covered.get_mut(bytes) {
			Some(covered) if !covered.contains(&true) => {
				covered.fill(true);
				self.instructions.insert(instruction.offset, instruction);
				true
			},
			_ => false,
		}
	}

	/// All instructions in buffer order.
	pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
		self.instructions.values()
	}

	/// The instruction starting at the given buffer offset.
	#[must_use]
	pub fn instruction_at(&self, offset: usize) -> Option<&Instruction> {
		self.instructions.get(&offset)
	}

	/// Number of instructions found.
	#[must_use]
	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	/// Whether no code was found at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	/// Whether the byte at `offset` belongs to some instruction.
	#[must_use]
	pub fn is_code_byte(&self, offset: usize) -> bool {
		self.covered.get(offset).copied().unwrap_or(false)
	}

	/// Number of bytes that belong to instructions.
	#[must_use]
	pub fn covered_bytes(&self) -> usize {
		self.covered.iter().filter(|covered| **covered).count()
	}
}

/// Offset of `address` in a buffer loaded at `base`, if the buffer contains it.
fn offset_of(buffer: &[u8], base: u16, address: u16) -> Option<usize> {
	let offset = usize::from(address.wrapping_sub(base));
	(offset < buffer.len()).then_some(offset)
}

/// Finds all code reachable from `entry_points`, plus the code in `code_ranges`. Entry points and ranges outside the
/// buffer are ignored with a warning; an entry point of 0 is the convention for "no such entry point" and is skipped
/// silently.
#[must_use]
pub fn trace(
	buffer: &[u8],
	base: u16,
	entry_points: &[u16],
	code_ranges: &[AddressRange],
	options: DecoderOptions,
) -> CodeMap {
	let mut map = CodeMap::new(buffer.len());

	for range in code_ranges {
		let Some(start) = offset_of(buffer, base, range.start) else {
			warn!("code range {range} starts outside of the image, ignoring it");
			continue;
		};
		let length = usize::try_from(range.len()).unwrap_or(usize::MAX);
		for instruction in decode_range(buffer, base, start, length, options) {
			if instruction.is_code() && !map.insert(instruction) {
				debug!("${:04X} {instruction} overlaps previously found code", instruction.address);
			}
		}
	}

	// popped in the given order
	let mut pending = Vec::new();
	for &entry_point in entry_points.iter().rev().filter(|entry_point| **entry_point != 0) {
		match offset_of(buffer, base, entry_point) {
			Some(offset) => pending.push(offset),
			None => warn!("entry point ${entry_point:04X} is outside of the image, ignoring it"),
		}
	}

	while let Some(mut offset) = pending.pop() {
		while !map.is_code_byte(offset) {
			let Some(instruction) = decode_one(buffer, base, offset, options) else {
				break;
			};
			if !instruction.is_code() {
				debug!("execution from ${:04X} runs into data: {instruction}", instruction.address);
				break;
			}
			if !map.insert(instruction) {
				debug!("${:04X} {instruction} overlaps previously found code", instruction.address);
				break;
			}
			trace!("${:04X} {instruction}", instruction.address);

			if let Some(target) = instruction.flow_target() {
				match offset_of(buffer, base, target) {
					Some(target_offset) => pending.push(target_offset),
					None => {
						trace!("${:04X} leaves the image to ${target:04X}", instruction.address);
					},
				}
			}
			if instruction.ends_flow() {
				break;
			}
			offset = instruction.end_offset();
		}
	}

	debug!("found {} instructions covering {} of {} bytes", map.len(), map.covered_bytes(), buffer.len());
	map
}
