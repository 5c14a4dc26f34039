//! Moving a driver to a new base address.
//!
//! Relocation happens in two steps. [`RelocationPlan::new`] reads the scan result and decides, for every reference,
//! whether and how it is patched; it never touches the code. [`RelocationPlan::apply`] then checks that every patch
//! site still holds the bytes the plan was made from and only afterwards writes anything. A reference the plan can't
//! account for is dropped and reported instead of patched: an unpatched reference is visible in the report, a wrongly
//! patched one is not.

use std::fmt::{Display, Formatter};

use log::{debug, warn};

use crate::RelocationError;
use crate::scanner::{AddressReference, Classification, ScanResult};

mod remap;
#[cfg(test)] mod test;

pub use remap::{RemapConflictReason, ReservedZeroPage, ZeroPageRemap};

/// Why a relocatable reference was not patched.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DropReason {
	/// The target lies outside the region that moves.
	OutsideRegion {
		/// First address of the region.
		region_start:  u16,
		/// Length of the region.
		region_length: u32,
	},
	/// The relocated target would lie outside the address space.
	WrapsAddressSpace {
		/// The relocated target.
		relocated: i32,
	},
}

impl Display for DropReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::OutsideRegion { region_start, region_length } => write!(
				f,
				"target is outside of the relocation region ${region_start:04X}-${:04X}",
				u32::from(*region_start) + region_length - 1
			),
			Self::WrapsAddressSpace { relocated } => write!(f, "relocated target {relocated:#x} is not a valid address"),
		}
	}
}

/// A relocatable reference that was left untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DroppedReference {
	/// The reference.
	pub reference: AddressReference,
	/// Why it was dropped.
	pub reason:    DropReason,
}

impl Display for DroppedReference {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.reference, self.reason)
	}
}

/// Replaces a 16-bit operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct OperandPatch {
	/// Buffer offset of the operand's low byte.
	pub byte_offset: usize,
	/// The operand before relocation.
	pub original:    u16,
	/// The operand after relocation.
	pub relocated:   u16,
}

/// Replaces a zero page address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ZeroPagePatch {
	/// Buffer offset of the address byte.
	pub byte_offset: usize,
	/// The address before remapping.
	pub original:    u8,
	/// The address after remapping.
	pub remapped:    u8,
}

/// All patches needed to move a driver, decided before any byte is written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelocationPlan {
	old_base:          u16,
	new_base:          u16,
	region_length:     u32,
	remap:             ZeroPageRemap,
	patches:           Vec<OperandPatch>,
	zero_page_patches: Vec<ZeroPagePatch>,
	dropped:           Vec<DroppedReference>,
}

/// What [`RelocationPlan::apply`] did.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AppliedRelocation {
	/// Number of 16-bit operands rewritten.
	pub operands_patched:  usize,
	/// Number of zero page addresses rewritten.
	pub zero_page_patched: usize,
	/// Bytes written: two per operand, one per zero page address.
	pub bytes_written:     usize,
	/// Bytes whose value actually changed.
	pub bytes_changed:     usize,
	/// References that were not patched.
	pub dropped:           Vec<DroppedReference>,
}

impl RelocationPlan {
	/// Plans moving the region of `region_length` bytes at `old_base` to `new_base`, remapping zero page addresses
	/// along the way.
	///
	/// # Errors
	/// If the remap touches a reserved address, or remaps to an address that code keeps using. No plan is made then.
	pub fn new(
		scan: &ScanResult,
		old_base: u16,
		new_base: u16,
		region_length: u32,
		remap: ZeroPageRemap,
		reserved: &ReservedZeroPage,
	) -> Result<Self, RelocationError> {
		Self::check_remap(scan, &remap, reserved)?;

		let delta = i32::from(new_base) - i32::from(old_base);
		let region = u32::from(old_base) .. u32::from(old_base) + region_length;
		let mut patches = Vec::new();
		let mut zero_page_patches = Vec::new();
		let mut dropped = Vec::new();

		for reference in &scan.references {
			match reference.classification {
				Classification::Relocatable => {
					let target = reference.target_address;
					if !region.contains(&u32::from(target)) {
						let reason = DropReason::OutsideRegion { region_start: old_base, region_length };
						warn!("not relocating {reference}: {reason}");
						dropped.push(DroppedReference { reference: *reference, reason });
						continue;
					}
					let relocated = i32::from(target) + delta;
					let Ok(relocated_target) = u16::try_from(relocated) else {
						let reason = DropReason::WrapsAddressSpace { relocated };
						warn!("not relocating {reference}: {reason}");
						dropped.push(DroppedReference { reference: *reference, reason });
						continue;
					};
					trace!("{reference} -> ${relocated_target:04X}");
					patches.push(OperandPatch {
						byte_offset: reference.byte_offset,
						original:    target,
						relocated:   relocated_target,
					});
				},
				Classification::ZeroPage => {
					let [address, _] = reference.target_address.to_le_bytes();
					if let Some(remapped) = remap.get(address) {
						zero_page_patches.push(ZeroPagePatch { byte_offset: reference.byte_offset, original: address, remapped });
					}
				},
				Classification::HardwareRegister | Classification::External => {},
			}
		}

		for operand in &scan.zero_page {
			if let Some(remapped) = remap.get(operand.address) {
				zero_page_patches.push(ZeroPagePatch {
					byte_offset: operand.byte_offset,
					original: operand.address,
					remapped,
				});
			}
		}
		zero_page_patches.sort_by_key(|patch| patch.byte_offset);

		debug!(
			"planned {} operand and {} zero page patches for ${old_base:04X} -> ${new_base:04X}, dropped {}",
			patches.len(),
			zero_page_patches.len(),
			dropped.len()
		);
		Ok(Self { old_base, new_base, region_length, remap, patches, zero_page_patches, dropped })
	}

	fn check_remap(
		scan: &ScanResult,
		remap: &ZeroPageRemap,
		reserved: &ReservedZeroPage,
	) -> Result<(), RelocationError> {
		let usage = scan.zero_page_usage();
		for (from, to) in remap.iter() {
			let reason = if reserved.contains(from) {
				RemapConflictReason::ReservedSource
			} else if reserved.contains(to) {
				RemapConflictReason::ReservedTarget
			} else if let Some(&uses) = usage.get(&to).filter(|_| !remap.remaps(to)) {
				RemapConflictReason::TargetInUse { uses }
			} else {
				continue;
			};
			return Err(RelocationError::RemapConflict { from, to, reason });
		}
		Ok(())
	}

	/// Signed distance the region moves.
	#[must_use]
	pub fn delta(&self) -> i32 {
		i32::from(self.new_base) - i32::from(self.old_base)
	}

	/// First address of the region before relocation.
	#[must_use]
	pub const fn old_base(&self) -> u16 {
		self.old_base
	}

	/// First address of the region after relocation.
	#[must_use]
	pub const fn new_base(&self) -> u16 {
		self.new_base
	}

	/// Length of the region that moves.
	#[must_use]
	pub const fn region_length(&self) -> u32 {
		self.region_length
	}

	/// The zero page remap this plan applies.
	#[must_use]
	pub const fn remap(&self) -> &ZeroPageRemap {
		&self.remap
	}

	/// Operand patches, in buffer order.
	#[must_use]
	pub fn patches(&self) -> &[OperandPatch] {
		&self.patches
	}

	/// Zero page patches, in buffer order.
	#[must_use]
	pub fn zero_page_patches(&self) -> &[ZeroPagePatch] {
		&self.zero_page_patches
	}

	/// References that will not be patched.
	#[must_use]
	pub fn dropped(&self) -> &[DroppedReference] {
		&self.dropped
	}

	/// Whether every relocatable reference is patched.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.dropped.is_empty()
	}

	/// Number of bytes [`Self::apply`] will write.
	#[must_use]
	pub fn bytes_to_write(&self) -> usize {
		2 * self.patches.len() + self.zero_page_patches.len()
	}

	/// Writes all patches into `buffer`, which must be the buffer that was scanned.
	///
	/// # Errors
	/// If any patch site is outside the buffer or does not hold the bytes the plan was made from. This also rejects
	/// applying a plan to a buffer that was already relocated. Nothing is written in that case.
	pub fn apply(self, buffer: &mut [u8]) -> Result<AppliedRelocation, RelocationError> {
		let sites = self
			.patches
			.iter()
			.map(|patch| (patch.byte_offset, patch.original.to_le_bytes().to_vec()))
			.chain(self.zero_page_patches.iter().map(|patch| (patch.byte_offset, vec![patch.original])));
		for (offset, expected) in sites {
			let found = buffer
				.get(offset .. offset + expected.len())
				.ok_or(RelocationError::BufferLengthMismatch { offset, length: buffer.len() })?;
			if found != expected.as_slice() {
				return Err(RelocationError::StalePatchSite { offset, expected, found: found.to_vec() });
			}
		}

		let mut bytes_changed = 0;
		for patch in &self.patches {
			let site = &mut buffer[patch.byte_offset .. patch.byte_offset + 2];
			let relocated = patch.relocated.to_le_bytes();
			bytes_changed += site.iter().zip(relocated).filter(|(old, new)| **old != *new).count();
			site.copy_from_slice(&relocated);
		}
		for patch in &self.zero_page_patches {
			if buffer[patch.byte_offset] != patch.remapped {
				bytes_changed += 1;
			}
			buffer[patch.byte_offset] = patch.remapped;
		}

		let bytes_written = self.bytes_to_write();
		debug!("relocation wrote {bytes_written} bytes, {bytes_changed} of which changed");
		Ok(AppliedRelocation {
			operands_patched: self.patches.len(),
			zero_page_patched: self.zero_page_patches.len(),
			bytes_written,
			bytes_changed,
			dropped: self.dropped,
		})
	}
}
