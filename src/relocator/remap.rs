//! Zero page remapping.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::{AddressRange, RelocationError};

/// Why a zero page remap pair was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RemapConflictReason {
	/// The same source address was already mapped to `previous`.
	DuplicateSource {
		/// The first target given for this source.
		previous: u8,
	},
	/// Another source already maps to the same target.
	SharedTarget {
		/// The other source.
		other_source: u8,
	},
	/// The source is reserved.
	ReservedSource,
	/// The target is reserved.
	ReservedTarget,
	/// The target is already used by code that keeps using it.
	TargetInUse {
		/// How often the code uses the target.
		uses: usize,
	},
}

impl Display for RemapConflictReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::DuplicateSource { previous } => write!(f, "the source is already remapped to ${previous:02X}"),
			Self::SharedTarget { other_source } => write!(f, "${other_source:02X} is already remapped to this target"),
			Self::ReservedSource => write!(f, "the source is reserved"),
			Self::ReservedTarget => write!(f, "the target is reserved"),
			Self::TargetInUse { uses } => write!(f, "the target is used {uses} time(s) by code that is not remapped"),
		}
	}
}

/// An injective mapping of zero page addresses.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ZeroPageRemap(BTreeMap<u8, u8>);

impl ZeroPageRemap {
	/// Creates a remap from `(from, to)` pairs.
	///
	/// # Errors
	/// If a source appears twice, or two sources share a target.
	pub fn new(pairs: impl IntoIterator<Item = (u8, u8)>) -> Result<Self, RelocationError> {
		let mut map = BTreeMap::new();
		let mut targets = BTreeMap::new();
		for (from, to) in pairs {
			if let Some(&previous) = map.get(&from) {
				return Err(RelocationError::RemapConflict {
					from,
					to,
					reason: RemapConflictReason::DuplicateSource { previous },
				});
			}
			if let Some(&other_source) = targets.get(&to) {
				return Err(RelocationError::RemapConflict {
					from,
					to,
					reason: RemapConflictReason::SharedTarget { other_source },
				});
			}
			map.insert(from, to);
			targets.insert(to, from);
		}
		Ok(Self(map))
	}

	/// Where `address` is remapped to.
	#[must_use]
	pub fn get(&self, address: u8) -> Option<u8> {
		self.0.get(&address).copied()
	}

	/// Whether `address` is remapped.
	#[must_use]
	pub fn remaps(&self, address: u8) -> bool {
		self.0.contains_key(&address)
	}

	/// All `(from, to)` pairs, ordered by source.
	pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
		self.0.iter().map(|(from, to)| (*from, *to))
	}

	/// Number of remapped addresses.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether nothing is remapped.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Zero page addresses that belong to the host program or operating system and must not be touched by remapping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReservedZeroPage([bool; 256]);

impl Default for ReservedZeroPage {
	fn default() -> Self {
		Self([false; 256])
	}
}

impl ReservedZeroPage {
	/// Reserves the zero page part of every range.
	#[must_use]
	pub fn new(ranges: impl IntoIterator<Item = AddressRange>) -> Self {
		let mut reserved = Self::default();
		for range in ranges {
			for address in range.start ..= range.end.min(0xFF) {
				reserved.0[usize::from(address)] = true;
			}
		}
		reserved
	}

	/// Whether the address is reserved.
	#[must_use]
	pub const fn contains(&self, address: u8) -> bool {
		self.0[address as usize]
	}
}
