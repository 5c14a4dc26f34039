//! Error types.

use std::error::Error as StdError;
use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;

use crate::BlockId;

/// Everything that can go wrong while reading or writing driver files.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
	/// The file ends before the load address and magic word.
	#[error("file is {length} bytes long, too short for a driver file")]
	Truncated { length: usize },

	/// The driver image does not start with the magic word.
	#[error("expected driver magic $1337, found ${found:04x}")]
	BadMagic { found: u16 },

	/// A header block's length runs past the end of the buffer.
	#[error(
		"header block ${id:02x} at offset {offset:#x} needs {needed} bytes but only {available} are left in the buffer"
	)]
	ContainerOverrun { id: u8, offset: usize, needed: usize, available: usize },

	/// The header block stream ends without its sentinel.
	#[error("header block stream starting at offset {start:#x} has no sentinel")]
	MissingBlockSentinel { start: usize },

	/// A block that was required is not present.
	#[error("driver has no {0:?} block")]
	MissingBlock(BlockId),

	/// A header block is too long to encode.
	#[error("header block ${id:02x} has {length} payload bytes, but at most 255 fit")]
	PayloadTooLong { id: u8, length: usize },

	/// The sentinel id was used for a regular block.
	#[error("the id $ff is reserved for the end of the header block stream")]
	SentinelBlockId,

	/// Rewritten header blocks need more space than the original ones.
	#[error("header blocks need {needed} bytes but the header area only has {capacity}")]
	HeaderOverflow { needed: usize, capacity: usize },

	/// A block payload is not a whole number of fixed-size records.
	#[error("block ${id:02x} payload of {length} bytes is not a multiple of the {record_size}-byte record size")]
	RaggedRecords { id: u8, length: usize, record_size: usize },

	/// A block payload is shorter than its fixed structure.
	#[error("block ${id:02x} payload of {length} bytes is shorter than the required {needed} bytes")]
	ShortBlock { id: u8, length: usize, needed: usize },

	/// A table definition has an unknown layout byte.
	#[error("table definition {index} has unknown layout ${layout:02x}")]
	InvalidTableLayout { index: usize, layout: u8 },

	/// A table lies (partly) outside the buffer.
	#[error("table at ${address:04x} with {length} bytes lies outside the image (${base:04x}, {image_length} bytes)")]
	TableOutOfBounds { address: u16, length: usize, base: u16, image_length: usize },

	/// A matrix does not have the shape a table definition specifies.
	#[error("matrix is {rows}x{columns} but the table is {expected_rows}x{expected_columns}")]
	MatrixShapeMismatch { rows: usize, columns: usize, expected_rows: usize, expected_columns: usize },

	/// An address does not map into the image.
	#[error("address ${address:04x} lies outside the image")]
	AddressOutOfImage { address: u16 },

	/// A track index beyond the driver's track count.
	#[error("track {track} requested, but the driver only has {track_count}")]
	NoSuchTrack { track: u8, track_count: u8 },

	/// A sequence index beyond the driver's sequence count.
	#[error("sequence {sequence} requested, but the driver only has {sequence_count}")]
	NoSuchSequence { sequence: u8, sequence_count: u8 },

	/// An orderlist or sequence has no terminator within its bound.
	#[error("no terminator found within {limit} entries of the list starting at offset {start:#x}")]
	SentinelNotFound { start: usize, limit: usize },

	/// An orderlist value that cannot be encoded.
	#[error("orderlist entry {index} cannot be encoded: {reason}")]
	InvalidOrderlistEntry { index: usize, reason: &'static str },
}

/// Result of a decoder that stopped early: everything decoded up to the failure, together with the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial<T> {
	/// Values decoded before the error occurred.
	pub decoded: T,
	/// Why decoding stopped.
	pub error:   FormatError,
}

impl<T> Display for Partial<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.error, f)
	}
}

impl<T: Debug> StdError for Partial<T> {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		Some(&self.error)
	}
}
