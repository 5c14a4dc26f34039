#![doc = include_str!("../README.md")]

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

mod error;
pub mod music;
pub mod parser;
pub mod table;
pub mod writer;


pub use error::{FormatError, Partial};
pub use table::{Matrix, TableDefinition, TableLayout};

/// Id that terminates the header block stream.
pub const BLOCK_SENTINEL: u8 = 0xFF;

/// Magic word at the start of every driver image, stored little-endian.
pub const DRIVER_MAGIC: u16 = 0x1337;

/// Offset of the first header block within the driver image (right after the magic word).
pub const HEADER_BLOCKS_START: usize = 2;

/// Largest payload a header block can carry; the length field is a single byte.
pub const MAX_BLOCK_PAYLOAD: usize = u8::MAX as usize;

/// One `[id][length][payload]` record of the header block stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBlock {
	/// Block id; see [`BlockId`] for the ids the driver format defines.
	pub id:  u8,
	payload: Vec<u8>,
}

impl HeaderBlock {
	/// Creates a block, checking that the payload fits the single-byte length field.
	///
	/// # Errors
	/// If the payload is longer than [`MAX_BLOCK_PAYLOAD`], or the id is the sentinel id.
	pub fn new(id: u8, payload: Vec<u8>) -> Result<Self, FormatError> {
		if id == BLOCK_SENTINEL {
			return Err(FormatError::SentinelBlockId);
		}
		if payload.len() > MAX_BLOCK_PAYLOAD {
			return Err(FormatError::PayloadTooLong { id, length: payload.len() });
		}
		Ok(Self { id, payload })
	}

	/// The block's payload bytes.
	#[must_use]
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Length of the payload, as stored in the length field.
	#[must_use]
	#[allow(clippy::cast_possible_truncation)]
	pub fn length(&self) -> u8 {
		// guaranteed by the constructor
		self.payload.len() as u8
	}

	/// Size of the block when serialized, including id and length bytes.
	#[must_use]
	pub fn encoded_len(&self) -> usize {
		self.payload.len() + 2
	}

	/// The well-known block kind, if the id is one the driver format defines.
	#[must_use]
	pub fn kind(&self) -> Option<BlockId> {
		BlockId::from_u8(self.id)
	}
}

/// Header block ids defined by the driver format. Unknown ids are preserved as plain [`HeaderBlock::id`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockId {
	/// Driver name, size and version.
	Descriptor               = 1,
	/// Addresses of the driver's entry points and state variables.
	DriverCommon             = 2,
	/// Table definitions, see [`TableDefinition`].
	DriverTables             = 3,
	/// Names of the instrument table columns.
	InstrumentDescriptor     = 4,
	/// Where the orderlists and sequences are, see [`MusicDataDescriptor`].
	MusicData                = 5,
	/// Editor coloring rules for tables.
	TableColorRules          = 6,
	/// Editor insert/delete rules for tables.
	InsertDeleteRules        = 7,
	/// Editor action rules for tables.
	ActionRules              = 8,
	/// Instrument data layout description.
	InstrumentDataDescriptor = 9,
}

/// Location and shape of the music data inside the driver image, read from the [`BlockId::MusicData`] block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MusicDataDescriptor {
	/// Number of tracks (SID voices).
	pub track_count:             u8,
	/// Address of the table of orderlist address low bytes, one per track.
	pub orderlist_pointers_low:  u16,
	/// Address of the table of orderlist address high bytes, one per track.
	pub orderlist_pointers_high: u16,
	/// Number of sequences.
	pub sequence_count:          u8,
	/// Address of the table of sequence address low bytes, one per sequence.
	pub sequence_pointers_low:   u16,
	/// Address of the table of sequence address high bytes, one per sequence.
	pub sequence_pointers_high:  u16,
	/// Space reserved for each track's orderlist.
	pub orderlist_size:          u16,
	/// Address of the first track's orderlist.
	pub first_orderlist:         u16,
	/// Space reserved for each sequence.
	pub sequence_size:           u16,
	/// Address of sequence 0.
	pub first_sequence:          u16,
}

/// A parsed driver file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sf2File {
	/// Address the image is loaded to.
	pub load_address: u16,
	/// The header blocks, in file order.
	pub blocks:       Vec<HeaderBlock>,
	/// Driver image, starting with the magic word. The header blocks are part of this image.
	image:            Vec<u8>,
	/// Bytes available for header blocks and their sentinel, as found in the original file.
	header_capacity:  usize,
}

impl Sf2File {
	/// Builds a file from its parts. `header_capacity` is the number of bytes after the magic word that header blocks
	/// (and the sentinel) may occupy when the blocks are rewritten.
	#[must_use]
	pub const fn from_parts(load_address: u16, blocks: Vec<HeaderBlock>, image: Vec<u8>, header_capacity: usize) -> Self {
		Self { load_address, blocks, image, header_capacity }
	}

	/// The driver image, including the magic word and header blocks.
	#[must_use]
	pub fn image(&self) -> &[u8] {
		&self.image
	}

	/// Bytes reserved for the header block stream.
	#[must_use]
	pub const fn header_capacity(&self) -> usize {
		self.header_capacity
	}

	/// Returns the first block of the given kind.
	#[must_use]
	pub fn block(&self, id: BlockId) -> Option<&HeaderBlock> {
		self.blocks.iter().find(|block| block.kind() == Some(id))
	}

	/// All table definitions of the driver.
	///
	/// # Errors
	/// If there is no driver tables block or its records are malformed.
	pub fn table_definitions(&self) -> Result<Vec<TableDefinition>, FormatError> {
		let block = self.block(BlockId::DriverTables).ok_or(FormatError::MissingBlock(BlockId::DriverTables))?;
		parser::parse_table_definitions(block)
	}

	/// Reads a table's logical contents out of the image.
	///
	/// # Errors
	/// If the table does not lie inside the image.
	pub fn extract_table(&self, definition: &TableDefinition) -> Result<Matrix<u8>, FormatError> {
		table::extract_table(&self.image, self.load_address, definition)
	}

	/// Writes a table's logical contents into the image in the layout the definition specifies.
	///
	/// # Errors
	/// If the table does not lie inside the image or the matrix has the wrong shape.
	pub fn inject_table(&mut self, definition: &TableDefinition, matrix: &Matrix<u8>) -> Result<(), FormatError> {
		table::inject_table(&mut self.image, self.load_address, definition, matrix)
	}

	/// The music data descriptor.
	///
	/// # Errors
	/// If there is no music data block or it is too short.
	pub fn music_data(&self) -> Result<MusicDataDescriptor, FormatError> {
		let block = self.block(BlockId::MusicData).ok_or(FormatError::MissingBlock(BlockId::MusicData))?;
		parser::parse_music_data(block)
	}

	/// Converts a C64 address into an offset into the image.
	#[must_use]
	pub fn offset_of(&self, address: u16) -> Option<usize> {
		let offset = usize::from(address.checked_sub(self.load_address)?);
		(offset < self.image.len()).then_some(offset)
	}

	/// Reads a pointer that is split into a low-byte table and a high-byte table.
	fn split_pointer(&self, low_table: u16, high_table: u16, index: u8) -> Result<u16, FormatError> {
		let low = self.byte_at(low_table.wrapping_add(u16::from(index)))?;
		let high = self.byte_at(high_table.wrapping_add(u16::from(index)))?;
		Ok(u16::from_le_bytes([low, high]))
	}

	fn byte_at(&self, address: u16) -> Result<u8, FormatError> {
		self.offset_of(address).map(|offset| self.image[offset]).ok_or(FormatError::AddressOutOfImage { address })
	}

	/// Address of a track's orderlist.
	///
	/// # Errors
	/// If the music data is missing, the track does not exist or the pointer tables lie outside the image.
	pub fn orderlist_address(&self, track: u8) -> Result<u16, FormatError> {
		let music = self.music_data()?;
		if track >= music.track_count {
			return Err(FormatError::NoSuchTrack { track, track_count: music.track_count });
		}
		self.split_pointer(music.orderlist_pointers_low, music.orderlist_pointers_high, track)
	}

	/// Address of a sequence.
	///
	/// # Errors
	/// If the music data is missing, the sequence does not exist or the pointer tables lie outside the image.
	pub fn sequence_address(&self, sequence: u8) -> Result<u16, FormatError> {
		let music = self.music_data()?;
		if sequence >= music.sequence_count {
			return Err(FormatError::NoSuchSequence { sequence, sequence_count: music.sequence_count });
		}
		self.split_pointer(music.sequence_pointers_low, music.sequence_pointers_high, sequence)
	}

	/// Decodes a track's orderlist.
	///
	/// # Errors
	/// Any lookup error, or the orderlist has no terminator within `max_entries`.
	pub fn orderlist(&self, track: u8, max_entries: usize) -> Result<music::Orderlist, FormatError> {
		let address = self.orderlist_address(track)?;
		let start = self.offset_of(address).ok_or(FormatError::AddressOutOfImage { address })?;
		music::decode_orderlist(&self.image, start, max_entries).map_err(|partial| partial.error)
	}

	/// Decodes a sequence.
	///
	/// # Errors
	/// Any lookup error, or the sequence has no end marker within `max_events`.
	pub fn sequence(&self, sequence: u8, max_events: usize) -> Result<Vec<music::SequenceEvent>, FormatError> {
		let address = self.sequence_address(sequence)?;
		let start = self.offset_of(address).ok_or(FormatError::AddressOutOfImage { address })?;
		music::decode_sequence(&self.image, start, max_events).map_err(|partial| partial.error)
	}

	/// Replaces the header blocks, rewriting the header area of the image. Bytes of the header area after the new
	/// sentinel are zeroed.
	///
	/// # Errors
	/// If the serialized blocks do not fit into the original header area.
	pub fn replace_blocks(&mut self, blocks: Vec<HeaderBlock>) -> Result<(), FormatError> {
		let encoded = writer::write_blocks(&blocks);
		let capacity = self.header_capacity.min(self.image.len().saturating_sub(HEADER_BLOCKS_START));
		if encoded.len() > capacity {
			return Err(FormatError::HeaderOverflow { needed: encoded.len(), capacity });
		}
		let area = &mut self.image[HEADER_BLOCKS_START .. HEADER_BLOCKS_START + capacity];
		area.fill(0);
		area[.. encoded.len()].copy_from_slice(&encoded);
		self.blocks = blocks;
		Ok(())
	}

	/// Serializes the file: load address followed by the image.
	#[must_use]
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.image.len() + 2);
		bytes.extend_from_slice(&self.load_address.to_le_bytes());
		bytes.extend_from_slice(&self.image);
		bytes
	}
}
