//! Driver file parsing functionality.
//!
//! See [the parent module](`crate`) for definitions of the Rust structures that represent the driver file data.

use nom::multi::length_data;
use nom::number::complete::{le_u16, le_u8};
use nom::sequence::tuple;
use nom::IResult;
use num_traits::FromPrimitive;

use crate::table::TABLE_DEFINITION_SIZE;
use crate::{
	BLOCK_SENTINEL, DRIVER_MAGIC, FormatError, HEADER_BLOCKS_START, HeaderBlock, MusicDataDescriptor, Partial,
	Sf2File, TableDefinition, TableLayout,
};

/// Size of the music data block's fixed structure.
pub const MUSIC_DATA_SIZE: usize = 18;

/// Parse a driver file from a byte slice.
///
/// # Errors
/// If the file is too short, has the wrong magic, or its header block stream is malformed.
pub fn parse_from_bytes(bytes: &[u8]) -> Result<Sf2File, FormatError> {
	let truncated = || FormatError::Truncated { length: bytes.len() };
	let (_, (load_address, magic)) = load_address_and_magic(bytes).map_err(|_| truncated())?;
	if magic != DRIVER_MAGIC {
		return Err(FormatError::BadMagic { found: magic });
	}
	// the parser consumed the magic, but image offsets include it
	let image = &bytes[2 ..];

	let blocks = read_blocks(image, HEADER_BLOCKS_START).map_err(|partial| partial.error)?;
	let blocks_length: usize = blocks.iter().map(HeaderBlock::encoded_len).sum();
	let sentinel_offset = HEADER_BLOCKS_START + blocks_length;
	if image.get(sentinel_offset) != Some(&BLOCK_SENTINEL) {
		return Err(FormatError::MissingBlockSentinel { start: HEADER_BLOCKS_START });
	}

	Ok(Sf2File::from_parts(load_address, blocks, image.to_vec(), blocks_length + 1))
}

fn load_address_and_magic(input: &[u8]) -> IResult<&[u8], (u16, u16)> {
	tuple((le_u16, le_u16))(input)
}

/// One `[id][length][payload]` record.
fn header_block(input: &[u8]) -> IResult<&[u8], (u8, &[u8])> {
	tuple((le_u8, length_data(le_u8)))(input)
}

/// Reads the header block stream of `buffer` starting at `start`. Reading stops at the sentinel id or at the end of the
/// buffer, whichever comes first.
///
/// # Errors
/// If a block's declared length runs past the end of the buffer. The blocks read before that block are returned along
/// with the error.
pub fn read_blocks(buffer: &[u8], start: usize) -> Result<Vec<HeaderBlock>, Partial<Vec<HeaderBlock>>> {
	let mut blocks = Vec::new();
	let mut input = buffer.get(start ..).unwrap_or_default();

	while let Some(&id) = input.first() {
		if id == BLOCK_SENTINEL {
			break;
		}
		let offset = buffer.len() - input.len();
		match header_block(input) {
			Ok((rest, (id, payload))) => {
				// the length byte can't describe more than the maximum payload, so this never fails
				blocks.push(HeaderBlock { id, payload: payload.to_vec() });
				input = rest;
			},
			Err(_) => {
				let needed = 2 + input.get(1).map_or(0, |length| usize::from(*length));
				return Err(Partial {
					decoded: blocks,
					error:   FormatError::ContainerOverrun { id, offset, needed, available: input.len() },
				});
			},
		}
	}
	Ok(blocks)
}

fn table_definition_record(input: &[u8]) -> IResult<&[u8], (u8, u8, u16, u8, u8)> {
	tuple((le_u8, le_u8, le_u16, le_u8, le_u8))(input)
}

/// Interprets a block's payload as an array of table definition records.
///
/// # Errors
/// If the payload is not a whole number of records, or a record has an unknown layout.
pub fn parse_table_definitions(block: &HeaderBlock) -> Result<Vec<TableDefinition>, FormatError> {
	let payload = block.payload();
	if payload.len() % TABLE_DEFINITION_SIZE != 0 {
		return Err(FormatError::RaggedRecords {
			id:          block.id,
			length:      payload.len(),
			record_size: TABLE_DEFINITION_SIZE,
		});
	}

	payload
		.chunks_exact(TABLE_DEFINITION_SIZE)
		.enumerate()
		.map(|(index, record)| {
			// chunks are exactly as large as the record, so the parser can't run out of input
			let (_, (kind_tag, layout, address, columns, rows)) =
				table_definition_record(record).map_err(|_| FormatError::ShortBlock {
					id:     block.id,
					length: payload.len(),
					needed: (index + 1) * TABLE_DEFINITION_SIZE,
				})?;
			let layout = TableLayout::from_u8(layout).ok_or(FormatError::InvalidTableLayout { index, layout })?;
			Ok(TableDefinition { kind_tag, layout, address, columns, rows })
		})
		.collect()
}

#[allow(clippy::type_complexity)]
fn music_data_record(input: &[u8]) -> IResult<&[u8], (u8, u16, u16, u8, u16, u16, u16, u16, u16, u16)> {
	tuple((le_u8, le_u16, le_u16, le_u8, le_u16, le_u16, le_u16, le_u16, le_u16, le_u16))(input)
}

/// Interprets a block's payload as the music data descriptor.
///
/// # Errors
/// If the payload is too short.
pub fn parse_music_data(block: &HeaderBlock) -> Result<MusicDataDescriptor, FormatError> {
	let (
		_,
		(
			track_count,
			orderlist_pointers_low,
			orderlist_pointers_high,
			sequence_count,
			sequence_pointers_low,
			sequence_pointers_high,
			orderlist_size,
			first_orderlist,
			sequence_size,
			first_sequence,
		),
	) = music_data_record(block.payload()).map_err(|_| FormatError::ShortBlock {
		id:     block.id,
		length: block.payload().len(),
		needed: MUSIC_DATA_SIZE,
	})?;

	Ok(MusicDataDescriptor {
		track_count,
		orderlist_pointers_low,
		orderlist_pointers_high,
		sequence_count,
		sequence_pointers_low,
		sequence_pointers_high,
		orderlist_size,
		first_orderlist,
		sequence_size,
		first_sequence,
	})
}
