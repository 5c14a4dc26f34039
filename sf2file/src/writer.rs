//! Driver file writing functionality.

use crate::table::TABLE_DEFINITION_SIZE;
use crate::{BLOCK_SENTINEL, BlockId, FormatError, HeaderBlock, MusicDataDescriptor, TableDefinition};

/// Serializes header blocks in the given order, followed by the sentinel.
#[must_use]
pub fn write_blocks(blocks: &[HeaderBlock]) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(blocks.iter().map(HeaderBlock::encoded_len).sum::<usize>() + 1);
	for block in blocks {
		bytes.push(block.id);
		bytes.push(block.length());
		bytes.extend_from_slice(block.payload());
	}
	bytes.push(BLOCK_SENTINEL);
	bytes
}

/// Builds a driver tables block from table definitions.
///
/// # Errors
/// If there are too many definitions to fit into one block (at most 42).
pub fn table_definitions_block(definitions: &[TableDefinition]) -> Result<HeaderBlock, FormatError> {
	let mut payload = Vec::with_capacity(definitions.len() * TABLE_DEFINITION_SIZE);
	for definition in definitions {
		payload.extend_from_slice(&definition.to_record());
	}
	HeaderBlock::new(BlockId::DriverTables as u8, payload)
}

/// Builds a music data block from its descriptor.
#[must_use]
pub fn music_data_block(music: &MusicDataDescriptor) -> HeaderBlock {
	let mut payload = Vec::with_capacity(crate::parser::MUSIC_DATA_SIZE);
	payload.push(music.track_count);
	payload.extend_from_slice(&music.orderlist_pointers_low.to_le_bytes());
	payload.extend_from_slice(&music.orderlist_pointers_high.to_le_bytes());
	payload.push(music.sequence_count);
	for word in [
		music.sequence_pointers_low,
		music.sequence_pointers_high,
		music.orderlist_size,
		music.first_orderlist,
		music.sequence_size,
		music.first_sequence,
	] {
		payload.extend_from_slice(&word.to_le_bytes());
	}
	HeaderBlock { id: BlockId::MusicData as u8, payload }
}
