//! Simple example that dumps the header blocks, tables and orderlists of a driver file.

use std::env::args_os;
use std::path::PathBuf;

use sf2file::parser::parse_from_bytes;

/// Upper bound for orderlist entries; real orderlists are far shorter.
const MAX_ORDERLIST_ENTRIES: usize = 256;

fn main() {
	let file = PathBuf::from(args_os().nth(1).expect("usage: sf2dump <file.sf2>"));
	let bytes = std::fs::read(&file).unwrap_or_else(|_| panic!("error while reading file {file:?}"));

	let parsed = match parse_from_bytes(&bytes) {
		Ok(parsed) => parsed,
		Err(why) => {
			eprintln!("error while parsing driver file: {why}");
			std::process::exit(1);
		},
	};

	println!("Driver file loaded at ${:04x}, {} header blocks:", parsed.load_address, parsed.blocks.len());
	for block in &parsed.blocks {
		println!("  block ${:02x} ({:?}): {} bytes", block.id, block.kind(), block.length());
	}

	match parsed.table_definitions() {
		Ok(definitions) =>
			for definition in definitions {
				println!(
					"table ${:02x} at ${:04x}: {} rows x {} columns, {:?}",
					definition.kind_tag, definition.address, definition.rows, definition.columns, definition.layout
				);
				match parsed.extract_table(&definition) {
					Ok(matrix) =>
						for row in matrix.iter_rows() {
							println!("    {row:02x?}");
						},
					Err(why) => eprintln!("    unreadable: {why}"),
				}
			},
		Err(why) => eprintln!("no tables: {why}"),
	}

	if let Ok(music) = parsed.music_data() {
		for track in 0 .. music.track_count {
			match parsed.orderlist(track, MAX_ORDERLIST_ENTRIES) {
				Ok(orderlist) => println!("track {track}: {:?}", orderlist.entries),
				Err(why) => eprintln!("track {track}: {why}"),
			}
		}
	}
}
