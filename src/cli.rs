//! Command-line interface related structures.

use crate::parse_address;

/// Parses a zero page remap pair written as `FROM=TO`, for example `fb=02`.
///
/// # Errors
/// If the pair is malformed or an address is outside the zero page.
pub fn parse_remap_pair(pair: &str) -> Result<(u8, u8), String> {
	let (from, to) = pair.split_once('=').ok_or_else(|| format!("expected `FROM=TO`, got `{pair}`"))?;
	Ok((parse_zero_page(from)?, parse_zero_page(to)?))
}

/// Parses an address that must lie in the zero page.
///
/// # Errors
/// If the address is invalid or above $FF.
pub fn parse_zero_page(address: &str) -> Result<u8, String> {
	let parsed = parse_address(address)?;
	u8::try_from(parsed).map_err(|_| format!("${parsed:04X} is not a zero page address"))
}

mod clap_dependent {
	use std::path::PathBuf;

	use clap::{Parser, ValueEnum};

	use super::parse_remap_pair;
	use crate::layout::MemoryBlock;
	use crate::{AddressRange, parse_address};

	/// Relocates 6502 music drivers.
	#[derive(Clone, Debug, Parser)]
	#[clap(author, version, about, long_about = None)]
	pub struct SidrelocCli {
		/// Driver to relocate: a PRG file, or a raw binary if --load-address is given.
		#[clap(value_parser)]
		pub input:           PathBuf,
		/// Where to write the relocated driver.
		#[clap(value_parser)]
		pub output:          PathBuf,
		/// New load address. Hexadecimal by default; `$` and `0x` prefixes are accepted, `#` means decimal.
		#[clap(value_parser = parse_address)]
		pub new_base:        u16,
		/// Treat the input as a raw binary loaded at this address.
		#[clap(value_parser = parse_address, long)]
		pub load_address:    Option<u16>,
		/// Init routine. Defaults to the load address.
		#[clap(value_parser = parse_address, long)]
		pub init:            Option<u16>,
		/// Play routine. Defaults to three bytes after the load address if the driver starts with a `JMP init / JMP
		/// play` table; otherwise only init is traced.
		#[clap(value_parser = parse_address, long)]
		pub play:            Option<u16>,
		/// Additional code ranges the tracer can't reach, as START-END.
		#[clap(value_parser, long)]
		pub code:            Vec<AddressRange>,
		/// Hardware register window, never relocated.
		#[clap(value_parser, long, default_value = "d000-dfff")]
		pub hardware:        AddressRange,
		/// Addresses that belong to the driver. Defaults to the moved region.
		#[clap(value_parser, long)]
		pub relocatable:     Option<AddressRange>,
		/// Last address of the moved region, when the driver uses memory after the end of the file.
		#[clap(value_parser = parse_address, long)]
		pub region_end:      Option<u16>,
		/// Zero page addresses owned by the host, as START-END. Usages are reported and the remap may not touch them.
		#[clap(value_parser, long)]
		pub reserved_zp:     Vec<AddressRange>,
		/// Move a zero page address, as FROM=TO.
		#[clap(value_parser = parse_remap_pair, long)]
		pub remap:           Vec<(u8, u8)>,
		/// Decode undocumented opcodes instead of treating them as data.
		#[clap(long, short = 'i')]
		pub illegal_opcodes: bool,
		/// Memory the relocated driver must not overlap, as NAME:KIND:START-END with KIND one of code, data, table
		/// and free.
		#[clap(value_parser, long)]
		pub block:           Vec<MemoryBlock>,
		/// SID Factory II file whose tables the relocated driver must not overlap.
		#[clap(value_parser, long)]
		pub tables_from:     Option<PathBuf>,
		/// Format to output to.
		///
		/// - prg: Two-byte load address followed by the code.
		///
		/// - raw: Just the code.
		#[clap(value_parser, default_value = "prg", long, short = 'f')]
		pub output_format:   OutputFormat,
		/// Write the output even if some references could not be relocated.
		#[clap(long)]
		pub force:           bool,
		/// Verbosity level to use.
		#[clap(long, short, action = clap::ArgAction::Count)]
		pub verbose:         u8,
	}

	/// How the relocated driver is written.
	#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
	#[repr(u8)]
	pub enum OutputFormat {
		/// Commodore program file.
		Prg,
		/// Plain binary.
		Raw,
	}
}

pub use clap_dependent::*;
