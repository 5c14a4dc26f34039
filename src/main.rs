//! sidreloc binary.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

use std::fs;
use std::path::Path;

use ::log::{LevelFilter, debug, info};
use clap::Parser;
use sidpack::cli::{OutputFormat, SidrelocCli};
use sidpack::pipeline::{RelocationConfig, relocate, table_blocks};
use sidpack::relocator::{ReservedZeroPage, ZeroPageRemap};
use sidpack::sf2file::parser::parse_from_bytes;
use sidpack::{RelocationError, SidImage, pretty_hex};
use time::macros::format_description;

fn read_file(path: &Path) -> Result<Vec<u8>, RelocationError> {
	fs::read(path)
		.map_err(|os_error| RelocationError::FileAccess { os_error, file_name: path.to_string_lossy().into_owned() })
}

fn load_image(arguments: &SidrelocCli) -> Result<SidImage, RelocationError> {
	let bytes = read_file(&arguments.input)?;
	let mut image = match arguments.load_address {
		Some(load_address) => SidImage::from_raw(load_address, bytes),
		None => SidImage::from_prg(&bytes)?,
	};
	if let Some(init) = arguments.init {
		image.init_address = init;
	}
	if let Some(play) = arguments.play {
		image.play_address = play;
	}
	Ok(image)
}

fn build_config(arguments: &SidrelocCli) -> Result<RelocationConfig, RelocationError> {
	let mut config = RelocationConfig::new(arguments.new_base);
	config.hardware = arguments.hardware;
	config.relocatable = arguments.relocatable;
	config.region_end = arguments.region_end;
	config.code_ranges.clone_from(&arguments.code);
	config.remap = ZeroPageRemap::new(arguments.remap.iter().copied())?;
	config.reserved = ReservedZeroPage::new(arguments.reserved_zp.iter().copied());
	config.decoder.illegal_opcodes = arguments.illegal_opcodes;
	config.blocks.clone_from(&arguments.block);
	if let Some(tables_from) = &arguments.tables_from {
		let file = parse_from_bytes(&read_file(tables_from)?)?;
		let tables = table_blocks(&file)?;
		info!("{} table(s) in {}", tables.len(), tables_from.display());
		config.blocks.extend(tables);
	}
	Ok(config)
}

fn main() -> miette::Result<()> {
	human_panic::setup_panic!(human_panic::metadata!());
	miette::set_hook(Box::new(|_| {
		Box::new(
			miette::MietteHandlerOpts::new().unicode(true).context_lines(3).tab_width(4).with_cause_chain().build(),
		)
	}))?;

	let arguments = SidrelocCli::parse();
	let log_level = match arguments.verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		3 .. => LevelFilter::Trace,
	};
	simple_logger::SimpleLogger::new()
		.with_level(log_level)
		.with_local_timestamps()
		.with_timestamp_format(format_description!(version = 2, "[hour]:[minute]:[second]"))
		.init()
		.map_err(|err| miette::miette!("{err}"))?;

	let image = load_image(&arguments)?;
	let config = build_config(&arguments)?;
	debug!("input:\n{}", pretty_hex(&image.code, image.load_address));

	let outcome = relocate(&image, &config)?;
	print!("{}", outcome.summary);
	println!("{} instruction(s) traced, {} byte(s) written", outcome.instructions, outcome.applied.bytes_written);
	for dropped in &outcome.applied.dropped {
		println!("unresolved: {dropped}");
	}
	debug!("output:\n{}", pretty_hex(&outcome.image.code, outcome.image.load_address));

	if outcome.is_complete() || arguments.force {
		let bytes = match arguments.output_format {
			OutputFormat::Prg => outcome.image.to_prg(),
			OutputFormat::Raw => outcome.image.code.clone(),
		};
		fs::write(&arguments.output, bytes).map_err(|os_error| RelocationError::FileAccess {
			os_error,
			file_name: arguments.output.to_string_lossy().into_owned(),
		})?;
		info!("wrote {}", arguments.output.display());
	}
	if outcome.is_complete() {
		Ok(())
	} else {
		Err(RelocationError::UnresolvedReferences { count: outcome.applied.dropped.len() }.into())
	}
}
