use miette::Diagnostic;
use thiserror::Error;

use crate::AddressRange;
use crate::relocator::RemapConflictReason;

/// All errors that relocating a driver can report to the user.
#[derive(Error, Debug, Diagnostic)]
#[allow(clippy::module_name_repetitions, missing_docs)]
pub enum RelocationError {
	#[error("File \"{file_name}\" could not be accessed")]
	#[diagnostic(code(sidpack::file_access), severity(Error))]
	FileAccess {
		#[source]
		os_error:  std::io::Error,
		file_name: String,
	},

	#[error("The image contains no code")]
	#[diagnostic(
		code(sidpack::empty_image),
		severity(Error),
		help("A PRG file needs a two-byte load address followed by at least one byte.")
	)]
	EmptyImage,

	#[error("{length} bytes loaded at ${load_address:04X} do not fit into the 64K address space")]
	#[diagnostic(code(sidpack::image_too_large), severity(Error))]
	ImageTooLarge { load_address: u16, length: usize },

	#[error("Relocated region of {length} bytes at ${new_base:04X} would extend past $FFFF")]
	#[diagnostic(code(sidpack::image_does_not_fit), severity(Error), help("Choose a lower base address."))]
	ImageDoesNotFit { new_base: u16, length: u32 },

	#[error("The relocation region must contain the whole image ({image}), but ends at ${region_end:04X}")]
	#[diagnostic(code(sidpack::region_too_small), severity(Error))]
	RegionTooSmall { image: AddressRange, region_end: u16 },

	#[error("Relocatable range {relocatable} overlaps hardware range {hardware}")]
	#[diagnostic(
		code(sidpack::overlapping_regions),
		severity(Error),
		help("An address can't be both part of the driver and a hardware register; shrink one of the two ranges.")
	)]
	OverlappingRegions { relocatable: AddressRange, hardware: AddressRange },

	#[error("Zero page remap ${from:02X} -> ${to:02X} is not allowed: {reason}")]
	#[diagnostic(code(sidpack::remap_conflict), severity(Error))]
	RemapConflict { from: u8, to: u8, reason: RemapConflictReason },

	#[error("Patch site at offset {offset:#06x} holds {found:02X?}, expected {expected:02X?}")]
	#[diagnostic(
		code(sidpack::stale_patch_site),
		severity(Error),
		help("The buffer changed since it was scanned, or the relocation was already applied to it.")
	)]
	StalePatchSite { offset: usize, expected: Vec<u8>, found: Vec<u8> },

	#[error("Patch site at offset {offset:#06x} is outside the {length}-byte buffer")]
	#[diagnostic(code(sidpack::buffer_length_mismatch), severity(Error))]
	BufferLengthMismatch { offset: usize, length: usize },

	#[error("{count} relocatable reference(s) could not be resolved inside the relocation region")]
	#[diagnostic(
		code(sidpack::unresolved_references),
		severity(Error),
		help(
			"Every reference listed above points into the relocatable range but outside the region that moves. Extend \
			 the region or narrow the relocatable range, then retry."
		)
	)]
	UnresolvedReferences { count: usize },

	#[error("The relocated layout has {count} overlap(s)")]
	#[diagnostic(code(sidpack::layout_conflicts), severity(Error), help("{report}"))]
	LayoutConflicts { count: usize, report: String },

	#[error("Invalid memory block `{block}`: {reason}")]
	#[diagnostic(code(sidpack::invalid_block), severity(Error), help("Blocks are written as NAME:KIND:START-END."))]
	InvalidBlock { block: String, reason: String },

	#[error(transparent)]
	#[diagnostic(code(sidpack::container), severity(Error))]
	Container(#[from] sf2file::FormatError),
}
