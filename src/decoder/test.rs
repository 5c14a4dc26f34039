use rstest::rstest;

use super::trace::trace;
use super::*;
use crate::{AddressRange, VariantName};

const DEFAULT: DecoderOptions = DecoderOptions { illegal_opcodes: false };
const ILLEGAL: DecoderOptions = DecoderOptions { illegal_opcodes: true };

#[test]
fn opcode_table_sizes() {
	assert_eq!(OPCODE_TABLE.iter().filter(|opcode| !opcode.illegal).count(), 151);
	assert_eq!(OPCODE_TABLE[0xAD], Opcode {
		mnemonic:        Mnemonic::Lda,
		addressing_mode: AddressingMode::Absolute,
		illegal:         false,
	});
	assert_eq!(OPCODE_TABLE[0x6C].addressing_mode, AddressingMode::Indirect);
	assert_eq!(OPCODE_TABLE[0xA7].mnemonic, Mnemonic::Lax);
	assert_eq!(OPCODE_TABLE[0x20].size(), 3);
	assert_eq!(OPCODE_TABLE[0x60].size(), 1);
}

#[test]
fn mnemonic_names() {
	assert_eq!(Mnemonic::Lda.variant_name(), "LDA");
	assert_eq!("jsr".parse::<Mnemonic>(), Ok(Mnemonic::Jsr));
	assert_eq!("SaX".parse::<Mnemonic>(), Ok(Mnemonic::Sax));
	assert!("mov".parse::<Mnemonic>().is_err());
	assert_eq!(Mnemonic::Byte.to_string(), ".byte");
}

#[test]
fn load_and_store_to_sid() {
	let instructions = decode_range(&[0xA9, 0x00, 0x8D, 0x00, 0xD4], 0x1000, 0, 5, DEFAULT);
	assert_eq!(instructions.len(), 2);
	assert_eq!(instructions[0].mnemonic, Mnemonic::Lda);
	assert_eq!(instructions[0].addressing_mode, AddressingMode::Immediate);
	assert_eq!(instructions[0].operand(), &[0x00]);
	assert_eq!(instructions[1].address, 0x1002);
	assert_eq!(instructions[1].offset, 2);
	assert_eq!(instructions[1].mnemonic, Mnemonic::Sta);
	assert_eq!(instructions[1].absolute_target(), Some(0xD400));
	assert_eq!(instructions[1].to_string(), "STA $D400");
}

#[rstest]
#[case::implied(&[0x60], "RTS")]
#[case::accumulator(&[0x0A], "ASL A")]
#[case::immediate(&[0xA2, 0x1F], "LDX #$1F")]
#[case::zero_page(&[0x85, 0xFB], "STA $FB")]
#[case::zero_page_x(&[0xB5, 0x10], "LDA $10,X")]
#[case::zero_page_y(&[0xB6, 0x10], "LDX $10,Y")]
#[case::absolute_x(&[0xBD, 0x34, 0x12], "LDA $1234,X")]
#[case::absolute_y(&[0x99, 0x00, 0xD4], "STA $D400,Y")]
#[case::indirect(&[0x6C, 0xFE, 0x0F], "JMP ($0FFE)")]
#[case::indexed_indirect(&[0xA1, 0x20], "LDA ($20,X)")]
#[case::indirect_indexed(&[0xB1, 0xFB], "LDA ($FB),Y")]
#[case::branch_forward(&[0xD0, 0x02], "BNE $1004")]
#[case::branch_backward(&[0x10, 0xFE], "BPL $1000")]
#[case::data(&[0xFF], ".byte $FF")]
fn instruction_display(#[case] bytes: &[u8], #[case] expected: &str) {
	let instruction = decode_one(bytes, 0x1000, 0, DEFAULT).unwrap();
	assert_eq!(instruction.to_string(), expected);
	assert_eq!(usize::from(instruction.size), bytes.len());
}

#[test]
fn branch_targets_wrap() {
	let forward = decode_one(&[0xD0, 0x05], 0xFFFE, 0, DEFAULT).unwrap();
	assert_eq!(forward.branch_target(), Some(0x0005));
	assert_eq!(forward.flow_target(), Some(0x0005));
	let backward = decode_one(&[0xF0, 0x80], 0x0010, 0, DEFAULT).unwrap();
	assert_eq!(backward.branch_target(), Some(0xFF92));
	assert_eq!(decode_one(&[0xEA], 0, 0, DEFAULT).unwrap().branch_target(), None);
}

#[test]
fn illegal_opcodes() {
	let bytes = [0xA7, 0x10];
	let data = decode_one(&bytes, 0x1000, 0, DEFAULT).unwrap();
	assert!(!data.is_code());
	assert_eq!(data.size, 1);
	assert_eq!(data.anomaly, Some(DecodeAnomaly::IllegalOpcode));
	assert_eq!(data.zero_page_address(), None);

	let lax = decode_one(&bytes, 0x1000, 0, ILLEGAL).unwrap();
	assert!(lax.is_code());
	assert!(lax.is_illegal());
	assert_eq!(lax.to_string(), "LAX $10");
	assert_eq!(lax.zero_page_address(), Some(0x10));

	// the CPU halts on these, so they are never code
	let jam = decode_one(&[0x02], 0x1000, 0, ILLEGAL).unwrap();
	assert_eq!(jam.anomaly, Some(DecodeAnomaly::IllegalOpcode));
}

#[test]
fn truncated_instructions() {
	let instructions = decode_range(&[0xEA, 0x8D, 0x00], 0x1000, 0, 3, DEFAULT);
	assert_eq!(instructions.len(), 3);
	assert_eq!(instructions[1].anomaly, Some(DecodeAnomaly::TruncatedInstruction { size: 3 }));
	assert_eq!(instructions[1].absolute_target(), None);
	assert_eq!(instructions[2].mnemonic, Mnemonic::Brk);
	assert!(instructions[2].ends_flow());
}

#[test]
fn range_end_truncates() {
	// the JSR needs three bytes, but only two are in the range
	let instructions = decode_range(&[0xEA, 0x20, 0x00, 0x10], 0x1000, 0, 3, DEFAULT);
	assert_eq!(instructions.iter().map(|instruction| usize::from(instruction.size)).sum::<usize>(), 3);
	assert!(!instructions[1].is_code());
	assert!(decode_range(&[0xEA], 0, 5, 3, DEFAULT).is_empty());
	assert_eq!(decode_one(&[0xEA], 0, 1, DEFAULT), None);
}

fn pseudo_random_bytes(seed: u32, length: usize) -> Vec<u8> {
	let mut state = seed;
	(0 .. length)
		.map(|_| {
			state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
			state.to_be_bytes()[1]
		})
		.collect()
}

#[rstest]
fn decoded_sizes_cover_range(
	#[values(1, 7, 42, 1337)] seed: u32,
	#[values(0, 1, 2, 3, 100, 1000)] length: usize,
	#[values(DEFAULT, ILLEGAL)] options: DecoderOptions,
) {
	let bytes = pseudo_random_bytes(seed, length);
	let instructions = decode_range(&bytes, 0x1000, 0, length, options);
	assert_eq!(instructions.iter().map(|instruction| usize::from(instruction.size)).sum::<usize>(), length);
	for pair in instructions.windows(2) {
		assert_eq!(pair[0].end_offset(), pair[1].offset);
	}
}

#[test]
fn every_opcode_decodes() {
	for opcode in 0 ..= 0xFF {
		let bytes = [opcode, 0x34, 0x12];
		let instruction = decode_one(&bytes, 0x2000, 0, ILLEGAL).unwrap();
		if instruction.is_code() {
			assert_eq!(instruction.size, OPCODE_TABLE[usize::from(opcode)].size());
			assert_eq!(instruction.operand().len(), usize::from(instruction.size) - 1);
		} else {
			assert_eq!(instruction.size, 1);
		}
	}
}

#[test]
fn tracing_follows_execution() {
	#[rustfmt::skip]
	let code = [
		0x20, 0x08, 0x10, // $1000 JSR $1008
		0x4C, 0x00, 0x10, // $1003 JMP $1000
		0x8D, 0x00,       // $1006 unreachable
		0xA9, 0x00,       // $1008 LDA #$00
		0xF0, 0x02,       // $100A BEQ $100E
		0x60,             // $100C RTS
		0xFF,             // $100D unreachable
		0x8D, 0x18, 0xD4, // $100E STA $D418
		0x60,             // $1011 RTS
	];
	let map = trace(&code, 0x1000, &[0x1000, 0, 0x3000], &[], DEFAULT);
	let addresses: Vec<u16> = map.instructions().map(|instruction| instruction.address).collect();
	assert_eq!(addresses, vec![0x1000, 0x1003, 0x1008, 0x100A, 0x100C, 0x100E, 0x1011]);
	assert_eq!(map.covered_bytes(), 15);
	assert!(!map.is_code_byte(6));
	assert!(!map.is_code_byte(7));
	assert!(!map.is_code_byte(13));
	assert_eq!(map.instruction_at(0x0E).map(Instruction::absolute_target), Some(Some(0xD418)));
}

#[test]
fn tracing_stops_at_data() {
	// BNE into the operand of the LDA: the overlapping instruction is not recorded
	let code = [0xAD, 0x60, 0x20, 0xD0, 0xFC, 0x60];
	let map = trace(&code, 0x1000, &[0x1000], &[], DEFAULT);
	assert_eq!(map.len(), 3);
	assert!(map.instruction_at(1).is_none());
	assert!(trace(&code, 0x1000, &[], &[], DEFAULT).is_empty());
}

#[test]
fn explicit_code_ranges() {
	let code = [0x60, 0xAD, 0x00, 0x20, 0x8D];
	let traced = trace(&code, 0x1000, &[0x1000], &[], DEFAULT);
	assert_eq!(traced.len(), 1);

	let ranges = [AddressRange::new(0x1001, 0x1004), AddressRange::new(0x4000, 0x4001)];
	let with_range = trace(&code, 0x1000, &[0x1000], &ranges, DEFAULT);
	assert_eq!(with_range.len(), 2);
	assert_eq!(with_range.instruction_at(1).and_then(Instruction::absolute_target), Some(0x2000));
	// the truncated STA at the end is data
	assert!(!with_range.is_code_byte(4));
}
