//! Decoding helper functions.
//! Trace lines are binary text:
//! | node (2) | cpu (1) | unused (2) | opcode (6) | rs (5) | rt (5) | offset (16) |

use std::ops::Range;

use super::Instruction;

const NODE: Range<usize> = 0..2;
const CPU: Range<usize> = 2..3;
const OPCODE: Range<usize> = 5..11;
const RS: Range<usize> = 11..16;
const RT: Range<usize> = 16..21;
const OFFSET: Range<usize> = 21..37;

/// Minimum length of a trace line
pub const LINE_WIDTH: usize = OFFSET.end;

/// Bytes per word; trace offsets are byte offsets
pub const WORD_BYTES: u32 = 4;

/// Extracts a binary field from the line
fn get_field(line: &str, range: Range<usize>, name: &str) -> Result<u32, String> {
    let bits = line
        .get(range.clone())
        .ok_or_else(|| format!("line too short for {} field", name))?;
    if !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(format!(
            "{} field '{}' at columns {}..{} is not binary",
            name, bits, range.start, range.end
        ));
    }
    u32::from_str_radix(bits, 2).map_err(|e| format!("{} field: {}", name, e))
}

/// Parses a trace line into an instruction
pub fn parse(line: &str) -> Result<Instruction, String> {
    let line = line.trim();
    if line.len() < LINE_WIDTH {
        return Err(format!(
            "expected at least {} columns, found {}",
            LINE_WIDTH,
            line.len()
        ));
    }

    Ok(Instruction {
        node: get_field(line, NODE, "node")? as usize,
        cpu: get_field(line, CPU, "cpu")? as usize,
        opcode: get_field(line, OPCODE, "opcode")?.into(),
        rs: get_field(line, RS, "rs")? as u8,
        rt: get_field(line, RT, "rt")? as u8,
        offset: get_field(line, OFFSET, "offset")? / WORD_BYTES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;

    #[test]
    fn test_parse_load() {
        let inst = parse("1010010001100000100010000000001010100").unwrap();
        assert_eq!(inst.node, 2);
        assert_eq!(inst.cpu, 1);
        assert_eq!(inst.opcode, Opcode::Load);
        assert_eq!(inst.rs, 0);
        assert_eq!(inst.rt, 0b10001);
        // Byte offset 84 is word 21
        assert_eq!(inst.offset, 21);
    }

    #[test]
    fn test_parse_store() {
        let inst = parse("0000010101100000100100000000000001000").unwrap();
        assert_eq!(inst.node, 0);
        assert_eq!(inst.cpu, 0);
        assert_eq!(inst.opcode, Opcode::Store);
        assert_eq!(inst.rt, 0b10010);
        assert_eq!(inst.offset, 2);
    }

    #[test]
    fn test_unused_columns_are_ignored() {
        let inst = parse("110xx10001100000100010000000011111100").unwrap();
        assert_eq!(inst.node, 3);
        assert_eq!(inst.offset, 63);
    }

    #[test]
    fn test_rejects_short_line() {
        assert!(parse("0001").is_err());
    }

    #[test]
    fn test_rejects_non_binary_field() {
        let err = parse("0200010001100000100010000000000001000").unwrap_err();
        assert!(err.contains("node"));
    }
}
