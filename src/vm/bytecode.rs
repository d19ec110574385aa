//! SVMB bytecode container (spec.md §4.9, §6.4): magic `SVMB`, varint
//! major/minor version, varint body length, then a stream of
//! `(opcode: u8, operand: varint)` pairs.

use super::opcode::{Instruction, Opcode};
use super::VmError;

const MAGIC: &[u8; 4] = b"SVMB";

fn write_varint(value: u64, out: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, VmError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| VmError::InvalidBytecode("truncated varint".to_string()))?;
        *pos += 1;
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(VmError::InvalidBytecode("varint too long".to_string()));
        }
    }
}

/// Encodes `program` as an SVMB byte stream with the given version.
pub fn encode(program: &[Instruction], major: u16, minor: u16) -> Vec<u8> {
    let mut body = Vec::new();
    for instr in program {
        body.push(instr.op.tag());
        write_varint(u64::from(instr.operand), &mut body);
    }

    let mut out = Vec::with_capacity(MAGIC.len() + body.len() + 8);
    out.extend_from_slice(MAGIC);
    write_varint(u64::from(major), &mut out);
    write_varint(u64::from(minor), &mut out);
    write_varint(body.len() as u64, &mut out);
    out.extend_from_slice(&body);
    out
}

/// Decodes an SVMB byte stream, returning `(major, minor, program)`.
pub fn decode(bytes: &[u8]) -> Result<(u16, u16, Vec<Instruction>), VmError> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(VmError::InvalidBytecode("missing SVMB magic".to_string()));
    }
    let mut pos = MAGIC.len();
    let major = read_varint(bytes, &mut pos)? as u16;
    let minor = read_varint(bytes, &mut pos)? as u16;
    let body_len = read_varint(bytes, &mut pos)? as usize;
    let body_start = pos;
    if bytes.len() < body_start + body_len {
        return Err(VmError::InvalidBytecode("body shorter than declared length".to_string()));
    }
    let body = &bytes[body_start..body_start + body_len];

    let mut program = Vec::new();
    let mut i = 0usize;
    while i < body.len() {
        let tag = body[i];
        i += 1;
        let op = Opcode::from_tag(tag).ok_or_else(|| VmError::InvalidBytecode(format!("unknown opcode tag {tag}")))?;
        let operand = read_varint(body, &mut i)? as u32;
        program.push(Instruction::new(op, operand));
    }
    Ok((major, minor, program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fast_path_program() {
        let program = vec![
            Instruction::new(Opcode::PushConst, 0),
            Instruction::bare(Opcode::StoreAnswer),
            Instruction::bare(Opcode::Halt),
        ];
        let bytes = encode(&program, 1, 0);
        let (major, minor, decoded) = decode(&bytes).unwrap();
        assert_eq!((major, minor), (1, 0));
        assert_eq!(decoded, program);
    }

    #[test]
    fn round_trips_large_operand() {
        let program = vec![Instruction::new(Opcode::PushConst, 300_000), Instruction::bare(Opcode::Halt)];
        let bytes = encode(&program, 1, 0);
        let (_, _, decoded) = decode(&bytes).unwrap();
        assert_eq!(decoded[0].operand, 300_000);
    }

    #[test]
    fn rejects_missing_magic() {
        assert!(decode(b"XXXX").is_err());
    }

    #[test]
    fn rejects_unknown_opcode_tag() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        write_varint(1, &mut bytes);
        write_varint(0, &mut bytes);
        write_varint(2, &mut bytes);
        bytes.push(255);
        bytes.push(0);
        assert!(decode(&bytes).is_err());
    }
}
