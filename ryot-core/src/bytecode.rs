//! RYC (text disassembly) and RYBC (binary container) serializers.
//!
//! RYBC layout:
//!
//! ```text
//! "RYBC" | major u8 | minor u8 | code hash [u8; 32] | instruction*
//! instruction = opcode u8 | operand*
//! ```
//!
//! Operands follow the opcode's fixed signature: `u64` as 8 bytes
//! big-endian, `u32` as 4 bytes big-endian, `bool` as one byte and `str` as
//! its UTF-8 bytes followed by a NUL terminator.

use crate::error::CoreError;
use crate::opcode::{Instruction, Opcode, Operand, OperandKind};

pub const MAGIC: &[u8; 4] = b"RYBC";
pub const VERSION_MAJOR: u8 = 0x01;
pub const VERSION_MINOR: u8 = 0x00;
pub const HASH_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 2 + HASH_LEN;

/// A decoded RYBC container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode {
    pub major: u8,
    pub minor: u8,
    pub code_hash: [u8; HASH_LEN],
    pub instructions: Vec<Instruction>,
}

/// Render the human-readable disassembly.
pub fn render_ryc(contract_name: &str, code_hash_hex: &str, instructions: &[Instruction]) -> String {
    let mut out = format!(
        "; ABI: {contract_name}\n; Bytecode disassembly\n; Source code hash: 0x{code_hash_hex}\n\n"
    );
    for instruction in instructions {
        out.push_str(&instruction.rendered);
        out.push('\n');
    }
    out
}

/// Serialize instructions into a RYBC container. Nothing is produced unless
/// every instruction can be encoded.
pub fn encode_rybc(instructions: &[Instruction], code_hash: &[u8]) -> Result<Vec<u8>, CoreError> {
    if code_hash.len() != HASH_LEN {
        return Err(CoreError::HashLength(code_hash.len()));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + instructions.len() * 4);
    out.extend_from_slice(MAGIC);
    out.push(VERSION_MAJOR);
    out.push(VERSION_MINOR);
    out.extend_from_slice(code_hash);

    for instruction in instructions {
        encode_instruction(&mut out, instruction)?;
    }
    Ok(out)
}

fn encode_instruction(out: &mut Vec<u8>, instruction: &Instruction) -> Result<(), CoreError> {
    let opcode = instruction.opcode;
    let signature = opcode.operands();
    if instruction.args.len() != signature.len() {
        return Err(CoreError::Operand {
            opcode,
            index: instruction.args.len().min(signature.len()),
            reason: format!(
                "expected {} operands, got {}",
                signature.len(),
                instruction.args.len()
            ),
        });
    }

    out.push(opcode.byte());
    for (index, (arg, &kind)) in instruction.args.iter().zip(signature).enumerate() {
        match (arg, kind) {
            (Operand::U64(value), OperandKind::U64) => out.extend_from_slice(&value.to_be_bytes()),
            (Operand::U32(value), OperandKind::U32) => out.extend_from_slice(&value.to_be_bytes()),
            (Operand::Bool(value), OperandKind::Bool) => out.push(u8::from(*value)),
            (Operand::Str(value), OperandKind::Str) => {
                if value.as_bytes().contains(&0) {
                    return Err(CoreError::Operand {
                        opcode,
                        index,
                        reason: "string contains a NUL byte".to_string(),
                    });
                }
                out.extend_from_slice(value.as_bytes());
                out.push(0);
            }
            (arg, kind) => {
                return Err(CoreError::Operand {
                    opcode,
                    index,
                    reason: format!("expected {kind}, got {}", arg.kind()),
                });
            }
        }
    }
    Ok(())
}

/// Read a RYBC container back, re-rendering every instruction.
pub fn decode_rybc(bytes: &[u8]) -> Result<Bytecode, CoreError> {
    let mut reader = Reader { bytes, offset: 0 };

    let magic = reader.take(MAGIC.len())?;
    if magic != MAGIC {
        return Err(reader.error_at(0, "missing RYBC magic"));
    }
    let major = reader.u8()?;
    let minor = reader.u8()?;
    if major != VERSION_MAJOR {
        return Err(reader.error_at(4, format!("unsupported major version {major}")));
    }
    let mut code_hash = [0u8; HASH_LEN];
    code_hash.copy_from_slice(reader.take(HASH_LEN)?);

    let mut instructions = Vec::new();
    while !reader.is_empty() {
        let start = reader.offset;
        let byte = reader.u8()?;
        let opcode = Opcode::from_byte(byte)
            .ok_or_else(|| reader.error_at(start, format!("unknown opcode 0x{byte:02X}")))?;
        let mut args = Vec::with_capacity(opcode.operands().len());
        for &kind in opcode.operands() {
            args.push(reader.operand(kind)?);
        }
        instructions.push(Instruction::new(opcode, args));
    }

    Ok(Bytecode {
        major,
        minor,
        code_hash,
        instructions,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> CoreError {
        CoreError::MalformedBytecode {
            offset,
            message: message.into(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CoreError> {
        let end = self.offset + len;
        let Some(slice) = self.bytes.get(self.offset..end) else {
            return Err(self.error_at(
                self.offset,
                format!("unexpected end of input, needed {len} bytes"),
            ));
        };
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CoreError> {
        Ok(self.take(1)?[0])
    }

    fn operand(&mut self, kind: OperandKind) -> Result<Operand, CoreError> {
        let operand = match kind {
            OperandKind::U64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(self.take(8)?);
                Operand::U64(u64::from_be_bytes(buf))
            }
            OperandKind::U32 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(self.take(4)?);
                Operand::U32(u32::from_be_bytes(buf))
            }
            OperandKind::Bool => {
                let start = self.offset;
                match self.u8()? {
                    0 => Operand::Bool(false),
                    1 => Operand::Bool(true),
                    other => return Err(self.error_at(start, format!("invalid bool byte {other}"))),
                }
            }
            OperandKind::Str => {
                let start = self.offset;
                let bytes = self.bytes;
                let rest = &bytes[start..];
                let Some(len) = rest.iter().position(|&b| b == 0) else {
                    return Err(self.error_at(start, "unterminated string operand"));
                };
                let text = std::str::from_utf8(&rest[..len])
                    .map_err(|_| self.error_at(start, "string operand is not UTF-8"))?
                    .to_string();
                self.offset += len + 1;
                Operand::Str(text)
            }
        };
        Ok(operand)
    }
}
