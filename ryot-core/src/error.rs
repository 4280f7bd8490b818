use std::path::PathBuf;

use thiserror::Error;

use crate::opcode::Opcode;
use crate::token::Token;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("failed to write artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lex error at byte {position}: unexpected character {found:?}")]
    Lex { position: usize, found: char },
    #[error("unexpected token {token} while parsing an expression")]
    UnexpectedToken { token: Token },
    #[error("parse errors: {}", .0.join("; "))]
    Parse(Vec<String>),
    #[error("program is empty")]
    EmptyProgram,
    #[error("expected first statement to be a pragma")]
    MissingPragma,
    #[error("compiler version mismatch: expected {expected}, got {found}")]
    VersionMismatch { expected: String, found: String },
    #[error("no contract declaration found")]
    NoContract,
    #[error("codegen: unknown binary operator '{0}'")]
    UnknownOperator(String),
    #[error("codehash must be 32 bytes, got {0}")]
    HashLength(usize),
    #[error("operand {index} of {opcode} cannot be serialized: {reason}")]
    Operand {
        opcode: Opcode,
        index: usize,
        reason: String,
    },
    #[error("codegen: {what} count {value} does not fit in a u32 operand")]
    OperandOverflow { what: &'static str, value: usize },
    #[error("malformed bytecode at byte {offset}: {message}")]
    MalformedBytecode { offset: usize, message: String },
    #[error("failed to encode ABI: {0}")]
    Abi(#[from] serde_json::Error),
}
