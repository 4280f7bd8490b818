//! Core compiler pipeline for the Ryot contract language.
//!
//! The pipeline is:
//!
//!   source .ry
//!     -> lexer    (tokens)
//!     -> parser   (AST + diagnostics)
//!     -> codegen  (instruction stream + ABI)
//!     -> bytecode (RYC disassembly, RYBC container)
//!
//! The CLI depends on this crate rather than reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

// ---------------------------------------------------------------------
// Back-end: instruction set, code generation and serialization
// ---------------------------------------------------------------------

pub mod opcode;
pub mod codegen;
pub mod abi;
pub mod bytecode;

// ---------------------------------------------------------------------
// Orchestration and source discovery
// ---------------------------------------------------------------------

pub mod compiler;
pub mod sources;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{ArtifactKind, Artifacts, COMPILER_VERSION, CompiledContract, compile};
pub use error::CoreError;
pub use sources::{SourceFile, load_sources};
