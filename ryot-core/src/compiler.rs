use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::abi::{self, AbiFunction};
use crate::ast::{Program, Statement};
use crate::bytecode::{self, HASH_LEN};
use crate::codegen::Generator;
use crate::error::CoreError;
use crate::opcode::Instruction;
use crate::parser::parse;

/// Version a source's `pragma` must name.
pub const COMPILER_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Abi,
    Ryc,
    Rybc,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Abi, ArtifactKind::Ryc, ArtifactKind::Rybc];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Abi => "abi.json",
            ArtifactKind::Ryc => "bytecode.ryc",
            ArtifactKind::Rybc => "bytecode.rybc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    pub version: String,
    pub contract_name: String,
    pub instructions: Vec<Instruction>,
    pub abi: Vec<AbiFunction>,
    pub source_hash: [u8; HASH_LEN],
}

/// All three artifacts, rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub abi_json: String,
    pub ryc: String,
    pub rybc: Vec<u8>,
}

impl Artifacts {
    fn bytes(&self, kind: ArtifactKind) -> &[u8] {
        match kind {
            ArtifactKind::Abi => self.abi_json.as_bytes(),
            ArtifactKind::Ryc => self.ryc.as_bytes(),
            ArtifactKind::Rybc => &self.rybc,
        }
    }

    /// Write the selected artifacts into `dir`, creating it if needed.
    pub fn write_to(
        &self,
        dir: impl AsRef<Path>,
        kinds: &[ArtifactKind],
    ) -> Result<Vec<PathBuf>, CoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| CoreError::ArtifactIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let path = dir.join(kind.file_name());
            fs::write(&path, self.bytes(kind)).map_err(|source| CoreError::ArtifactIo {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl CompiledContract {
    pub fn source_hash_hex(&self) -> String {
        hex::encode(self.source_hash)
    }

    pub fn abi_json(&self) -> Result<String, CoreError> {
        abi::to_json(&self.abi)
    }

    pub fn ryc(&self) -> String {
        bytecode::render_ryc(&self.contract_name, &self.source_hash_hex(), &self.instructions)
    }

    pub fn rybc(&self) -> Result<Vec<u8>, CoreError> {
        bytecode::encode_rybc(&self.instructions, &self.source_hash)
    }

    pub fn artifacts(&self) -> Result<Artifacts, CoreError> {
        Ok(Artifacts {
            abi_json: self.abi_json()?,
            ryc: self.ryc(),
            rybc: self.rybc()?,
        })
    }

    /// Write `abi.json`, `bytecode.ryc` and `bytecode.rybc` into `dir`.
    /// Nothing touches the disk unless all three serialize.
    pub fn write_artifacts(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CoreError> {
        self.artifacts()?.write_to(dir, &ArtifactKind::ALL)
    }
}

pub fn source_hash(source: &str) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.finalize().into()
}

pub fn compile(source: &str) -> Result<CompiledContract, CoreError> {
    let program = parse(source)?;
    check_program(&program)?;

    let mut generator = Generator::new();
    generator.generate(&program)?;
    let (instructions, abi, contract_name) = generator.into_parts();
    let contract_name = contract_name.ok_or(CoreError::NoContract)?;

    info!(
        "compiled contract {contract_name}: {} instructions, {} ABI entries",
        instructions.len(),
        abi.len()
    );
    Ok(CompiledContract {
        version: COMPILER_VERSION.to_string(),
        contract_name,
        instructions,
        abi,
        source_hash: source_hash(source),
    })
}

fn check_program(program: &Program) -> Result<(), CoreError> {
    let Some(first) = program.statements.first() else {
        return Err(CoreError::EmptyProgram);
    };
    let Statement::Pragma { version, .. } = first else {
        return Err(CoreError::MissingPragma);
    };
    if version != COMPILER_VERSION {
        return Err(CoreError::VersionMismatch {
            expected: COMPILER_VERSION.to_string(),
            found: version.clone(),
        });
    }
    if !program
        .statements
        .iter()
        .any(|statement| matches!(statement, Statement::Class { .. }))
    {
        return Err(CoreError::NoContract);
    }
    Ok(())
}
