use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use ryot_core::{ArtifactKind, CompiledContract, compile, load_sources};

/// Compile Ryot contracts into ABI, RYC and RYBC artifacts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file or directory of `.ry` files (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = "artifacts",
        help = "Directory the artifacts are written to"
    )]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Emit::All, help = "Artifacts to write")]
    emit: Emit,

    #[arg(long, help = "Print the RYC disassembly to stdout")]
    print: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    All,
    Abi,
    Ryc,
    Rybc,
}

impl Emit {
    fn kinds(self) -> &'static [ArtifactKind] {
        match self {
            Emit::All => &ArtifactKind::ALL,
            Emit::Abi => &[ArtifactKind::Abi],
            Emit::Ryc => &[ArtifactKind::Ryc],
            Emit::Rybc => &[ArtifactKind::Rybc],
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    match &cli.input {
        Some(path) if path.is_dir() => {
            let sources = load_sources(path)
                .with_context(|| format!("failed to read sources under {}", path.display()))?;
            if sources.is_empty() {
                anyhow::bail!("no .ry files found under {}", path.display());
            }
            for source in sources {
                let out_dir = cli.out_dir.join(source.artifact_dir());
                let compiled = compile(&source.contents)
                    .with_context(|| format!("failed to compile {}", source.path.display()))?;
                emit(&cli, &compiled, &out_dir)?;
            }
        }
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            let compiled = compile(&source)
                .with_context(|| format!("failed to compile {}", path.display()))?;
            emit(&cli, &compiled, &cli.out_dir)?;
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read source from stdin")?;
            let compiled = compile(&buffer).context("failed to compile stdin")?;
            emit(&cli, &compiled, &cli.out_dir)?;
        }
    }
    Ok(())
}

fn emit(cli: &Cli, compiled: &CompiledContract, out_dir: &Path) -> Result<()> {
    let artifacts = compiled
        .artifacts()
        .with_context(|| format!("failed to serialize contract {}", compiled.contract_name))?;
    let written = artifacts
        .write_to(out_dir, cli.emit.kinds())
        .with_context(|| format!("failed to write artifacts to {}", out_dir.display()))?;

    if cli.print {
        print!("{}", artifacts.ryc);
    }
    info!(
        "{}: wrote {} artifacts to {}",
        compiled.contract_name,
        written.len(),
        out_dir.display()
    );
    println!(
        "Compiled {} ({} instructions) -> {}",
        compiled.contract_name,
        compiled.instructions.len(),
        out_dir.display()
    );
    Ok(())
}
