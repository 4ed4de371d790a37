#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use soc_platform::{Soc, SocConfig};

#[derive(Debug, Parser)]
#[command(about = "Build the SoC model from a configuration and emit its register map")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the C header describing every CSR and interrupt line.
    Header {
        #[command(flatten)]
        system: SystemArgs,

        /// Output path, or `-` for stdout.
        #[arg(long, short, default_value = "csr.h")]
        output: PathBuf,
    },
    /// Print the CSR address map.
    Map {
        #[command(flatten)]
        system: SystemArgs,

        #[arg(long, value_enum, default_value_t = MapFormat::Text)]
        format: MapFormat,
    },
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Debug, Args)]
struct SystemArgs {
    /// JSON configuration; fields left out take their default value.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Boot flash image.
    #[arg(long)]
    flash: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MapFormat {
    Text,
    Json,
}

impl SystemArgs {
    fn build(&self) -> Result<Soc> {
        let config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                SocConfig::from_json(&json)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => SocConfig::default(),
        };
        let flash = match &self.flash {
            Some(path) => fs::read(path)
                .with_context(|| format!("failed to read flash image {}", path.display()))?,
            None => Vec::new(),
        };
        Soc::new(config, flash).context("invalid system configuration")
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if path == Path::new("-") {
        io::stdout().write_all(contents.as_bytes())?;
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote header");
    Ok(())
}

fn print_map(soc: &Soc, out: &mut impl Write) -> io::Result<()> {
    let map = soc.address_map();
    for bank in &map.banks {
        writeln!(out, "{:2} {:<12} {:#010x}", bank.index, bank.name, bank.base)?;
        for reg in &bank.registers {
            writeln!(
                out,
                "   {:#010x} {:<16} {:>2} bit{} {}",
                reg.address,
                reg.name,
                reg.width,
                if reg.width == 1 { " " } else { "s" },
                reg.access.mnemonic()
            )?;
        }
    }
    let mut lines = soc.interrupts().lines().peekable();
    if lines.peek().is_some() {
        writeln!(out)?;
        for (name, line) in lines {
            writeln!(out, "irq {line:2} {name}")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Header { system, output } => {
            let soc = system.build()?;
            write_output(&output, &soc.csr_header())?;
        }
        Command::Map { system, format } => {
            let soc = system.build()?;
            let mut stdout = io::stdout().lock();
            match format {
                MapFormat::Text => print_map(&soc, &mut stdout)?,
                MapFormat::Json => {
                    serde_json::to_writer_pretty(&mut stdout, soc.address_map())?;
                    writeln!(stdout)?;
                }
            }
        }
        Command::Config => {
            println!("{}", SocConfig::default().to_json()?);
        }
    }
    Ok(())
}
