//! cpu16 - CLI entry point
//!
//! - `cpu16 run [image]` runs a program image (the Fibonacci demo by default)
//! - `cpu16 disasm [image]` lists a program image as mnemonics

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use cpu16::memory::parse::parse_image;
use cpu16::memory::Word;
use cpu16::processor::disassemble;
use cpu16::{demo, MachineConfig, Processor};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(name = "cpu16")]
#[command(version)]
#[command(about = "Emulator for a small 16-bit Harvard CPU")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Program image to execute; the Fibonacci demo if omitted
        image: Option<PathBuf>,
        /// Pause after every instruction, in milliseconds
        #[arg(short, long, default_value = "0")]
        delay_ms: u64,
        /// Register file size, PC and flags included (5 to 16)
        #[arg(short, long, default_value = "5")]
        registers: usize,
        /// Stop after this many cycles even if the program has not halted
        #[arg(short, long)]
        max_cycles: Option<u64>,
    },
    /// List a program image as mnemonics
    Disasm {
        /// Program image to list; the Fibonacci demo if omitted
        image: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .wrap_err("failed to install logger")?; // logging

    match cli.command {
        Commands::Run {
            image,
            delay_ms,
            registers,
            max_cycles,
        } => {
            let config = MachineConfig::default()
                .with_register_count(registers)
                .with_cycle_delay(Duration::from_millis(delay_ms));
            run(image.as_deref(), config, max_cycles)
        }
        Commands::Disasm { image } => disasm(image.as_deref()),
    }
}

fn load_image(path: Option<&Path>) -> Result<Vec<Word>> {
    let path = match path {
        Some(path) => path,
        None => return Ok(demo::FIBONACCI.to_vec()),
    };

    let data = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    parse_image(&data).map_err(|errors| {
        eyre!(
            "{} error(s) in {}:\n{}",
            errors.len(),
            path.display(),
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        )
    })
}

fn run(path: Option<&Path>, config: MachineConfig, max_cycles: Option<u64>) -> Result<()> {
    let words = load_image(path)?;
    let mut cpu = Processor::new(config)?;
    cpu.load(&words)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match max_cycles {
        Some(max_cycles) => cpu.execute_limited(&mut out, max_cycles),
        None => cpu.execute_until_halt(&mut out),
    };
    result.wrap_err_with(|| format!("machine faulted after {} cycles", cpu.cycles()))?;
    out.flush()?;

    Ok(())
}

fn disasm(path: Option<&Path>) -> Result<()> {
    let words = load_image(path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (address, instruction) in disassemble(&words) {
        writeln!(
            out,
            "{:04X}:  {:04X} {:04X}  {}",
            address, instruction.word, instruction.literal, instruction
        )?;
    }

    Ok(())
}
