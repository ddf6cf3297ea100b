use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;

use cpu16::demo::FIBONACCI;
use cpu16::{MachineConfig, Processor};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Slow enough to watch the numbers appear
const MILLISECONDS_PER_INSTRUCTION: u64 = 50;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap(); // logging

    let config = MachineConfig::default()
        .with_cycle_delay(Duration::from_millis(MILLISECONDS_PER_INSTRUCTION));
    let mut cpu = Processor::new(config)?;
    cpu.load(&FIBONACCI)?;

    cpu.execute_until_halt(&mut io::stdout())?;

    Ok(())
}
