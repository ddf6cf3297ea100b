use std::io;

use color_eyre::eyre::{eyre, Result};

use cpu16::memory::parse::parse_image;
use cpu16::Processor;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let data = include_str!("programs/fibonacci.hex");
    let words = parse_image(data).map_err(|errors| eyre!("{} parse error(s)", errors.len()))?;

    let mut cpu = Processor::default();
    cpu.load(&words)?;
    cpu.execute_until_halt(&mut io::stdout())?;

    Ok(())
}
