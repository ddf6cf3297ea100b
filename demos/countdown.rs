use std::io;

use color_eyre::eyre::Result;

use cpu16::memory::{Memory, Word};
use cpu16::write_words;
use cpu16::Processor;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    // Hand-assembled into a scratch bank, then loaded as the program
    let mut mem = Memory::default();
    write_words!(mem : 0x0000 =>
        0xA200, 0x000A, // LDV 2, 10
        0xA300, 0x0001, // LDV 3, 1
        0xA400, 0x0000, // LDV 4, 0
        0x7200, 0x0000, // OUT 2
        0x1232, 0x0000, // SUB 2 3 2
        0x5240, 0x0000, // CMP 2 4
        0xE010, 0x0006, // J 0 1, 0x0006
        0xF000, 0x0000, // HLT
    )?;
    let program: Vec<Word> = mem.data[..16].to_vec();

    let mut cpu = Processor::default();
    cpu.load(&program)?;
    cpu.execute_until_halt(&mut io::stdout())?;

    Ok(())
}
