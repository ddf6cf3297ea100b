use std::io;

use thiserror::Error;

use crate::memory::Address;

/// Faults raised by the machine. Any of these is terminal for the instance that
/// raised it.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("invalid register r{index} (register file has {count} slots)")]
    InvalidRegister { index: usize, count: usize },
    #[error("register r{index} is reserved and cannot be written by {mnemonic}")]
    ReservedRegister { index: usize, mnemonic: &'static str },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("program of {len} words does not fit at 0x{origin:04X}")]
    ProgramTooLarge { origin: Address, len: usize },
    #[error("machine is halted")]
    Halted,
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

pub type Result<T, E = MachineError> = std::result::Result<T, E>;
