//! Emulator for a small 16-bit Harvard CPU: separate 64K-word program and data
//! stores, a register file holding the program counter and flags, and twelve
//! two-word instructions.

pub mod config;
pub mod demo;
pub mod error;
pub mod memory;
pub mod pacing;
pub mod processor;
pub mod registers;

pub use config::MachineConfig;
pub use error::MachineError;
pub use memory::{Address, Memory, Word};
pub use processor::{HaltReason, Instruction, Opcode, Processor, RunSummary, State};
pub use registers::{Flag, RegisterFile};
