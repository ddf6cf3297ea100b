use std::convert::TryFrom;
use std::fmt;
use std::io::Write;

use crate::config::MachineConfig;
use crate::error::{MachineError, Result};
use crate::memory::{Address, Memory, Word, HALT_SENTINEL};
use crate::pacing::{NoDelay, Pacer};
use crate::registers::{self, RegisterFile, FLAGS, PC};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Why a machine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaltReason {
    /// A `HLT` instruction (or the unloaded-memory sentinel) was executed
    Requested,
    /// The opcode nibble has no defined instruction
    UndefinedOpcode(u8),
    /// An instruction faulted; the error was returned from [`Processor::execute`]
    Fault,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Requested => f.write_str("halt requested"),
            HaltReason::UndefinedOpcode(opcode) => write!(f, "undefined opcode 0x{:X}", opcode),
            HaltReason::Fault => f.write_str("fault"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    /// Terminal until [`Processor::reset`]
    Halted(HaltReason),
}

/// Result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles executed by this run
    pub cycles: u64,
    /// `None` if the run stopped at its cycle limit while still running
    pub reason: Option<HaltReason>,
}

/// Emulates the CPU: both memory banks, the register file and the halt state.
/// Instances share nothing with each other.
#[derive(Debug)]
pub struct Processor {
    /// Read-write data store
    pub data: Memory,
    pub registers: RegisterFile,
    program: Memory,
    state: State,
    cycles: u64,
    pacer: Box<dyn Pacer>,
}

impl Default for Processor {
    /// Initializes a five-register CPU running at full speed
    fn default() -> Self {
        Self {
            data: Memory::default(),
            registers: RegisterFile::default(),
            program: Memory::filled(HALT_SENTINEL),
            state: State::Running,
            cycles: 0,
            pacer: Box::new(NoDelay),
        }
    }
}

impl Processor {
    /// Initializes a new CPU
    pub fn new(config: MachineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registers: RegisterFile::new(config.register_count)?,
            pacer: config.pacer(),
            ..Self::default()
        })
    }

    /// Replaces the pacing strategy
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Copies `words` into the program store at address 0. Every other address
    /// holds [`HALT_SENTINEL`].
    pub fn load(&mut self, words: &[Word]) -> Result<()> {
        let mut program = Memory::filled(HALT_SENTINEL);
        program.write_array(0, words)?;
        self.program = program;

        debug!("Loaded {} words", words.len());
        Ok(())
    }

    /// Zeroes the registers and leaves the halted state. The program store is
    /// kept; the data store is zeroed only if `clear_data` is set.
    pub fn reset(&mut self, clear_data: bool) {
        self.registers.reset();
        self.state = State::Running;
        self.cycles = 0;
        if clear_data {
            self.data.fill(0);
        }
    }

    pub fn program(&self) -> &Memory {
        &self.program
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.state {
            State::Running => None,
            State::Halted(reason) => Some(reason),
        }
    }

    /// Cycles executed since the last reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Executes a single instruction. The program counter must already point
    /// past it.
    pub fn execute_instruction<W: Write>(
        &mut self,
        instruction: Instruction,
        out: &mut W,
    ) -> Result<()> {
        let Fields { opcode, a, b, c } = instruction.fields();
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let literal = instruction.literal;

        let opcode = match Opcode::try_from(opcode) {
            Ok(opcode) => opcode,
            Err(_) => {
                self.state = State::Halted(HaltReason::UndefinedOpcode(opcode));
                warn!("Undefined opcode 0x{:X} in {}", opcode, instruction);
                return Ok(());
            }
        };

        match opcode {
            Opcode::ADD => {
                let x = self.registers.get(a)?;
                let y = self.registers.get(b)?;
                let result = x.wrapping_add(y);
                self.store(opcode, c, result)?;

                debug!("ADD {} {}: {}", x, y, result);
            }
            Opcode::SUB => {
                let x = self.registers.get(a)?;
                let y = self.registers.get(b)?;
                let result = x.wrapping_sub(y);
                self.store(opcode, c, result)?;

                debug!("SUB {} {}: {}", x, y, result);
            }
            Opcode::NOT => {
                let value = self.registers.get(a)?;
                self.store(opcode, a, !value)?;

                debug!("NOT {}: {}", value, !value);
            }
            Opcode::AND | Opcode::OR => {
                let x = self.registers.get(a)?;
                let y = self.registers.get(b)?;
                let result = if opcode == Opcode::AND { x & y } else { x | y };
                let flags = registers::truth_flags(self.registers.flags(), result);
                self.registers.set_flags(flags);

                debug!(
                    "{} {} {}: {} (flags 0b{:03b})",
                    opcode,
                    x,
                    y,
                    result,
                    flags & 0b111
                );
            }
            Opcode::CMP => {
                let x = self.registers.get(a)?;
                let y = self.registers.get(b)?;
                let flags = registers::compare_flags(self.registers.flags(), x, y);
                self.registers.set_flags(flags);

                debug!("CMP {} {}: flags 0b{:03b}", x, y, flags & 0b111);
            }
            Opcode::CPY => {
                let value = self.registers.get(a)?;
                self.store(opcode, b, value)?;

                debug!("CPY r{} -> r{}: {}", a, b, value);
            }
            Opcode::OUT => {
                let value = self.registers.get(a)?;
                writeln!(out, "{}", value)?;

                debug!("OUT {}", value);
            }
            Opcode::MOV => {
                let value = self.registers.get(a)?;
                self.data.write(literal, value);

                debug!("MOV {} -> [0x{:04X}]", value, literal);
            }
            Opcode::LD => {
                let value = self.data.read(literal);
                self.store(opcode, a, value)?;

                debug!("LD [0x{:04X}]: {}", literal, value);
            }
            Opcode::LDV => {
                self.store(opcode, a, literal)?;

                debug!("LDV {}", literal);
            }
            Opcode::J => {
                let flag = b as u8;
                let taken = match a {
                    0 => !registers::get_bit(self.registers.flags(), flag),
                    1 => registers::get_bit(self.registers.flags(), flag),
                    _ => true,
                };
                if taken {
                    self.registers.set_pc(literal);
                }

                debug!("J {} {}, 0x{:04X}: taken={}", a, flag, literal, taken);
            }
            Opcode::HLT => {
                self.state = State::Halted(HaltReason::Requested);

                debug!("HLT");
            }
        }

        Ok(())
    }

    /// Writes a data-instruction result. PC and flags are never a valid
    /// destination here.
    fn store(&mut self, opcode: Opcode, index: usize, value: Word) -> Result<()> {
        if index == PC || index == FLAGS {
            return Err(MachineError::ReservedRegister {
                index,
                mnemonic: opcode.name(),
            });
        }
        self.registers.set(index, value)
    }

    /// Runs one execution step: fetch two words at PC, advance PC by two,
    /// then execute. Returns the executed instruction.
    ///
    /// # Errors
    ///
    /// Faults halt the machine with [`HaltReason::Fault`] and are returned.
    /// Stepping a halted machine fails with [`MachineError::Halted`].
    pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<Instruction> {
        if !self.is_running() {
            return Err(MachineError::Halted);
        }

        let pc = self.registers.pc();
        let instruction = Instruction::new(
            self.program.read(pc),
            self.program.read(pc.wrapping_add(1)),
        );
        self.registers.set_pc(pc.wrapping_add(2));
        self.cycles += 1;

        trace!("0x{:04X}: {}", pc, instruction);
        if let Err(err) = self.execute_instruction(instruction, out) {
            self.state = State::Halted(HaltReason::Fault);
            error!("Fault at 0x{:04X} ({}): {}", pc, instruction, err);
            return Err(err);
        }

        if self.is_running() {
            self.pacer.pace();
        }
        Ok(instruction)
    }

    /// Run program until a halt condition is met
    pub fn execute_until_halt<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let start = self.cycles;
        while self.is_running() {
            self.execute(out)?;
        }

        let summary = RunSummary {
            cycles: self.cycles - start,
            reason: self.halt_reason(),
        };
        info!(
            "Program terminated after {} cycles: {}",
            summary.cycles, self.state
        );
        Ok(summary)
    }

    /// Like [`Processor::execute_until_halt`], but stops after `max_cycles`
    /// steps even if the machine is still running.
    pub fn execute_limited<W: Write>(
        &mut self,
        out: &mut W,
        max_cycles: u64,
    ) -> Result<RunSummary> {
        let start = self.cycles;
        while self.is_running() && self.cycles - start < max_cycles {
            self.execute(out)?;
        }

        let summary = RunSummary {
            cycles: self.cycles - start,
            reason: self.halt_reason(),
        };
        if summary.reason.is_none() {
            warn!("Cycle limit of {} reached", max_cycles);
        } else {
            info!(
                "Program terminated after {} cycles: {}",
                summary.cycles, self.state
            );
        }
        Ok(summary)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Running => f.write_str("running"),
            State::Halted(reason) => write!(f, "halted ({})", reason),
        }
    }
}

/// The four 4-bit fields of an instruction's first word: `oooo aaaa bbbb cccc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fields {
    pub opcode: u8,
    pub a: u8,
    pub b: u8,
    pub c: u8,
}

impl Fields {
    /// Splits `word` into its nibbles. Field meaning depends on the opcode and
    /// is not checked here.
    pub fn decode(word: Word) -> Self {
        Self {
            opcode: (word >> 12) as u8,
            a: ((word >> 8) & 0xF) as u8,
            b: ((word >> 4) & 0xF) as u8,
            c: (word & 0xF) as u8,
        }
    }
}

/// A two-word instruction as fetched from the program store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Opcode and operand selectors
    pub word: Word,
    /// Literal address or constant. Fetched even when unused.
    pub literal: Word,
}

impl Instruction {
    pub fn new(word: Word, literal: Word) -> Self {
        Self { word, literal }
    }

    pub fn fields(&self) -> Fields {
        Fields::decode(self.word)
    }

    /// `None` for the undefined opcodes 0xB..=0xD
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::try_from(self.fields().opcode).ok()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Fields { a, b, c, .. } = self.fields();
        let opcode = match self.opcode() {
            Some(opcode) => opcode,
            None => return write!(f, ".word 0x{:04X}, 0x{:04X}", self.word, self.literal),
        };

        match opcode {
            Opcode::ADD | Opcode::SUB => write!(f, "{} {} {} {}", opcode, a, b, c),
            Opcode::NOT | Opcode::OUT => write!(f, "{} {}", opcode, a),
            Opcode::AND | Opcode::OR | Opcode::CMP | Opcode::CPY => {
                write!(f, "{} {} {}", opcode, a, b)
            }
            Opcode::MOV | Opcode::LD | Opcode::LDV => {
                write!(f, "{} {}, 0x{:04X}", opcode, a, self.literal)
            }
            Opcode::J => write!(f, "J {} {}, 0x{:04X}", a, b, self.literal),
            Opcode::HLT => f.write_str("HLT"),
        }
    }
}

/// Pairs up `words` into instructions with their program store addresses.
/// A trailing odd word is paired with the halt sentinel it would meet once
/// loaded.
pub fn disassemble(words: &[Word]) -> impl Iterator<Item = (Address, Instruction)> + '_ {
    words.chunks(2).enumerate().map(|(i, pair)| {
        let literal = pair.get(1).copied().unwrap_or(HALT_SENTINEL);
        ((i * 2) as Address, Instruction::new(pair[0], literal))
    })
}

macro_rules! opcodes {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the opcodes
        /// 0xB, 0xC and 0xD are reserved and have no variant
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Opcode {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Opcode {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Opcode {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

opcodes! {
    /// `ADD A B C`: reg[C] = reg[A] + reg[B], wrapping
    ADD = 0x0,
    /// `SUB A B C`: reg[C] = reg[A] - reg[B], wrapping
    SUB = 0x1,
    /// `NOT A`: inverts reg[A]
    NOT = 0x2,
    /// `AND A B`: sets EQ iff reg[A] & reg[B] is nonzero
    AND = 0x3,
    /// `OR A B`: sets EQ iff reg[A] | reg[B] is nonzero
    OR = 0x4,
    /// `CMP A B`: sets exactly one of GT, EQ, LT comparing reg[A] to reg[B]
    CMP = 0x5,
    /// `CPY A B`: reg[B] = reg[A]
    CPY = 0x6,
    /// `OUT A`: prints reg[A] as a decimal line
    OUT = 0x7,
    /// `MOV A, addr`: data[addr] = reg[A]
    MOV = 0x8,
    /// `LD A, addr`: reg[A] = data[addr]
    LD = 0x9,
    /// `LDV A, value`: reg[A] = value
    LDV = 0xA,
    /// `J mode flag, addr`: jump if the flag bit is clear (mode 0), set (mode 1),
    /// or always (mode 2 and up)
    J = 0xE,
    /// Stop the execution of the program
    HLT = 0xF,
}
