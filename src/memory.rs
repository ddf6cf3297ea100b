use crate::error::{MachineError, Result};

pub mod parse;

pub type Word = u16; // 2 bytes
pub type Address = u16;

/// Number of words in a bank: every 16-bit address is valid.
pub const BANK_SIZE: usize = 1 << 16;

/// Fill pattern for unloaded program memory. Its opcode nibble is `0xF` (HLT),
/// so a stray jump into it stops the machine.
pub const HALT_SENTINEL: Word = 0xFFFF;

/// A flat bank of 65536 words, used for both the program and the data store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Memory {
    /// The actual data of the memory
    pub data: Box<[Word]>,
}

impl Default for Memory {
    /// Initializes a zeroed bank
    fn default() -> Self {
        Self::filled(0)
    }
}

impl Memory {
    /// Initializes a bank with `word` at every address
    pub fn filled(word: Word) -> Self {
        Memory {
            data: vec![word; BANK_SIZE].into_boxed_slice(),
        }
    }

    /// Reads a word from the memory
    pub fn read(&self, address: Address) -> Word {
        self.data[address as usize]
    }

    /// Writes a word to the memory
    pub fn write(&mut self, address: Address, value: Word) {
        self.data[address as usize] = value;
    }

    /// Sets every address to `word`
    pub fn fill(&mut self, word: Word) {
        self.data.iter_mut().for_each(|slot| *slot = word);
    }

    /// Writes a slice of words to the memory, starting at `address`.
    ///
    /// # Errors
    ///
    /// Fails with [`MachineError::ProgramTooLarge`] if the slice would run past
    /// the last address. Nothing is written in that case.
    pub fn write_array(&mut self, address: Address, words: &[Word]) -> Result<()> {
        let start = address as usize;
        if words.len() > BANK_SIZE - start {
            return Err(MachineError::ProgramTooLarge {
                origin: address,
                len: words.len(),
            });
        }

        self.data[start..start + words.len()].copy_from_slice(words);
        Ok(())
    }
}

/// Writes a block of words directly into the memory
#[macro_export]
macro_rules! write_words {
    ( $mem:ident : $pos:expr => $( $word:expr ),+ $(,)? ) => {
        $mem.write_array($pos, &[
            $(
                $word as $crate::memory::Word,
            )+
        ])
    };
}
