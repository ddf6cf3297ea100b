//! Register file and the bit-level flag helpers.

use crate::error::{MachineError, Result};
use crate::memory::Word;

/// Program counter slot
pub const PC: usize = 0;
/// Flags slot
pub const FLAGS: usize = 1;

/// Smallest register file: PC, flags and three general-purpose registers.
pub const MIN_REGISTERS: usize = 5;
/// Largest register file addressable by a 4-bit selector.
pub const MAX_REGISTERS: usize = 16;

/// Comparison result bits of the flags register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    Greater = 0,
    Equal = 1,
    Less = 2,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Greater, Flag::Equal, Flag::Less];

    pub fn bit(self) -> u8 {
        self as u8
    }
}

/// Returns whether bit `pos` of `word` is set. `pos` is taken modulo 16.
pub fn get_bit(word: Word, pos: u8) -> bool {
    word & (1 << (pos & 0xF)) != 0
}

/// Returns `word` with bit `pos` set to `value`. `pos` is taken modulo 16.
pub fn set_bit(word: Word, pos: u8, value: bool) -> Word {
    let mask: Word = 1 << (pos & 0xF);
    if value {
        word | mask
    } else {
        word & !mask
    }
}

/// Clears the three comparison bits, leaving bits 3..16 untouched.
pub fn clear_comparison(flags: Word) -> Word {
    Flag::ALL
        .iter()
        .fold(flags, |acc, flag| set_bit(acc, flag.bit(), false))
}

/// Flags after an unsigned comparison of `a` with `b`: exactly one of GT/EQ/LT.
pub fn compare_flags(flags: Word, a: Word, b: Word) -> Word {
    let flag = if a > b {
        Flag::Greater
    } else if a == b {
        Flag::Equal
    } else {
        Flag::Less
    };
    set_bit(clear_comparison(flags), flag.bit(), true)
}

/// Flags after a logic operation: EQ is set iff `result` is nonzero.
pub fn truth_flags(flags: Word, result: Word) -> Word {
    set_bit(clear_comparison(flags), Flag::Equal.bit(), result != 0)
}

/// Rejects register file sizes a 4-bit selector cannot cover or that lack
/// general-purpose slots.
pub fn check_count(count: usize) -> Result<()> {
    if !(MIN_REGISTERS..=MAX_REGISTERS).contains(&count) {
        return Err(MachineError::InvalidConfig(format!(
            "register count {} is outside {}..={}",
            count, MIN_REGISTERS, MAX_REGISTERS
        )));
    }
    Ok(())
}

/// A bounds-checked file of word registers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterFile {
    slots: Vec<Word>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            slots: vec![0; MIN_REGISTERS],
        }
    }
}

impl RegisterFile {
    /// Creates a zeroed register file with `count` slots.
    ///
    /// # Errors
    ///
    /// `count` must lie in `MIN_REGISTERS..=MAX_REGISTERS`.
    pub fn new(count: usize) -> Result<Self> {
        check_count(count)?;
        Ok(Self {
            slots: vec![0; count],
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Word> {
        self.slots
            .get(index)
            .copied()
            .ok_or(MachineError::InvalidRegister {
                index,
                count: self.slots.len(),
            })
    }

    pub fn set(&mut self, index: usize, value: Word) -> Result<()> {
        let count = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(MachineError::InvalidRegister { index, count })?;
        *slot = value;
        Ok(())
    }

    /// Program counter
    pub fn pc(&self) -> Word {
        self.slots[PC]
    }

    pub fn set_pc(&mut self, value: Word) {
        self.slots[PC] = value;
    }

    /// Flags register
    pub fn flags(&self) -> Word {
        self.slots[FLAGS]
    }

    pub fn set_flags(&mut self, value: Word) {
        self.slots[FLAGS] = value;
    }

    pub fn flag(&self, flag: Flag) -> bool {
        get_bit(self.flags(), flag.bit())
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.slots
    }

    /// Zeroes every slot
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_bits() -> Result<()> {
        assert!(get_bit(0b100, 2));
        assert!(!get_bit(0b100, 1));
        assert_eq!(set_bit(0, 15, true), 0x8000);
        assert_eq!(set_bit(0xFFFF, 0, false), 0xFFFE);
        assert_eq!(set_bit(0b10, 1, true), 0b10);

        Ok(())
    }

    #[test]
    fn test_compare_flags() -> Result<()> {
        assert_eq!(compare_flags(0, 5, 3), 0b001);
        assert_eq!(compare_flags(0, 3, 3), 0b010);
        assert_eq!(compare_flags(0, 3, 5), 0b100);
        // previous result is replaced
        assert_eq!(compare_flags(0b111, 0, 0xFFFF), 0b100);

        Ok(())
    }

    #[test]
    fn test_compare_keeps_reserved_bits() -> Result<()> {
        assert_eq!(compare_flags(0xFFF8, 1, 1), 0xFFFA);
        assert_eq!(compare_flags(0x8001, 0, 1), 0x8004);

        Ok(())
    }

    #[test]
    fn test_truth_flags() -> Result<()> {
        assert_eq!(truth_flags(0b001, 0x10), 0b010);
        assert_eq!(truth_flags(0b010, 0), 0);
        assert_eq!(truth_flags(0x8004, 0), 0x8000);

        Ok(())
    }

    #[test]
    fn test_register_file() -> Result<()> {
        let mut regs = RegisterFile::new(8)?;
        assert_eq!(regs.len(), 8);
        assert!(regs.as_slice().iter().all(|&word| word == 0));

        regs.set(7, 42)?;
        assert_eq!(regs.get(7)?, 42);

        regs.reset();
        assert_eq!(regs.get(7)?, 0);

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let mut regs = RegisterFile::default();

        assert!(matches!(
            regs.get(5),
            Err(MachineError::InvalidRegister { index: 5, count: 5 })
        ));
        assert!(matches!(
            regs.set(15, 1),
            Err(MachineError::InvalidRegister {
                index: 15,
                count: 5
            })
        ));

        Ok(())
    }

    #[test]
    fn test_register_count_bounds() -> Result<()> {
        assert!(RegisterFile::new(4).is_err());
        assert!(RegisterFile::new(17).is_err());
        assert_eq!(RegisterFile::new(16)?.len(), 16);

        Ok(())
    }
}
