use proptest::prelude::*;

use cpu16::registers::get_bit;
use cpu16::{Flag, HaltReason, MachineConfig, MachineError, Processor, Word};

/// Loads `a` into r2 and `b` into r3, then runs `word` and halts.
fn run_binary(word: Word, a: Word, b: Word) -> Processor {
    let mut cpu = Processor::new(MachineConfig::default().with_register_count(6)).unwrap();
    cpu.load(&[0xA200, a, 0xA300, b, word, 0x0000, 0xF000, 0x0000])
        .unwrap();
    cpu.execute_until_halt(&mut Vec::<u8>::new()).unwrap();
    cpu
}

/// Defined, non-halting, non-jump instructions whose selectors stay inside a
/// five-register file and never write PC or flags.
fn straight_line_word() -> impl Strategy<Value = Word> {
    let dest = 2..5u16;
    let src = 0..5u16;
    prop_oneof![
        (0..2u16, src.clone(), src.clone(), dest.clone())
            .prop_map(|(op, a, b, c)| op << 12 | a << 8 | b << 4 | c),
        dest.clone().prop_map(|a| 0x2000 | a << 8),
        (3..6u16, src.clone(), src.clone()).prop_map(|(op, a, b)| op << 12 | a << 8 | b << 4),
        (src.clone(), dest.clone()).prop_map(|(a, b)| 0x6000 | a << 8 | b << 4),
        src.clone().prop_map(|a| 0x7000 | a << 8 | 0x00FF),
        src.prop_map(|a| 0x8000 | a << 8),
        (9..11u16, dest).prop_map(|(op, a)| op << 12 | a << 8),
    ]
}

proptest! {
    #[test]
    fn add_wraps(a: Word, b: Word) {
        let cpu = run_binary(0x0234, a, b);
        prop_assert_eq!(cpu.registers.get(4).unwrap(), ((a as u32 + b as u32) % 65536) as Word);
    }

    #[test]
    fn sub_wraps(a: Word, b: Word) {
        let cpu = run_binary(0x1235, a, b);
        let expected = ((a as i32 - b as i32).rem_euclid(65536)) as Word;
        prop_assert_eq!(cpu.registers.get(5).unwrap(), expected);
    }

    #[test]
    fn compare_sets_exactly_one_flag(a: Word, b: Word, reserved: Word) {
        let mut cpu = Processor::default();
        cpu.load(&[0xA200, a, 0xA300, b, 0x5230, 0x0000]).unwrap();
        let mut out = Vec::<u8>::new();
        cpu.execute(&mut out).unwrap();
        cpu.execute(&mut out).unwrap();
        cpu.registers.set_flags(reserved);
        cpu.execute(&mut out).unwrap();

        let flags = cpu.registers.flags();
        let set: Vec<Flag> = Flag::ALL.iter().copied().filter(|&flag| cpu.registers.flag(flag)).collect();
        let expected = if a > b {
            Flag::Greater
        } else if a == b {
            Flag::Equal
        } else {
            Flag::Less
        };
        prop_assert_eq!(set, vec![expected]);
        prop_assert_eq!(flags & !0b111, reserved & !0b111);
    }

    #[test]
    fn logic_sets_equal_iff_nonzero(a: Word, b: Word) {
        let and = run_binary(0x3230, a, b);
        prop_assert_eq!(and.registers.flag(Flag::Equal), a & b != 0);
        prop_assert!(!and.registers.flag(Flag::Greater) && !and.registers.flag(Flag::Less));

        let or = run_binary(0x4230, a, b);
        prop_assert_eq!(or.registers.flag(Flag::Equal), a | b != 0);
    }

    #[test]
    fn straight_line_advances_pc_by_two(word in straight_line_word(), start: Word) {
        let mut cpu = Processor::default();
        cpu.load(&[word, 0x0040]).unwrap();
        cpu.execute(&mut Vec::<u8>::new()).unwrap();
        prop_assert_eq!(cpu.registers.pc(), 2);
        prop_assert!(cpu.is_running());

        // from anywhere in the store, including the wrap at 0xFFFE
        let start = start & !1;
        let mut words = vec![0xFFFF; 0x1_0000];
        words[start as usize] = word;
        words[start as usize + 1] = 0x0040;
        let mut cpu = Processor::default();
        cpu.load(&words).unwrap();
        cpu.registers.set_pc(start);
        cpu.execute(&mut Vec::<u8>::new()).unwrap();
        prop_assert_eq!(cpu.registers.pc(), start.wrapping_add(2));
    }

    #[test]
    fn jump_targets_are_absolute(mode in 0..16u16, bit in 0..16u16, flags: Word, target: Word) {
        let mut cpu = Processor::default();
        cpu.load(&[0xE000 | mode << 8 | bit << 4, target]).unwrap();
        cpu.registers.set_flags(flags);
        cpu.execute(&mut Vec::<u8>::new()).unwrap();

        let set = get_bit(flags, bit as u8);
        let taken = match mode {
            0 => !set,
            1 => set,
            _ => true,
        };
        let expected = if taken { target } else { 2 };
        prop_assert_eq!(cpu.registers.pc(), expected);
    }

    #[test]
    fn out_of_range_selector_faults(op in prop::sample::select(vec![0u16, 1, 2, 5, 6, 7, 8, 9, 10]), index in 5..16u16) {
        let mut cpu = Processor::default();
        cpu.load(&[op << 12 | index << 8 | 0x22, 0x0000]).unwrap();
        let err = cpu.execute(&mut Vec::<u8>::new()).unwrap_err();

        let is_invalid = matches!(err, MachineError::InvalidRegister { index: i, count: 5 } if i == index as usize);
        prop_assert!(is_invalid);
        prop_assert_eq!(cpu.halt_reason(), Some(HaltReason::Fault));
        prop_assert_eq!(&cpu.registers.as_slice()[2..], &[0, 0, 0]);
    }
}
