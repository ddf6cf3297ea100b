//! Hand-assembled programs.

use crate::memory::Word;

/// Prints Fibonacci numbers until the next one would wrap past 65535.
///
/// ```text
///     LDV 2, 0x0000
///     LDV 3, 0x0001
///     ADD 2 3 4
/// 6:  OUT 4
///     CPY 3 2
///     CPY 4 3
///     ADD 2 3 4
///     CMP 4 3
///     J 1 0, 0x0006
/// ```
///
/// Execution falls through to the halt sentinel after the loop.
pub const FIBONACCI: [Word; 18] = [
    0xA200, 0x0000, 0xA300, 0x0001, 0x0234, 0x0000, 0x7400, 0x0000, 0x6320, 0x0000, 0x6430,
    0x0000, 0x0234, 0x0000, 0x5430, 0x0000, 0xE100, 0x0006,
];

/// Prints 10 down to 1.
///
/// ```text
///     LDV 2, 0x000A
///     LDV 3, 0x0001
///     LDV 4, 0x0000
/// 6:  OUT 2
///     SUB 2 3 2
///     CMP 2 4
///     J 0 1, 0x0006
///     HLT
/// ```
pub const COUNTDOWN: [Word; 16] = [
    0xA200, 0x000A, 0xA300, 0x0001, 0xA400, 0x0000, 0x7200, 0x0000, 0x1232, 0x0000, 0x5240,
    0x0000, 0xE010, 0x0006, 0xF000, 0x0000,
];
