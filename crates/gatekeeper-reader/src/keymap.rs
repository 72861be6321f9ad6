//! Linux keycode to character table for the reader's keyboard emulation.
//!
//! The table covers keycodes `0..48` of `linux/input-event-codes.h` in the
//! unshifted US layout. That is enough for everything the reader types in a
//! swipe (`;`, digits, Enter). Non-printing keys inside the table (Esc,
//! Backspace, Tab, Ctrl, Shift) map to `None`.

/// Number of entries in [`KEYMAP`].
pub const KEYMAP_LEN: usize = 48;

/// Keycode → character, indexed by keycode.
pub const KEYMAP: [Option<char>; KEYMAP_LEN] = [
    None,       // 0  KEY_RESERVED
    None,       // 1  KEY_ESC
    Some('1'),  // 2
    Some('2'),  // 3
    Some('3'),  // 4
    Some('4'),  // 5
    Some('5'),  // 6
    Some('6'),  // 7
    Some('7'),  // 8
    Some('8'),  // 9
    Some('9'),  // 10
    Some('0'),  // 11
    Some('-'),  // 12
    Some('='),  // 13
    None,       // 14 KEY_BACKSPACE
    None,       // 15 KEY_TAB
    Some('q'),  // 16
    Some('w'),  // 17
    Some('e'),  // 18
    Some('r'),  // 19
    Some('t'),  // 20
    Some('y'),  // 21
    Some('u'),  // 22
    Some('i'),  // 23
    Some('o'),  // 24
    Some('p'),  // 25
    Some('['),  // 26
    Some(']'),  // 27
    Some('\n'), // 28 KEY_ENTER
    None,       // 29 KEY_LEFTCTRL
    Some('a'),  // 30
    Some('s'),  // 31
    Some('d'),  // 32
    Some('f'),  // 33
    Some('g'),  // 34
    Some('h'),  // 35
    Some('j'),  // 36
    Some('k'),  // 37
    Some('l'),  // 38
    Some(';'),  // 39
    Some('\''), // 40
    Some('`'),  // 41
    None,       // 42 KEY_LEFTSHIFT
    Some('\\'), // 43
    Some('z'),  // 44
    Some('x'),  // 45
    Some('c'),  // 46
    Some('v'),  // 47
];

/// Result of looking a keycode up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLookup {
    /// Printable key.
    Char(char),
    /// Key inside the table that types nothing.
    NonPrinting,
    /// Keycode beyond the end of the table.
    OutOfRange,
}

/// Look up a keycode.
///
/// # Examples
///
/// ```
/// use gatekeeper_reader::keymap::{KeyLookup, lookup};
///
/// assert_eq!(lookup(39), KeyLookup::Char(';'));
/// assert_eq!(lookup(28), KeyLookup::Char('\n'));
/// assert_eq!(lookup(42), KeyLookup::NonPrinting);
/// assert_eq!(lookup(53), KeyLookup::OutOfRange);
/// ```
pub fn lookup(code: u16) -> KeyLookup {
    match KEYMAP.get(usize::from(code)) {
        Some(Some(c)) => KeyLookup::Char(*c),
        Some(None) => KeyLookup::NonPrinting,
        None => KeyLookup::OutOfRange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        let digits: String = (2..=11)
            .map(|code| match lookup(code) {
                KeyLookup::Char(c) => c,
                other => panic!("keycode {code} gave {other:?}"),
            })
            .collect();
        assert_eq!(digits, "1234567890");
    }

    #[test]
    fn test_table_bounds() {
        assert_eq!(lookup(0), KeyLookup::NonPrinting);
        assert_eq!(lookup(47), KeyLookup::Char('v'));
        assert_eq!(lookup(48), KeyLookup::OutOfRange);
        assert_eq!(lookup(u16::MAX), KeyLookup::OutOfRange);
    }
}
