//! Logical keys produced by the input decoder.

/// Escape byte, the start of every terminal control sequence.
pub const ESC: u8 = 0x1b;
/// Carriage return, sent by the Enter key in raw mode.
pub const ENTER: u8 = b'\r';
/// DEL, sent by the Backspace key.
pub const BACKSPACE: u8 = 0x7f;

/// The control byte produced by pressing Ctrl together with the letter `c`.
pub const fn ctrl(c: char) -> u8 {
    (c.to_ascii_uppercase() as u8) - b'A' + 1
}

/// A decoded keyboard event.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Key {
    /// A plain byte. Only printable ASCII is inserted into the buffer.
    Char(u8),
    /// Ctrl plus a lowercase letter.
    Ctrl(char),
    /// Enter.
    Enter,
    /// Backspace.
    Backspace,
    /// A bare escape, or an escape sequence we don't understand.
    Esc,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
}

impl Key {
    /// Classify a single byte read outside an escape sequence.
    pub fn from_byte(b: u8) -> Self {
        match b {
            ESC => Self::Esc,
            ENTER => Self::Enter,
            BACKSPACE => Self::Backspace,
            0x01..=0x1a => Self::Ctrl(char::from(b'a' + b - 1)),
            _ => Self::Char(b),
        }
    }

    /// The final byte of a CSI arrow sequence.
    pub fn from_csi_final(b: u8) -> Option<Self> {
        match b {
            b'A' => Some(Self::Up),
            b'B' => Some(Self::Down),
            b'C' => Some(Self::Right),
            b'D' => Some(Self::Left),
            _ => None,
        }
    }

    /// True for bytes the editor inserts as text.
    pub fn is_printable(b: u8) -> bool {
        matches!(b, 0x20..=0x7e)
    }
}
