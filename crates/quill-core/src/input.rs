//! Turns raw terminal bytes into logical keys.
//!
//! Plain bytes map directly onto keys. The only multi-byte input we
//! understand is the CSI arrow sequence `ESC [ A..D`; anything else that
//! starts with an escape collapses into a bare [`Key::Esc`].

use std::{mem, time::Duration};

use crate::{
    backend::ByteSource,
    error::Result,
    key::{ESC, Key},
};

/// Decoder state between bytes of one escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// No pending escape.
    #[default]
    Ground,
    /// Consumed an escape byte.
    SawEscape,
    /// Consumed escape and `[`.
    SawBracket,
}

/// Escape sequence decoder. State only carries over between calls to
/// [`Decoder::next_key`] when a second escape interrupts a pending one.
#[derive(Debug, Default)]
pub struct Decoder {
    /// Current position in an escape sequence.
    state: State,
}

impl Decoder {
    /// A decoder in the ground state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Feed one byte, returning a key if the byte completes one.
    pub fn advance(&mut self, b: u8) -> Option<Key> {
        match self.state {
            State::Ground => {
                if b == ESC {
                    self.state = State::SawEscape;
                    None
                } else {
                    Some(Key::from_byte(b))
                }
            }
            State::SawEscape => {
                if b == b'[' {
                    self.state = State::SawBracket;
                    None
                } else if b == ESC {
                    // A fresh escape ends the pending one and may start a sequence.
                    Some(Key::Esc)
                } else {
                    tracing::trace!(byte = b, "escape aborted");
                    self.state = State::Ground;
                    Some(Key::Esc)
                }
            }
            State::SawBracket if b == ESC => {
                self.state = State::SawEscape;
                Some(Key::Esc)
            }
            State::SawBracket => {
                self.state = State::Ground;
                let key = Key::from_csi_final(b);
                if key.is_none() {
                    tracing::trace!(byte = b, "unrecognized CSI final byte");
                }
                Some(key.unwrap_or(Key::Esc))
            }
        }
    }

    /// Signal that no further byte arrived in time. A partial escape
    /// sequence resolves to a bare escape.
    pub fn timeout(&mut self) -> Option<Key> {
        match mem::take(&mut self.state) {
            State::Ground => None,
            State::SawEscape | State::SawBracket => Some(Key::Esc),
        }
    }

    /// Read bytes from `src` until one key is decoded. Each read waits at
    /// most `timeout`. Returns `None` if no input was pending.
    pub fn next_key(
        &mut self,
        src: &mut impl ByteSource,
        timeout: Duration,
    ) -> Result<Option<Key>> {
        loop {
            let b = match src.read_byte(timeout) {
                Ok(b) => b,
                Err(e) => {
                    self.state = State::Ground;
                    return Err(e);
                }
            };
            let Some(b) = b else {
                return Ok(self.timeout());
            };
            if let Some(key) = self.advance(b) {
                return Ok(Some(key));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{key::ctrl, testing::ScriptedInput};

    const T: Duration = Duration::from_millis(1);

    fn decode_all(bytes: &[u8]) -> Result<(Vec<Key>, usize)> {
        let mut src = ScriptedInput::new(bytes);
        let mut dec = Decoder::new();
        let mut keys = vec![];
        while let Some(k) = dec.next_key(&mut src, T)? {
            keys.push(k);
        }
        assert_eq!(dec.state(), State::Ground);
        Ok((keys, src.remaining()))
    }

    #[test]
    fn arrow_sequence_is_one_key() -> Result<()> {
        let (keys, remaining) = decode_all(b"\x1b[A")?;
        assert_eq!(keys, vec![Key::Up]);
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[test]
    fn all_arrows() -> Result<()> {
        let (keys, _) = decode_all(b"\x1b[A\x1b[B\x1b[C\x1b[D")?;
        assert_eq!(keys, vec![Key::Up, Key::Down, Key::Right, Key::Left]);
        Ok(())
    }

    #[test]
    fn plain_bytes() -> Result<()> {
        let bytes = [b'h', b'i', 13, 127, ctrl('s')];
        let (keys, _) = decode_all(&bytes)?;
        assert_eq!(
            keys,
            vec![
                Key::Char(b'h'),
                Key::Char(b'i'),
                Key::Enter,
                Key::Backspace,
                Key::Ctrl('s')
            ]
        );
        Ok(())
    }

    #[test]
    fn truncated_escape_is_bare_escape() -> Result<()> {
        assert_eq!(decode_all(b"\x1b")?.0, vec![Key::Esc]);
        assert_eq!(decode_all(b"\x1b[")?.0, vec![Key::Esc]);
        Ok(())
    }

    #[test]
    fn aborting_byte_is_consumed() -> Result<()> {
        assert_eq!(decode_all(b"\x1bxa")?.0, vec![Key::Esc, Key::Char(b'a')]);
        assert_eq!(decode_all(b"\x1b[Zb")?.0, vec![Key::Esc, Key::Char(b'b')]);
        Ok(())
    }

    #[test]
    fn escape_restarts_pending_sequence() -> Result<()> {
        assert_eq!(decode_all(b"\x1b\x1b[A")?.0, vec![Key::Esc, Key::Up]);
        assert_eq!(decode_all(b"\x1b[\x1b[B")?.0, vec![Key::Esc, Key::Down]);
        assert_eq!(decode_all(b"\x1b\x1b")?.0, vec![Key::Esc, Key::Esc]);
        Ok(())
    }

    #[test]
    fn empty_input_yields_nothing() -> Result<()> {
        let mut src = ScriptedInput::new(b"");
        let mut dec = Decoder::new();
        assert_eq!(dec.next_key(&mut src, T)?, None);
        Ok(())
    }

    #[test]
    fn gap_inside_sequence_resolves_escape() -> Result<()> {
        let mut src = ScriptedInput::new(b"\x1b");
        src.pause();
        src.push(b"[A");
        let mut dec = Decoder::new();
        assert_eq!(dec.next_key(&mut src, T)?, Some(Key::Esc));
        assert_eq!(dec.next_key(&mut src, T)?, Some(Key::Char(b'[')));
        assert_eq!(dec.next_key(&mut src, T)?, Some(Key::Char(b'A')));
        Ok(())
    }
}
