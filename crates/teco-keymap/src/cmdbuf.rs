//! The command buffer (spec §3 component 2): the character stream being
//! interpreted, with a read cursor that loops rewind and error recovery
//! restore.

use teco_types::{TecoError, TecoResult};

/// An immutable snapshot of one command-stream's text plus a movable read
/// cursor. Top-level input and every macro body (spec §4.5) each get
/// their own `CmdBuf`; `Interp` swaps the active one in and out as macros
/// are entered and exited.
#[derive(Debug, Clone)]
pub struct CmdBuf {
    text: Vec<u8>,
    pos: usize,
}

impl CmdBuf {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Rewind to an earlier position, e.g. a loop's `start` or the
    /// position saved before a command that errored (spec §4.6).
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    /// Consume and return the next character, or `None` at end of
    /// stream.
    pub fn next_char(&mut self) -> Option<char> {
        let c = *self.text.get(self.pos)?;
        self.pos += 1;
        Some(c as char)
    }

    /// Look at the next character without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos).map(|&b| b as char)
    }

    /// Read characters until `delim` (consuming the delimiter) and
    /// return a `(start, len)` view over the text *excluding* the
    /// delimiter. Fails with `E_UTC` if the stream ends first (spec §7
    /// "malformed command stream").
    pub fn read_text_arg(&mut self, delim: u8) -> TecoResult<(usize, usize)> {
        let start = self.pos;
        loop {
            match self.text.get(self.pos) {
                Some(&b) if b == delim => {
                    let len = self.pos - start;
                    self.pos += 1;
                    return Ok((start, len));
                }
                Some(_) => self.pos += 1,
                None => return Err(TecoError::Utc),
            }
        }
    }

    /// Borrow a previously captured `(start, len)` view as UTF-8 (lossy:
    /// the engine's byte stream is 7-bit ASCII plus control sentinels per
    /// spec §6, so this is exact in practice).
    pub fn slice(&self, start: usize, len: usize) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.text[start..start + len])
    }

    /// Scan forward from the current position to the matching closer,
    /// tracking nesting of `(open, close)` pairs — used by loop/`<...>`
    /// dry-run skipping and conditional `"..."` skipping (spec §4.3,
    /// §4.4). Leaves `pos` just past the matching closer on success.
    pub fn skip_balanced(&mut self, open: char, close: char) -> TecoResult<()> {
        let mut depth = 1usize;
        loop {
            match self.next_char() {
                Some(c) if c == open => depth += 1,
                Some(c) if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(TecoError::Utl),
            }
        }
    }

    /// Scan forward past a conditional's then-branch (spec §4.4), honoring
    /// nested `"..."` conditionals. Stops at the matching `'` always, and
    /// at a same-depth `|` only when `stop_at_bar` is set (used by `n"X`
    /// skipping a false test, vs. `|` skipping the else-branch, which must
    /// run past any `|` and stop only at `'`). Returns whichever of `|` or
    /// `'` was found.
    pub fn skip_conditional(&mut self, stop_at_bar: bool) -> TecoResult<char> {
        let mut depth = 0usize;
        loop {
            match self.next_char() {
                Some('"') => depth += 1,
                Some('|') if depth == 0 && stop_at_bar => return Ok('|'),
                Some('\'') if depth == 0 => return Ok('\''),
                Some('\'') => depth -= 1,
                Some(_) => {}
                None => return Err(TecoError::Utq),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_arg_stops_at_delimiter() {
        let mut buf = CmdBuf::new("hello\x1brest");
        let (start, len) = buf.read_text_arg(0x1b).unwrap();
        assert_eq!(buf.slice(start, len), "hello");
        assert_eq!(buf.position(), 6);
    }

    #[test]
    fn read_text_arg_unterminated_is_utc() {
        let mut buf = CmdBuf::new("hello");
        assert_eq!(buf.read_text_arg(0x1b), Err(TecoError::Utc));
    }

    #[test]
    fn skip_balanced_tracks_nesting() {
        let mut buf = CmdBuf::new("a<b<c>d>e>rest");
        buf.skip_balanced('<', '>').unwrap();
        assert_eq!(buf.peek_char(), Some('r'));
    }

    #[test]
    fn skip_conditional_stops_at_bar_when_requested() {
        let mut buf = CmdBuf::new("then|else'rest");
        assert_eq!(buf.skip_conditional(true), Ok('|'));
        assert_eq!(buf.peek_char(), Some('e'));
    }

    #[test]
    fn skip_conditional_runs_past_bar_to_quote() {
        let mut buf = CmdBuf::new("then|else'rest");
        assert_eq!(buf.skip_conditional(false), Ok('\''));
        assert_eq!(buf.peek_char(), Some('r'));
    }

    #[test]
    fn skip_conditional_honors_nesting() {
        let mut buf = CmdBuf::new("a\"b|c'd|e'rest");
        assert_eq!(buf.skip_conditional(true), Ok('|'));
        assert_eq!(buf.peek_char(), Some('e'));
    }

    #[test]
    fn rewind_restores_position() {
        let mut buf = CmdBuf::new("abcdef");
        buf.next_char();
        buf.next_char();
        let saved = buf.position();
        buf.next_char();
        buf.set_position(saved);
        assert_eq!(buf.peek_char(), Some('c'));
    }
}
