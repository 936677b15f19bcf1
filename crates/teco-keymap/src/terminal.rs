//! The terminal collaborator's narrow interface (spec §6). The core never
//! reads raw keys or writes escape sequences itself; it calls through
//! this trait, which `teco-term` implements against a real terminal (or
//! a test double against an in-memory buffer).

use teco_types::TecoResult;

pub trait Terminal {
    /// Read one raw character. `wait = false` polls without blocking.
    fn getc(&mut self, wait: bool) -> Option<u8>;

    /// Echo a character the interpreter consumed, e.g. while reading a
    /// text argument in cooked mode.
    fn echo(&mut self, c: u8);

    /// Print formatted output, e.g. `=`'s decimal value or a macro's
    /// `^A` message.
    fn print(&mut self, s: &str);

    /// Block for and return one full command string from the operator.
    /// Immediate-mode characters (`?`, `/`, `*q`, CTRL/U, BS at position
    /// 0, CTRL/C, CTRL/G) are handled inside the terminal layer and never
    /// reach this return value (spec §6).
    fn read_cmd(&mut self) -> TecoResult<String>;
}

/// A `Terminal` that writes nowhere and never yields input, useful for
/// running macros (or tests) that must not touch the console.
#[derive(Debug, Default)]
pub struct NullTerminal {
    pub printed: String,
}

impl Terminal for NullTerminal {
    fn getc(&mut self, _wait: bool) -> Option<u8> {
        None
    }

    fn echo(&mut self, _c: u8) {}

    fn print(&mut self, s: &str) {
        self.printed.push_str(s);
    }

    fn read_cmd(&mut self) -> TecoResult<String> {
        Ok(String::new())
    }
}
