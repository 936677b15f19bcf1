//! The command descriptor (spec §3) and the option mask each dispatch
//! table entry declares (spec §4.1).

use teco_types::{Operand, QRegId};

bitflags::bitflags! {
    /// Which modifiers/arguments a table entry accepts. Characters absent
    /// from the mask are ignored by the scanner; unexpected modifiers
    /// raise `E_MOD`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Opts: u16 {
        /// Accepts an `m` (left-of-comma) argument.
        const M      = 1 << 0;
        /// Accepts an `n` argument.
        const N      = 1 << 1;
        /// Accepts a `:` modifier.
        const COLON  = 1 << 2;
        /// Accepts a `::` modifier.
        const DCOLON = 1 << 3;
        /// Accepts an `@` modifier (alternate text delimiter).
        const ATSIGN = 1 << 4;
        /// Consumes a Q-register name argument.
        const QREG   = 1 << 5;
        /// Reserved: window/display-affecting command (spec §6 `E_NOW`).
        const WINDOW = 1 << 6;
        /// Consumes one delimited text argument.
        const TEXT1  = 1 << 7;
        /// Consumes a second delimited text argument (always follows a
        /// first, e.g. `FN`, `FS`).
        const TEXT2  = 1 << 8;
        /// Marks an operand-producing command (`.`, `Z`, `B`, `H`, `^Y`,
        /// `Q`, digits, ...): scanning stays in `ExprInProgress` rather
        /// than transitioning to `Done`.
        const OPERAND = 1 << 9;
    }
}

/// A `(offset, length)` view into the command buffer snapshot for the
/// current top-level command (spec §9: re-architected away from raw
/// pointers). Materialized to an owned `String` only when stored into a
/// Q-register or otherwise made to outlive the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextArg {
    pub start: usize,
    pub len: usize,
}

/// Scan state of the command currently being assembled (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CmdState {
    #[default]
    Null,
    ExprInProgress,
    Done,
}

/// Everything accumulated while scanning a single top-level command
/// (spec §3 "Command descriptor"). Stack-allocated, reset to default
/// after every command completes or errors.
#[derive(Debug, Clone, Default)]
pub struct CommandDescriptor {
    pub c1: char,
    pub c2: char,
    pub c3: char,
    pub m_set: bool,
    pub m_arg: Operand,
    pub n_set: bool,
    pub n_arg: Operand,
    pub colon: bool,
    pub dcolon: bool,
    pub atsign: bool,
    pub qreg: Option<QRegId>,
    pub delim: u8,
    pub text1: Option<TextArg>,
    pub text2: Option<TextArg>,
    pub state: CmdState,
}

impl CommandDescriptor {
    pub fn new() -> Self {
        Self {
            delim: 0x1b, // ESC, spec §4.1 default text delimiter
            ..Default::default()
        }
    }

    /// Reset to the null state (spec §3 invariant: "after every
    /// successfully completed command, the Command descriptor is reset").
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Resolve the effective `n` argument, defaulting per `default` when
    /// none was typed (many commands default to 1).
    pub fn n_or(&self, default: Operand) -> Operand {
        if self.n_set { self.n_arg } else { default }
    }
}
