//! Command handlers (spec §4) and the dispatch table that wires them to
//! characters (spec §4.1). Every handler here is written against the
//! [`teco_keymap::Engine`] trait, not a concrete interpreter, so it can
//! be exercised against a test double before `teco-interp::Interp`
//! exists.

mod handlers;
mod table;

pub use handlers::{build_table, finish_macro_exit};
pub use table::{CommandTable, ExecFn, ScanFn, TableEntry};
