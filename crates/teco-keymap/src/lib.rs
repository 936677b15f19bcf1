//! Scanning and expression-evaluation machinery shared by every command
//! handler: the expression stack, the command descriptor, the command
//! buffer, loop/conditional nesting, and the `Engine` trait the dispatch
//! table (in `teco-exec`) is written against.
//!
//! This crate holds spec §2's components 1, 2, and 4 (`ExprStack`,
//! `CmdBuf`, `LoopStack`/`IfStack`) plus the scan-time data model of
//! component 3 (`Command` descriptor, `Opts` mask). The dispatch table
//! itself — the 128-entry array of handlers — lives in `teco-exec`,
//! since building it requires knowing every command's concrete effect.

mod cmdbuf;
mod command;
mod engine;
mod expr;
mod loops;
mod terminal;

pub use cmdbuf::CmdBuf;
pub use command::{CmdState, CommandDescriptor, Opts, TextArg};
pub use engine::Engine;
pub use expr::{ExprStack, Operator};
pub use loops::{IfStack, LoopFrame, LoopStack};
pub use terminal::{NullTerminal, Terminal};
