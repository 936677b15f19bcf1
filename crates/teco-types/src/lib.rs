//! Shared primitive types for the TECO engine: the sentinel operand values,
//! the error enumeration and its throw channel, the numeric radix, and
//! Q-register name resolution. Every other crate in the workspace depends on
//! this one; it depends on nothing.

mod error;
mod qreg_id;
mod radix;

pub use error::{EmptyErrorCatalog, ErrorCatalog, TecoError, TecoResult};
pub use qreg_id::{QREG_BANK_SIZE, QRegId};
pub use radix::Radix;

/// An evaluated expression result, or a command's `m`/`n` argument. Matches
/// the source's `int_t` in its 64-bit configuration (see design notes: the
/// 64-bit branch is canonical, the 16-bit branch is reserved and inactive).
pub type Operand = i64;

/// Sentinel pushed by commands that report "condition held".
pub const SUCCESS: Operand = -1;

/// Sentinel pushed by commands that report "condition failed".
pub const FAILURE: Operand = 0;

/// Default bound on [`crate`]-level push-down list depth (`MQX`).
pub const DEFAULT_MQX: usize = 64;

/// Default bound on nested macro invocation depth (`MMX`).
pub const DEFAULT_MMX: usize = 64;
