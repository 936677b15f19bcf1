//! The `Engine` trait: the surface every `scan_fn`/`exec_fn` in the
//! dispatch table is written against (spec §9 "dispatch via
//! function-pointer table" / "global mutable interpreter state").
//!
//! Handlers live in `teco-exec`, which depends only on this trait —
//! `teco-interp::Interp` is the one production implementation, but the
//! indirection lets a handler be unit-tested against a lightweight fake
//! without pulling in the whole driver.

use teco_buffer::EditBuffer;
use teco_qreg::{PushdownList, QRegBank};
use teco_types::Radix;

use crate::{CmdBuf, ExprStack, IfStack, LoopStack, Terminal};

pub trait Engine {
    fn expr(&mut self) -> &mut ExprStack;
    fn cmdbuf(&mut self) -> &mut CmdBuf;
    fn loops(&mut self) -> &mut LoopStack;
    fn ifs(&mut self) -> &mut IfStack;
    fn qregs(&mut self) -> &mut QRegBank;
    fn pushdown(&mut self) -> &mut PushdownList;
    fn buffer(&mut self) -> &mut dyn EditBuffer;
    fn terminal(&mut self) -> &mut dyn Terminal;

    fn radix(&self) -> Radix;
    fn set_radix(&mut self, radix: Radix);

    fn trace_mode(&self) -> bool;
    fn set_trace_mode(&mut self, on: bool);

    fn ctrl_c_pending(&self) -> bool;
    fn clear_ctrl_c(&mut self);

    /// Current nested-macro depth, for the `MMX` bound (spec §4.5).
    fn macro_depth(&self) -> usize;

    /// `Mq` — push a new macro frame over `text` and make it the active
    /// `CmdBuf`. `propagate_colon` records whether the invocation was
    /// `:Mq`, so `exit_macro` knows whether to report it back on return.
    /// Fails with `E_MMX` past the configured depth.
    fn enter_macro(&mut self, text: String, propagate_colon: bool) -> teco_types::TecoResult<()>;

    /// Pop the active macro frame and restore the caller's `CmdBuf`,
    /// loop/if depths, and push-down save point. Called by the driver
    /// when a macro's `CmdBuf` is exhausted, or by `F>` to force an early
    /// exit. Returns `None` if there was no macro frame to pop (i.e. we
    /// are at the top level); otherwise `Some(propagate_colon)` echoing
    /// the flag passed to the matching `enter_macro`, so a `:M` caller
    /// that pops a frame with nothing left on the expression stack can
    /// push `FAILURE` in its place.
    fn exit_macro(&mut self) -> Option<bool>;

    /// Whether `<`/`F<` (and `>`/`F>`) at the current position belong to
    /// the active macro frame's own loop, vs. having to be treated as
    /// bounded by the frame boundary (spec §4.5: loop-depth starts at the
    /// macro's recorded base).
    fn loop_base(&self) -> usize;
    fn if_base(&self) -> usize;
}
