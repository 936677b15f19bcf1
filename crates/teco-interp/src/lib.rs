//! `Interp`: the concrete [`Engine`] that owns every piece of state named by
//! the component design (spec §3), and the read-scan-evaluate-execute
//! driver (spec §4.1, §4.7, §4.6) that wires the dispatch table
//! (`teco-exec::build_table`) to it.
//!
//! Spec §9 calls for re-architecting the source's global mutable state
//! ("`radix`, flags, `dot`, `z`, `loop_head`, `if_depth`, `jump_main`") as a
//! single owned value; this is that value. External collaborators (a real
//! edit buffer, a real terminal) are supplied at construction time as trait
//! objects, so the driver itself never depends on a concrete terminal or
//! file-backed buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use teco_buffer::{EditBuffer, VecBuffer};
use teco_exec::{CommandTable, build_table};
use teco_keymap::{
    CmdBuf, CmdState, CommandDescriptor, Engine, ExprStack, IfStack, LoopStack, NullTerminal,
    Terminal,
};
use teco_qreg::{PushdownList, QRegBank};
use teco_types::{DEFAULT_MMX, DEFAULT_MQX, Radix, TecoError, TecoResult};

/// The dispatch table is fixed at build time (spec §9: "dispatch via
/// function-pointer table... fixed at build time") and depends on nothing
/// instance-specific, so it lives behind a lazily-initialized static
/// rather than as an `Interp` field. `CommandTable::resolve` takes `&mut
/// dyn Engine`, and `Interp` is itself the `Engine` implementation; an
/// instance-owned table would alias `self` for the duration of every
/// dispatch call, which the borrow checker rejects. A `'static` table
/// sidesteps that without reaching for interior mutability or unsafe code.
fn table() -> &'static CommandTable {
    static TABLE: OnceLock<CommandTable> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

/// One saved macro invocation (spec §4.5): the caller's `CmdBuf` plus the
/// loop/if depths to restore when the invoked text runs out or `F>` forces
/// an early exit.
struct MacroFrame {
    cmdbuf: CmdBuf,
    loop_base: usize,
    if_base: usize,
    propagate_colon: bool,
}

/// Configurable bounds, normally supplied by `teco-config` (spec §10.3).
/// Defaults match the glossary's built-in constants.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Bound on `PushdownList` depth (`MQX`).
    pub mqx: usize,
    /// Bound on nested macro invocation depth (`MMX`).
    pub mmx: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { mqx: DEFAULT_MQX, mmx: DEFAULT_MMX }
    }
}

/// The interpreter. One value per independent TECO session; nothing here
/// is shared across instances except the static dispatch table.
pub struct Interp {
    expr: ExprStack,
    cmdbuf: CmdBuf,
    loops: LoopStack,
    ifs: IfStack,
    qregs: QRegBank,
    pushdown: PushdownList,
    buffer: Box<dyn EditBuffer>,
    terminal: Box<dyn Terminal>,
    radix: Radix,
    trace_mode: bool,
    ctrl_c: Arc<AtomicBool>,
    macros: Vec<MacroFrame>,
    loop_base: usize,
    if_base: usize,
    mmx: usize,
    cmd: CommandDescriptor,
    last_error: Option<TecoError>,
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl Interp {
    /// A ready-to-use interpreter over an in-memory buffer and a terminal
    /// that discards output — suitable for running macros that must not
    /// touch the console, and for tests.
    pub fn new() -> Self {
        Self::with_buffer_and_terminal(
            Box::new(VecBuffer::new()),
            Box::new(NullTerminal::default()),
            Limits::default(),
        )
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self::with_buffer_and_terminal(
            Box::new(VecBuffer::new()),
            Box::new(NullTerminal::default()),
            limits,
        )
    }

    /// Construct with caller-supplied external collaborators (spec §6): a
    /// real edit buffer and a real terminal, typically `teco-term`'s
    /// crossterm-backed implementation wired up by `teco-bin`.
    pub fn with_buffer_and_terminal(
        buffer: Box<dyn EditBuffer>,
        terminal: Box<dyn Terminal>,
        limits: Limits,
    ) -> Self {
        Self {
            expr: ExprStack::new(),
            cmdbuf: CmdBuf::new(""),
            loops: LoopStack::new(),
            ifs: IfStack::new(),
            qregs: QRegBank::new(),
            pushdown: PushdownList::new(limits.mqx),
            buffer,
            terminal,
            radix: Radix::Decimal,
            trace_mode: false,
            ctrl_c: Arc::new(AtomicBool::new(false)),
            macros: Vec::new(),
            loop_base: 0,
            if_base: 0,
            mmx: limits.mmx,
            cmd: CommandDescriptor::new(),
            last_error: None,
        }
    }

    /// A clone of the CTRL/C flag, meant to be set from a signal handler
    /// installed by the binary (spec §5: "an interrupt handler that sets
    /// a single atomic flag"). The driver only ever reads and clears it.
    pub fn ctrl_c_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.ctrl_c)
    }

    /// The error trapped by the most recent failing [`Self::execute_str`]
    /// call, for a caller's `?`/`/` presentation (spec §6/§7 — the wording
    /// of the catalog itself is an external collaborator's concern; this
    /// is the narrow retrieval the core owns).
    pub fn last_error(&self) -> Option<&TecoError> {
        self.last_error.as_ref()
    }

    pub fn qregs(&self) -> &QRegBank {
        &self.qregs
    }

    pub fn buffer(&self) -> &dyn EditBuffer {
        self.buffer.as_ref()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.depth()
    }

    pub fn if_depth(&self) -> usize {
        self.ifs.depth()
    }

    pub fn pushdown_depth(&self) -> usize {
        self.pushdown.depth()
    }

    pub fn macro_depth(&self) -> usize {
        self.macros.len()
    }

    /// Run one top-level command string to completion (spec §4.6: "a trap
    /// boundary around each top-level command"). On the first error at any
    /// depth — top level or inside a nested macro — every transient stack
    /// is unwound back to the depth it had when this call started (spec §8
    /// invariant 3), and nothing from the partially-executed command or
    /// macro survives the trap. Depths from *before* this call — e.g. a
    /// `[q` left open by an earlier, successfully-completed call in a REPL
    /// session — are untouched, since they were never part of the command
    /// that just failed.
    pub fn execute_str(&mut self, source: &str) -> TecoResult<()> {
        self.cmdbuf = CmdBuf::new(source);
        let loop_depth0 = self.loops.depth();
        let if_depth0 = self.ifs.depth();
        let pushdown_depth0 = self.pushdown.depth();
        let result = self.run();
        if let Err(ref err) = result {
            self.trap(err, loop_depth0, if_depth0, pushdown_depth0);
        }
        result
    }

    fn trap(&mut self, err: &TecoError, loop_depth0: usize, if_depth0: usize, pushdown_depth0: usize) {
        tracing::warn!(target: "interp.error", code = err.code(), "command trapped");
        self.expr.reset();
        self.loops.truncate(loop_depth0);
        self.ifs.truncate(if_depth0);
        self.pushdown.truncate(pushdown_depth0);
        self.macros.clear();
        self.cmd.reset();
        self.loop_base = loop_depth0;
        self.if_base = if_depth0;
        self.last_error = Some(err.clone());
    }

    fn run(&mut self) -> TecoResult<()> {
        loop {
            if self.ctrl_c.swap(false, Ordering::SeqCst) {
                return Err(TecoError::Xab);
            }
            if self.cmdbuf.at_end() {
                if teco_exec::finish_macro_exit(self).is_some() {
                    continue;
                }
                return Ok(());
            }
            self.step()?;
        }
    }

    /// Scan and, if the character completes a command, execute it (spec
    /// §4.1's scan states: `NULL -> EXPR_IN_PROGRESS -> DONE`). An
    /// operand-producing command (digit, operator, `.`, a bare modifier
    /// like `:`/`@`) only updates `cmd` and the expression stack; an
    /// action command resolves its `n` argument from whatever expression
    /// is pending, runs, and resets both `cmd` and the expression stack
    /// for the next top-level command.
    fn step(&mut self) -> TecoResult<()> {
        let c = self.cmdbuf.next_char().expect("caller checked at_end");
        let mut cmd = std::mem::take(&mut self.cmd);
        match self.dispatch_one(c, &mut cmd) {
            Ok(true) => {
                cmd.reset();
                self.expr.reset();
                self.cmd = cmd;
                Ok(())
            }
            Ok(false) => {
                self.cmd = cmd;
                Ok(())
            }
            Err(e) => {
                self.cmd = CommandDescriptor::new();
                Err(e)
            }
        }
    }

    /// Returns `Ok(true)` if `c` completed an action command (and it ran),
    /// `Ok(false)` if it only extended the in-progress expression/modifier
    /// state (spec §4.1).
    ///
    /// The resolved entry's `opts` are consulted by its own `scan_fn` to
    /// decide which modifiers/arguments to consume; the driver does not
    /// additionally enforce them against `cmd`. Spec §8 scenario S2 (`m`
    /// silently discarded by a command that doesn't use it) is the reason:
    /// a generic "unused modifier is an error" policy would contradict
    /// that worked example, so unused `m`/`n` are left to whichever
    /// handler does or doesn't read them.
    fn dispatch_one(&mut self, c: char, cmd: &mut CommandDescriptor) -> TecoResult<bool> {
        let entry = table().resolve(self, c, cmd)?;
        if let Some(scan) = entry.scan {
            scan(self, cmd)?;
        }
        let Some(exec) = entry.exec else {
            cmd.state = CmdState::ExprInProgress;
            return Ok(false);
        };
        if !cmd.n_set {
            if let Some(v) = self.expr.finish()? {
                cmd.n_set = true;
                cmd.n_arg = v;
            }
        }
        cmd.state = CmdState::Done;
        tracing::debug!(
            target: "interp.dispatch",
            c1 = %cmd.c1,
            c2 = %cmd.c2,
            n = cmd.n_arg,
            n_set = cmd.n_set,
            colon = cmd.colon,
            "dispatch"
        );
        exec(self, cmd)?;
        Ok(true)
    }
}

impl Engine for Interp {
    fn expr(&mut self) -> &mut ExprStack {
        &mut self.expr
    }

    fn cmdbuf(&mut self) -> &mut CmdBuf {
        &mut self.cmdbuf
    }

    fn loops(&mut self) -> &mut LoopStack {
        &mut self.loops
    }

    fn ifs(&mut self) -> &mut IfStack {
        &mut self.ifs
    }

    fn qregs(&mut self) -> &mut QRegBank {
        &mut self.qregs
    }

    fn pushdown(&mut self) -> &mut PushdownList {
        &mut self.pushdown
    }

    fn buffer(&mut self) -> &mut dyn EditBuffer {
        self.buffer.as_mut()
    }

    fn terminal(&mut self) -> &mut dyn Terminal {
        self.terminal.as_mut()
    }

    fn radix(&self) -> Radix {
        self.radix
    }

    fn set_radix(&mut self, radix: Radix) {
        self.radix = radix;
    }

    fn trace_mode(&self) -> bool {
        self.trace_mode
    }

    fn set_trace_mode(&mut self, on: bool) {
        self.trace_mode = on;
    }

    fn ctrl_c_pending(&self) -> bool {
        self.ctrl_c.load(Ordering::SeqCst)
    }

    fn clear_ctrl_c(&mut self) {
        self.ctrl_c.store(false, Ordering::SeqCst);
    }

    fn macro_depth(&self) -> usize {
        self.macros.len()
    }

    fn enter_macro(&mut self, text: String, propagate_colon: bool) -> TecoResult<()> {
        if self.macros.len() >= self.mmx {
            return Err(TecoError::Mmx);
        }
        let saved = MacroFrame {
            cmdbuf: std::mem::replace(&mut self.cmdbuf, CmdBuf::new(text)),
            loop_base: self.loop_base,
            if_base: self.if_base,
            propagate_colon,
        };
        self.loop_base = self.loops.depth();
        self.if_base = self.ifs.depth();
        tracing::trace!(target: "interp.macro", depth = self.macros.len() + 1, "enter");
        self.macros.push(saved);
        Ok(())
    }

    fn exit_macro(&mut self) -> Option<bool> {
        let frame = self.macros.pop()?;
        tracing::trace!(target: "interp.macro", depth = self.macros.len(), "exit");
        self.cmdbuf = frame.cmdbuf;
        self.loop_base = frame.loop_base;
        self.if_base = frame.if_base;
        Some(frame.propagate_colon)
    }

    fn loop_base(&self) -> usize {
        self.loop_base
    }

    fn if_base(&self) -> usize {
        self.if_base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use teco_types::QRegId;

    fn id(c: char) -> QRegId {
        QRegId::global(c).unwrap()
    }

    /// Records everything printed, so tests can assert on terminal output
    /// without the interpreter exposing a concrete terminal type.
    #[derive(Clone, Default)]
    struct RecordingTerminal {
        buf: Rc<RefCell<String>>,
    }

    impl Terminal for RecordingTerminal {
        fn getc(&mut self, _wait: bool) -> Option<u8> {
            None
        }
        fn echo(&mut self, _c: u8) {}
        fn print(&mut self, s: &str) {
            self.buf.borrow_mut().push_str(s);
        }
        fn read_cmd(&mut self) -> TecoResult<String> {
            Ok(String::new())
        }
    }

    fn recording_interp() -> (Interp, Rc<RefCell<String>>) {
        let term = RecordingTerminal::default();
        let handle = term.buf.clone();
        let interp = Interp::with_buffer_and_terminal(
            Box::new(VecBuffer::new()),
            Box::new(term),
            Limits::default(),
        );
        (interp, handle)
    }

    #[test]
    fn s1_finite_loop_increments_register() {
        let mut interp = Interp::new();
        interp.execute_str("5<%A>").unwrap();
        assert_eq!(interp.qregs().get(id('A')).integer, 5);
        assert_eq!(interp.loop_depth(), 0);
    }

    #[test]
    fn s2_unused_m_argument_is_discarded() {
        let (mut interp, out) = recording_interp();
        interp.execute_str("10,20U1Q1=").unwrap();
        assert_eq!(interp.qregs().get(id('1')).integer, 20);
        assert_eq!(out.borrow().as_str(), "20\n");
    }

    #[test]
    fn s3_false_conditional_runs_else_branch() {
        let (mut interp, out) = recording_interp();
        interp.execute_str("15\"E^Ayes\x1b|^Ano\x1b'").unwrap();
        assert_eq!(out.borrow().as_str(), "no");
        assert_eq!(interp.if_depth(), 0);
    }

    #[test]
    fn s4_colon_exits_infinite_loop_on_nonnegative_n() {
        let mut interp = Interp::new();
        interp.execute_str("<1;>").unwrap();
        assert_eq!(interp.loop_depth(), 0);
    }

    #[test]
    fn s5_pushdown_restores_prior_register_value() {
        let (mut interp, out) = recording_interp();
        interp.qregs_mut_for_test().set_integer(id('A'), 7);
        interp.execute_str("[A42UA]AQA=").unwrap();
        assert_eq!(interp.qregs().get(id('A')).integer, 7);
        assert_eq!(out.borrow().as_str(), "7\n");
    }

    #[test]
    fn s6_atsign_selects_alternate_text_delimiter() {
        let (mut interp, out) = recording_interp();
        interp.execute_str("@^A/hello/").unwrap();
        assert_eq!(out.borrow().as_str(), "hello");
    }

    #[test]
    fn division_by_zero_traps_and_resets() {
        let mut interp = Interp::new();
        let err = interp.execute_str("5/0=").unwrap_err();
        assert_eq!(err, TecoError::Div);
        assert_eq!(interp.last_error(), Some(&TecoError::Div));
    }

    #[test]
    fn trap_only_unwinds_to_depth_at_call_start() {
        let mut interp = Interp::new();
        interp.execute_str("[A").unwrap();
        assert_eq!(interp.pushdown_depth(), 1);
        let err = interp.execute_str(">").unwrap_err();
        assert_eq!(err, TecoError::Mla);
        // The earlier call's pushdown entry predates this failing call and
        // must survive the trap.
        assert_eq!(interp.pushdown_depth(), 1);
    }

    #[test]
    fn unmatched_close_angle_is_mla() {
        let mut interp = Interp::new();
        let err = interp.execute_str(">").unwrap_err();
        assert_eq!(err, TecoError::Mla);
    }

    #[test]
    fn zero_count_loop_skips_body_without_executing_it() {
        let mut interp = Interp::new();
        // The body is never dispatched during a dry-run skip, so it can
        // contain characters that would otherwise be illegal commands.
        interp.execute_str("0<@@@>").unwrap();
        assert_eq!(interp.loop_depth(), 0);
    }

    #[test]
    fn pushdown_overflow_is_pdo_and_unchanged() {
        let mut interp = Interp::with_limits(Limits { mqx: 1, mmx: DEFAULT_MMX });
        let err = interp.execute_str("[A[B").unwrap_err();
        assert_eq!(err, TecoError::Pdo);
        assert_eq!(interp.pushdown_depth(), 0);
    }

    #[test]
    fn macro_invocation_runs_then_returns() {
        let (mut interp, out) = recording_interp();
        interp.qregs_mut_for_test().set_text(id('A'), "^Ahi\x1b".to_string());
        interp.execute_str("MA").unwrap();
        assert_eq!(out.borrow().as_str(), "hi");
        assert_eq!(interp.macro_depth(), 0);
    }

    #[test]
    fn nested_macro_depth_exceeded_is_mmx() {
        let mut interp = Interp::with_limits(Limits { mqx: DEFAULT_MQX, mmx: 1 });
        interp.qregs_mut_for_test().set_text(id('A'), "MA".to_string());
        let err = interp.execute_str("MA").unwrap_err();
        assert_eq!(err, TecoError::Mmx);
        assert_eq!(interp.macro_depth(), 0);
    }

    #[test]
    fn radix_round_trips_through_backslash() {
        let (mut interp, out) = recording_interp();
        interp.execute_str("123\\").unwrap(); // insert "123", dot lands at 3
        interp.execute_str("0J").unwrap(); // jump back to the start
        interp.execute_str("\\=").unwrap(); // read the digit run back, print it
        assert_eq!(out.borrow().as_str(), "123\n");
    }

    impl Interp {
        /// Test-only escape hatch for pre-seeding Q-register state before
        /// running a command string.
        fn qregs_mut_for_test(&mut self) -> &mut QRegBank {
            &mut self.qregs
        }
    }
}
