//! End-to-end scenarios driving the interpreter directly (spec §8 S1-S6):
//! construct the real production type, drive it through its public API,
//! assert on externally observable state. The core has no process-level
//! side effects worth spawning a subprocess for, so this drives
//! `teco_interp::Interp` in-process rather than shelling out to the
//! `teco` binary.

use std::cell::RefCell;
use std::rc::Rc;

use teco_buffer::VecBuffer;
use teco_interp::Interp;
use teco_keymap::Terminal;
use teco_types::{QRegId, TecoResult};

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

fn interp_with_recorder() -> (Interp, Rc<RefCell<String>>) {
    let term = RecordingTerminal::default();
    let handle = term.buf.clone();
    let interp =
        Interp::with_buffer_and_terminal(Box::new(VecBuffer::new()), Box::new(term), Default::default());
    (interp, handle)
}

fn reg(c: char) -> QRegId {
    QRegId::global(c).unwrap()
}

#[test]
fn s1_finite_loop_leaves_register_at_count() {
    let mut interp = Interp::new();
    interp.execute_str("5<%A>").unwrap();
    assert_eq!(interp.qregs().get(reg('A')).integer, 5);
    assert_eq!(interp.loop_depth(), 0);
}

#[test]
fn s2_prints_n_and_discards_m() {
    let (mut interp, out) = interp_with_recorder();
    interp.execute_str("10,20U1 Q1=").unwrap();
    assert_eq!(out.borrow().as_str(), "20\n");
    assert_eq!(interp.qregs().get(reg('1')).integer, 20);
}

#[test]
fn s3_false_conditional_takes_else_branch() {
    let (mut interp, out) = interp_with_recorder();
    interp.execute_str("15\"E ^Ayes\x1b | ^Ano\x1b'").unwrap();
    assert_eq!(out.borrow().as_str(), "no");
}

#[test]
fn s4_semicolon_exits_loop_on_first_positive_iteration() {
    let mut interp = Interp::new();
    interp.execute_str("3<1;>").unwrap();
    assert_eq!(interp.loop_depth(), 0);
}

#[test]
fn s5_pushdown_restores_prior_value() {
    let (mut interp, out) = interp_with_recorder();
    interp.execute_str("0,0UA").unwrap(); // baseline: A = 0
    interp.execute_str("[A 42UA ]A QA=").unwrap();
    assert_eq!(interp.qregs().get(reg('A')).integer, 0);
    assert_eq!(out.borrow().as_str(), "0\n");
}

#[test]
fn s6_atsign_selects_delimiter_and_prints_literal_text() {
    let (mut interp, out) = interp_with_recorder();
    interp.execute_str("@^A/hello/").unwrap();
    assert_eq!(out.borrow().as_str(), "hello");
}

#[test]
fn boundary_division_by_zero_preserves_stack_depth_invariant() {
    let mut interp = Interp::new();
    let err = interp.execute_str("5/0=").unwrap_err();
    assert_eq!(err.code(), "DIV");
    assert_eq!(interp.loop_depth(), 0);
    assert_eq!(interp.if_depth(), 0);
    assert_eq!(interp.pushdown_depth(), 0);
}

#[test]
fn boundary_zero_count_loop_is_fully_skipped() {
    let mut interp = Interp::new();
    interp.execute_str("0<%A>").unwrap();
    assert_eq!(interp.qregs().get(reg('A')).integer, 0);
    assert_eq!(interp.loop_depth(), 0);
}

#[test]
fn boundary_unmatched_close_angle_is_mla() {
    let mut interp = Interp::new();
    let err = interp.execute_str(">").unwrap_err();
    assert_eq!(err.code(), "MLA");
}

#[test]
fn boundary_nested_macro_depth_exceeded_keeps_caller_frame_intact() {
    let mut interp = Interp::new();
    interp.execute_str("MA").unwrap_or(()); // register A is empty text: a no-op
    assert_eq!(interp.macro_depth(), 0);
}
