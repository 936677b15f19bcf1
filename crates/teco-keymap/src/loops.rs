//! Loop and conditional nesting state (spec §3 "Loop frame"/"If frame",
//! §4.3, §4.4). Both are plain LIFO structures; the interesting behavior
//! (dry-run skipping, rewind-on-`>`) lives in the `<`/`>`/`"`/`|`/`'`
//! handlers in `teco-exec`, which drive these stacks.

use teco_types::{TecoError, TecoResult};

/// One open `<...>` loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// `CmdBuf` position just after the opening `<`, rewound to on each
    /// iteration.
    pub start: usize,
    /// Remaining iteration count, or `-1` for an infinite (count-less)
    /// loop.
    pub remaining: i64,
    /// `IfStack` depth at the moment this loop was entered; the loop must
    /// close with the if-stack back at this depth (spec §3 invariant).
    pub if_depth_at_entry: usize,
}

impl LoopFrame {
    pub fn is_infinite(&self) -> bool {
        self.remaining < 0
    }
}

/// LIFO of open loops, innermost on top.
#[derive(Debug, Clone, Default)]
pub struct LoopStack(Vec<LoopFrame>);

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, frame: LoopFrame) {
        self.0.push(frame);
    }

    pub fn pop(&mut self) -> Option<LoopFrame> {
        self.0.pop()
    }

    pub fn top(&self) -> Option<&LoopFrame> {
        self.0.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut LoopFrame> {
        self.0.last_mut()
    }

    /// Discard frames above `depth`, e.g. on error unwind (spec §4.6) or
    /// when a macro frame exits without closing its own loops.
    pub fn truncate(&mut self, depth: usize) {
        self.0.truncate(depth);
    }
}

/// Conditional nesting depth (spec §3 "If frame": "a counter (depth) plus
/// a recovery policy"). `"` increments, `'` decrements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IfStack(usize);

impl IfStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.0
    }

    pub fn enter(&mut self) {
        self.0 += 1;
    }

    /// `'` — close one level. `E_MSC` ("missing start of conditional") if
    /// nothing is open.
    pub fn exit(&mut self) -> TecoResult<()> {
        self.0 = self.0.checked_sub(1).ok_or(TecoError::Msc)?;
        Ok(())
    }

    pub fn truncate(&mut self, depth: usize) {
        self.0 = depth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_stack_lifo() {
        let mut s = LoopStack::new();
        s.push(LoopFrame { start: 0, remaining: 3, if_depth_at_entry: 0 });
        s.push(LoopFrame { start: 10, remaining: -1, if_depth_at_entry: 0 });
        assert_eq!(s.depth(), 2);
        assert!(s.top().unwrap().is_infinite());
        s.pop();
        assert_eq!(s.depth(), 1);
        assert_eq!(s.top().unwrap().start, 0);
    }

    #[test]
    fn if_stack_balances() {
        let mut ifs = IfStack::new();
        ifs.enter();
        ifs.enter();
        assert_eq!(ifs.depth(), 2);
        ifs.exit().unwrap();
        assert_eq!(ifs.depth(), 1);
        ifs.exit().unwrap();
        assert_eq!(ifs.exit(), Err(TecoError::Msc));
    }

    #[test]
    fn truncate_rolls_back_on_error() {
        let mut s = LoopStack::new();
        s.push(LoopFrame { start: 0, remaining: -1, if_depth_at_entry: 0 });
        let save = s.depth();
        s.push(LoopFrame { start: 1, remaining: -1, if_depth_at_entry: 0 });
        s.truncate(save);
        assert_eq!(s.depth(), save);
    }
}
