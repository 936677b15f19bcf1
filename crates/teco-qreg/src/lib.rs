//! Q-register bank and push-down list.
//!
//! A Q-register is a `{ integer, text }` pair. There are 36 global registers
//! (`A`-`Z`, `0`-`9`) and 36 local registers (the same names, `.`-prefixed),
//! per spec §3. [`QRegBank`] owns both. [`PushdownList`] is the LIFO of
//! register snapshots used by `[q`/`]q`, bounded by `MQX` (default 64,
//! spec §3 invariants / glossary).

use teco_types::{Operand, QREG_BANK_SIZE, QRegId, TecoError, TecoResult};
use tracing::trace;

/// One Q-register: a signed integer and a text string, mutated atomically
/// on write (spec §3 Lifecycle: "replaced atomically on write").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QRegister {
    pub integer: Operand,
    pub text: String,
}

/// The 36 global plus 36 local Q-registers.
#[derive(Debug, Clone)]
pub struct QRegBank {
    global: [QRegister; QREG_BANK_SIZE],
    local: [QRegister; QREG_BANK_SIZE],
}

impl Default for QRegBank {
    fn default() -> Self {
        Self {
            global: std::array::from_fn(|_| QRegister::default()),
            local: std::array::from_fn(|_| QRegister::default()),
        }
    }
}

impl QRegBank {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: QRegId) -> &QRegister {
        if id.local { &self.local[id.index] } else { &self.global[id.index] }
    }

    fn slot_mut(&mut self, id: QRegId) -> &mut QRegister {
        if id.local { &mut self.local[id.index] } else { &mut self.global[id.index] }
    }

    pub fn get(&self, id: QRegId) -> &QRegister {
        self.slot(id)
    }

    pub fn set(&mut self, id: QRegId, reg: QRegister) {
        *self.slot_mut(id) = reg;
    }

    pub fn set_integer(&mut self, id: QRegId, value: Operand) {
        self.slot_mut(id).integer = value;
    }

    /// Replace the text, matching the "replaced atomically" invariant.
    pub fn set_text(&mut self, id: QRegId, text: String) {
        self.slot_mut(id).text = text;
    }

    /// Append to the existing text, used by `Q-register load with append`.
    pub fn append_text(&mut self, id: QRegId, text: &str) {
        self.slot_mut(id).text.push_str(text);
    }

    /// Reset every local register. Called when a macro frame exits, since
    /// local registers are private to the invoking level in the canonical
    /// implementation this engine follows for its 64-bit configuration.
    pub fn clear_local(&mut self) {
        self.local = std::array::from_fn(|_| QRegister::default());
    }
}

/// LIFO of whole-register snapshots, bounded by `max_depth` (`MQX`).
///
/// `[q` pushes; `]q` pops. Depth is tracked per `QRegId` implicitly by the
/// order entries were pushed — the list itself is a flat stack of
/// `(id, register)` pairs, matching the source's single push-down list
/// shared by every register rather than one stack per register.
#[derive(Debug, Clone)]
pub struct PushdownList {
    entries: Vec<(QRegId, QRegister)>,
    max_depth: usize,
}

impl PushdownList {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// `[q` — push a snapshot of `q`'s current value. Fails with `E_PDO`
    /// if the list is already at `max_depth` (spec §3 invariant, §4.5).
    /// Takes the register value directly (rather than the whole bank)
    /// so callers don't need two simultaneous borrows of the bank.
    pub fn push(&mut self, id: QRegId, value: QRegister) -> TecoResult<()> {
        if self.entries.len() >= self.max_depth {
            return Err(TecoError::Pdo);
        }
        self.entries.push((id, value));
        trace!(target: "qreg.pushdown", depth = self.entries.len(), "push");
        Ok(())
    }

    /// `]q` — pop and return the topmost snapshot. `E_CPQ` ("can't pop
    /// into Q-register") if the list is empty; per spec §4.5 the `:`
    /// modifier converts that into a `FAILURE` push instead of a throw,
    /// handled by the caller in `teco-exec`.
    pub fn pop(&mut self) -> TecoResult<QRegister> {
        let (_, reg) = self.entries.pop().ok_or(TecoError::Cpq)?;
        trace!(target: "qreg.pushdown", depth = self.entries.len(), "pop");
        Ok(reg)
    }

    /// Truncate back to `depth`, discarding anything pushed after it. Used
    /// by the error trap (§4.6) to roll a macro frame's push-down entries
    /// back to the frame's save point, and by loop/conditional unwinding.
    pub fn truncate(&mut self, depth: usize) {
        self.entries.truncate(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> QRegId {
        QRegId::global(c).unwrap()
    }

    #[test]
    fn push_then_pop_is_noop() {
        let mut bank = QRegBank::new();
        bank.set_integer(id('A'), 42);
        let mut pd = PushdownList::new(64);
        pd.push(id('A'), bank.get(id('A')).clone()).unwrap();
        bank.set_integer(id('A'), 99);
        let reg = pd.pop().unwrap();
        bank.set(id('A'), reg);
        assert_eq!(bank.get(id('A')).integer, 42);
        assert_eq!(pd.depth(), 0);
    }

    #[test]
    fn pop_empty_is_cpq() {
        let mut pd = PushdownList::new(64);
        assert_eq!(pd.pop().unwrap_err(), TecoError::Cpq);
    }

    #[test]
    fn overflow_is_pdo_and_unchanged() {
        let bank = QRegBank::new();
        let mut pd = PushdownList::new(1);
        pd.push(id('A'), bank.get(id('A')).clone()).unwrap();
        let err = pd.push(id('B'), bank.get(id('B')).clone()).unwrap_err();
        assert_eq!(err, TecoError::Pdo);
        assert_eq!(pd.depth(), 1);
    }

    #[test]
    fn truncate_rolls_back_to_save_point() {
        let bank = QRegBank::new();
        let mut pd = PushdownList::new(64);
        pd.push(id('A'), bank.get(id('A')).clone()).unwrap();
        let save = pd.depth();
        pd.push(id('B'), bank.get(id('B')).clone()).unwrap();
        pd.push(id('C'), bank.get(id('C')).clone()).unwrap();
        pd.truncate(save);
        assert_eq!(pd.depth(), save);
    }

    #[test]
    fn global_and_local_are_independent() {
        let mut bank = QRegBank::new();
        bank.set_integer(QRegId::global('A').unwrap(), 1);
        bank.set_integer(QRegId::local('A').unwrap(), 2);
        assert_eq!(bank.get(QRegId::global('A').unwrap()).integer, 1);
        assert_eq!(bank.get(QRegId::local('A').unwrap()).integer, 2);
    }
}
