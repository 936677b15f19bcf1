//! The expression stack (spec §3 "Expression stack entry", §4.2).
//!
//! A classic two-stack shunting-yard evaluator: operands on one vec,
//! operators (and `(` sentinels) on another. Every operator push reduces
//! any already-stacked operator of greater-or-equal precedence before the
//! new one is pushed, so the stack never holds more than one pending
//! operator per precedence level — evaluation is complete by the time the
//! command that needed the value asks for it.

use teco_types::{Operand, Radix, TecoError, TecoResult};

/// A binary arithmetic or bitwise operator, in TECO's four precedence
/// bands (spec §3: "unary ...; multiply/divide/modulo; add/subtract;
/// bitwise AND/OR", lowest to highest is the reverse of that list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

impl Operator {
    fn precedence(self) -> u8 {
        match self {
            Self::And | Self::Or => 1,
            Self::Add | Self::Sub => 2,
            Self::Mul | Self::Div | Self::Mod => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpTok {
    Op(Operator),
    LParen,
}

/// The running operand/operator stack for one top-level command's
/// expression. Reset to empty at every command boundary (spec §3
/// invariants).
#[derive(Debug, Clone, Default)]
pub struct ExprStack {
    operands: Vec<Operand>,
    operators: Vec<OpTok>,
    /// True when the next token may open a fresh operand: stack start,
    /// right after an operator, or right after `(`. Used to detect unary
    /// `+`/`-` and to gate `^_`.
    expect_operand: bool,
    /// True while a digit run is still being accumulated onto the top
    /// operand, so consecutive digit characters extend one operand
    /// instead of each pushing a new one.
    accumulating: bool,
}

impl ExprStack {
    pub fn new() -> Self {
        Self {
            expect_operand: true,
            ..Default::default()
        }
    }

    /// Drop all state; called at every command boundary (spec §3).
    pub fn reset(&mut self) {
        self.operands.clear();
        self.operators.clear();
        self.expect_operand = true;
        self.accumulating = false;
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty() && self.operators.is_empty()
    }

    /// Feed one digit of the current radix into the operand being typed,
    /// starting a new operand (or a synthesized unary `0 - n`) if none is
    /// in progress.
    pub fn push_digit(&mut self, digit: u32, radix: Radix) {
        let _ = radix;
        if self.accumulating {
            let top = self.operands.last_mut().expect("accumulating implies an operand");
            *top = top.wrapping_mul(radix.value() as Operand) + digit as Operand;
        } else {
            self.operands.push(digit as Operand);
            self.accumulating = true;
            self.expect_operand = false;
        }
    }

    /// Push a fully-formed operand, e.g. the result of `.`, `Z`, `B`, `H`,
    /// `^Y`, or a nested `(...)` group.
    pub fn push_operand(&mut self, value: Operand) {
        self.operands.push(value);
        self.accumulating = false;
        self.expect_operand = false;
    }

    /// Pop and return the most recently completed operand, if the stack
    /// currently ends in one with no dangling operator — used by `,` to
    /// snapshot `m_arg` and by the scanner to snapshot `n_arg`.
    pub fn take_operand(&mut self) -> Option<Operand> {
        if self.operators.is_empty() {
            self.accumulating = false;
            let v = self.operands.pop();
            if v.is_some() {
                self.expect_operand = true;
            }
            v
        } else {
            None
        }
    }

    pub fn push_lparen(&mut self) {
        self.operators.push(OpTok::LParen);
        self.expect_operand = true;
    }

    pub fn push_rparen(&mut self) -> TecoResult<()> {
        loop {
            match self.operators.pop() {
                Some(OpTok::LParen) => break,
                Some(OpTok::Op(op)) => self.reduce_one(op)?,
                None => return Err(TecoError::Mlp),
            }
        }
        if self.operands.is_empty() {
            return Err(TecoError::Nap);
        }
        self.accumulating = false;
        self.expect_operand = false;
        Ok(())
    }

    /// Push a binary operator, reducing anything of greater-or-equal
    /// precedence already waiting. A `+`/`-` seen while an operand is
    /// still expected is unary: synthesize a leading `0`.
    pub fn push_operator(&mut self, op: Operator) -> TecoResult<()> {
        if self.expect_operand {
            match op {
                Operator::Add | Operator::Sub => self.operands.push(0),
                _ => return Err(TecoError::Ife),
            }
        }
        while let Some(OpTok::Op(top)) = self.operators.last().copied() {
            if top.precedence() >= op.precedence() {
                self.operators.pop();
                self.reduce_one(top)?;
            } else {
                break;
            }
        }
        self.operators.push(OpTok::Op(op));
        self.accumulating = false;
        self.expect_operand = true;
        Ok(())
    }

    /// `^_` — one's complement of the operand already on top of the
    /// stack. Spec §4.2: "requires an operand already on the stack, else
    /// error NAB".
    pub fn apply_not(&mut self) -> TecoResult<()> {
        if self.expect_operand || self.operands.is_empty() {
            return Err(TecoError::Nab);
        }
        let v = self.operands.pop().unwrap();
        self.operands.push(!v);
        self.accumulating = false;
        Ok(())
    }

    fn reduce_one(&mut self, op: Operator) -> TecoResult<()> {
        let b = self.operands.pop().ok_or(TecoError::Ife)?;
        let a = self.operands.pop().ok_or(TecoError::Ife)?;
        let r = match op {
            Operator::Add => a.wrapping_add(b),
            Operator::Sub => a.wrapping_sub(b),
            Operator::Mul => a.wrapping_mul(b),
            Operator::Div => {
                if b == 0 {
                    return Err(TecoError::Div);
                }
                a.wrapping_div(b)
            }
            Operator::Mod => {
                if b == 0 {
                    return Err(TecoError::Div);
                }
                a.wrapping_rem(b)
            }
            Operator::And => a & b,
            Operator::Or => a | b,
        };
        self.operands.push(r);
        Ok(())
    }

    /// Reduce everything left and return the single resulting operand.
    /// Used when a command needs `n_arg` and the stack holds a complete
    /// expression. `Ok(None)` means no expression was typed at all.
    pub fn finish(&mut self) -> TecoResult<Option<Operand>> {
        if self.is_empty() {
            return Ok(None);
        }
        while let Some(tok) = self.operators.pop() {
            match tok {
                OpTok::Op(op) => self.reduce_one(op)?,
                OpTok::LParen => return Err(TecoError::Ife),
            }
        }
        if self.operands.len() != 1 {
            return Err(TecoError::Ife);
        }
        self.accumulating = false;
        self.expect_operand = true;
        Ok(self.operands.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(s: &ExprStack) {
        let _ = s;
    }

    #[test]
    fn simple_addition() {
        let mut s = ExprStack::new();
        s.push_digit(1, Radix::Decimal);
        s.push_digit(0, Radix::Decimal); // "10"
        s.push_operator(Operator::Add).unwrap();
        s.push_digit(5, Radix::Decimal);
        assert_eq!(s.finish().unwrap(), Some(15));
    }

    #[test]
    fn precedence_mul_before_add() {
        let mut s = ExprStack::new();
        s.push_digit(2, Radix::Decimal);
        s.push_operator(Operator::Add).unwrap();
        s.push_digit(3, Radix::Decimal);
        s.push_operator(Operator::Mul).unwrap();
        s.push_digit(4, Radix::Decimal);
        // 2 + 3*4 = 14
        assert_eq!(s.finish().unwrap(), Some(14));
    }

    #[test]
    fn unary_minus_synthesizes_zero() {
        let mut s = ExprStack::new();
        s.push_operator(Operator::Sub).unwrap();
        s.push_digit(5, Radix::Decimal);
        assert_eq!(s.finish().unwrap(), Some(-5));
    }

    #[test]
    fn division_by_zero_is_div_error() {
        let mut s = ExprStack::new();
        s.push_digit(5, Radix::Decimal);
        s.push_operator(Operator::Div).unwrap();
        s.push_digit(0, Radix::Decimal);
        assert_eq!(s.finish(), Err(TecoError::Div));
    }

    #[test]
    fn modulus_follows_dividend_sign() {
        let mut s = ExprStack::new();
        s.push_operator(Operator::Sub).unwrap();
        s.push_digit(7, Radix::Decimal);
        s.push_operator(Operator::Mod).unwrap();
        s.push_digit(2, Radix::Decimal);
        assert_eq!(s.finish().unwrap(), Some(-1)); // -7 % 2 == -1 in Rust, truncating
    }

    #[test]
    fn parens_group_before_precedence() {
        let mut s = ExprStack::new();
        s.push_lparen();
        s.push_digit(2, Radix::Decimal);
        s.push_operator(Operator::Add).unwrap();
        s.push_digit(3, Radix::Decimal);
        s.push_rparen().unwrap();
        s.push_operator(Operator::Mul).unwrap();
        s.push_digit(4, Radix::Decimal);
        assert_eq!(s.finish().unwrap(), Some(20));
    }

    #[test]
    fn not_requires_operand() {
        let mut s = ExprStack::new();
        assert_eq!(s.apply_not(), Err(TecoError::Nab));
        s.push_digit(0, Radix::Decimal);
        s.apply_not().unwrap();
        assert_eq!(s.finish().unwrap(), Some(!0));
        digits(&s);
    }

    #[test]
    fn comma_takes_completed_operand() {
        let mut s = ExprStack::new();
        s.push_digit(1, Radix::Decimal);
        s.push_digit(0, Radix::Decimal);
        assert_eq!(s.take_operand(), Some(10));
        assert!(s.is_empty());
    }
}
