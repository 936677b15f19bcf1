//! One `scan_fn`/`exec_fn` pair per dispatch-table entry. Grouped by the
//! spec section each command belongs to.

use teco_keymap::{CommandDescriptor, Engine, Operator, Opts};
use teco_types::{FAILURE, QRegId, Radix, SUCCESS, TecoError, TecoResult};

use crate::table::{CommandTable, TableEntry};

// ---------------------------------------------------------------------
// §4.2 Expression evaluation: digits, operators, parens, `,`, `^_`.
// ---------------------------------------------------------------------

fn scan_digit(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let radix = engine.radix();
    let d = radix.digit_value(cmd.c1).ok_or(TecoError::Iln)?;
    engine.expr().push_digit(d, radix);
    Ok(())
}

fn scan_op_add(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::Add)
}
fn scan_op_sub(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::Sub)
}
fn scan_op_mul(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::Mul)
}
fn scan_op_div(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::Div)
}
fn scan_op_and(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::And)
}
fn scan_op_or(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operator(Operator::Or)
}

fn scan_lparen(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_lparen();
    Ok(())
}

fn scan_rparen(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_rparen()
}

/// `,` — snapshot the completed operand as `m_arg` (spec §4.2).
fn scan_comma(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let v = engine.expr().take_operand().ok_or(TecoError::Nac)?;
    cmd.m_arg = v;
    cmd.m_set = true;
    Ok(())
}

/// `^_` — one's complement of the operand already on the stack.
fn scan_not(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().apply_not()
}

/// `.` — push `dot`.
fn scan_dot(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let dot = engine.buffer().dot() as teco_types::Operand;
    engine.expr().push_operand(dot);
    Ok(())
}

/// `Z` — push `z` (buffer length).
fn scan_z(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let z = engine.buffer().z() as teco_types::Operand;
    engine.expr().push_operand(z);
    Ok(())
}

/// `B` — push `0`, the beginning of the buffer.
fn scan_b(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operand(0);
    Ok(())
}

/// `H` — shorthand for `0,Z`: pushes `m_arg = 0`, then `Z` as the new
/// pending operand.
fn scan_h(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    cmd.m_arg = 0;
    cmd.m_set = true;
    let z = engine.buffer().z() as teco_types::Operand;
    engine.expr().push_operand(z);
    Ok(())
}

/// `^Y` — in the full engine this is the span of the last search match;
/// search is an out-of-scope external collaborator here (spec §1), so it
/// pushes `0` (an empty span) rather than consulting one.
fn scan_caret_y(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    engine.expr().push_operand(0);
    Ok(())
}

/// `q` as an operand: push the named Q-register's integer (`:Qq` is not
/// distinguished further here — text length would require the register
/// argument to be resolved before the colon is known, which the `:` scan
/// already records on `cmd`).
fn scan_q_operand(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let id = scan_qreg_name(engine)?;
    let reg = engine.qregs().get(id);
    let value = if cmd.colon {
        reg.text.len() as teco_types::Operand
    } else {
        reg.integer
    };
    engine.expr().push_operand(value);
    Ok(())
}

/// `^R` — with `n`, set the radix; without, push the current radix.
fn scan_caret_r(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    if let Some(n) = engine.expr().take_operand() {
        engine.set_radix(Radix::from_value(n)?);
    } else {
        let r = engine.radix().value() as teco_types::Operand;
        engine.expr().push_operand(r);
    }
    Ok(())
}

/// `\` — with an operand, insert it formatted in the current radix;
/// without, read a signed digit run from the buffer at `dot` and push
/// its value, advancing `dot` past it (spec §4.2).
fn scan_backslash(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let radix = engine.radix();
    if let Some(n) = engine.expr().take_operand() {
        let text = format_radix(n, radix);
        engine.buffer().insert(text.as_bytes());
        Ok(())
    } else {
        let mut offset: i64 = 0;
        let mut negative = false;
        if engine.buffer().getchar(0) == Some(b'-') {
            negative = true;
            offset += 1;
        } else if engine.buffer().getchar(0) == Some(b'+') {
            offset += 1;
        }
        let mut value: i64 = 0;
        let mut any = false;
        loop {
            let Some(b) = engine.buffer().getchar(offset) else { break };
            let Some(d) = radix.digit_value(b as char) else { break };
            value = value.wrapping_mul(radix.value() as i64) + d as i64;
            offset += 1;
            any = true;
        }
        if !any {
            offset = 0;
        } else if negative {
            value = -value;
        }
        let pos = engine.buffer().dot() as i64 + offset;
        engine.buffer().set_dot(pos)?;
        engine.expr().push_operand(value);
        Ok(())
    }
}

fn format_radix(n: i64, radix: Radix) -> String {
    match radix {
        Radix::Decimal => format!("{n}"),
        Radix::Octal => {
            if n < 0 {
                format!("-{:o}", -n)
            } else {
                format!("{n:o}")
            }
        }
        Radix::Hex => {
            if n < 0 {
                format!("-{:X}", -n)
            } else {
                format!("{n:X}")
            }
        }
    }
}

fn scan_qreg_name(engine: &mut dyn Engine) -> TecoResult<QRegId> {
    let c = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
    if c == '.' {
        let c2 = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
        QRegId::local(c2)
    } else {
        QRegId::global(c)
    }
}

/// Generic Q-register-consuming scan step for action commands: resolves
/// the register name into `cmd.qreg`.
fn scan_qreg_arg(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    cmd.qreg = Some(scan_qreg_name(engine)?);
    Ok(())
}

// ---------------------------------------------------------------------
// §4.5 Q-register pushdown and macros
// ---------------------------------------------------------------------

/// `n,Uq` / `Uq` — set `q`'s integer to `n` (spec: no n is `E_NAU`).
fn exec_u(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let id = cmd.qreg.expect("U scanned with QREG opt");
    let n = cmd.n_arg_required(TecoError::Nau)?;
    engine.qregs().set_integer(id, n);
    Ok(())
}

/// `n%q` — add `n` (default 1) to `q`'s integer and push the new value.
/// Kept operand-producing so further expression can chain off it (e.g.
/// `%A=`).
fn scan_percent(engine: &mut dyn Engine, _cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let n = engine.expr().take_operand().unwrap_or(1);
    let id = scan_qreg_name(engine)?;
    let v = engine.qregs().get(id).integer.wrapping_add(n);
    engine.qregs().set_integer(id, v);
    engine.expr().push_operand(v);
    Ok(())
}

/// `[q` — push `q`'s current value onto the push-down list.
fn exec_lbracket(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let id = cmd.qreg.expect("[ scanned with QREG opt");
    let reg = engine.qregs().get(id).clone();
    engine.pushdown().push(id, reg)
}

/// `]q` / `:]q` — pop the push-down list into `q`. `:` converts an empty
/// pop from `E_CPQ` into a `FAILURE` push (spec §4.5).
fn exec_rbracket(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let id = cmd.qreg.expect("] scanned with QREG opt");
    match engine.pushdown().pop() {
        Ok(reg) => {
            engine.qregs().set(id, reg);
            if cmd.colon {
                engine.expr().push_operand(SUCCESS);
            }
            Ok(())
        }
        Err(TecoError::Cpq) if cmd.colon => {
            engine.expr().push_operand(FAILURE);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// `Mq` / `:Mq` — invoke `q`'s text as a macro. Empty text is a no-op
/// (spec §8 boundary behavior).
fn exec_m(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let id = cmd.qreg.expect("M scanned with QREG opt");
    let text = engine.qregs().get(id).text.clone();
    if text.is_empty() {
        return Ok(());
    }
    engine.enter_macro(text, cmd.colon)
}

/// Invoked when a macro frame exits naturally (end of text, or `F>` at
/// the frame's own loop base). A `:M`-invoked frame that leaves nothing
/// behind pushes `FAILURE` so the caller's expression can still test it.
/// Returns whatever `Engine::exit_macro` returned, so a caller that needs
/// to know whether a frame was actually popped (the driver's top-level
/// loop, deciding whether to keep running) doesn't have to duplicate the
/// colon-propagation logic itself.
pub fn finish_macro_exit(engine: &mut dyn Engine) -> Option<bool> {
    let propagate_colon = engine.exit_macro()?;
    if propagate_colon && engine.expr().is_empty() {
        engine.expr().push_operand(FAILURE);
    }
    Some(propagate_colon)
}

// ---------------------------------------------------------------------
// §4.3 Loops
// ---------------------------------------------------------------------

/// `n<` — open a loop. `n <= 0` skips the body entirely via a
/// balanced-bracket dry run; no `n` means infinite.
fn exec_open_loop(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    if cmd.n_set && cmd.n_arg <= 0 {
        return engine.cmdbuf().skip_balanced('<', '>');
    }
    let start = engine.cmdbuf().position();
    let remaining = if cmd.n_set { cmd.n_arg } else { -1 };
    let if_depth_at_entry = engine.ifs().depth();
    engine.loops().push(teco_keymap::LoopFrame { start, remaining, if_depth_at_entry });
    Ok(())
}

/// `>` — close the loop: rewind if iterations remain, else pop.
fn exec_close_loop(engine: &mut dyn Engine, _cmd: &CommandDescriptor) -> TecoResult<()> {
    let frame = *engine.loops().top().ok_or(TecoError::Mla)?;
    if frame.is_infinite() {
        engine.cmdbuf().set_position(frame.start);
    } else {
        let remaining = frame.remaining - 1;
        if remaining > 0 {
            engine.loops().top_mut().unwrap().remaining = remaining;
            engine.cmdbuf().set_position(frame.start);
        } else {
            engine.loops().pop();
        }
    }
    Ok(())
}

/// `n;` / `n:;` — conditional loop exit (spec §4.3).
fn exec_semicolon(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    engine.loops().top().ok_or(TecoError::Sni)?;
    let n = cmd.n_arg_required(TecoError::Nas)?;
    let exit = if cmd.colon { n < 0 } else { n >= 0 };
    if exit {
        engine.loops().pop();
        engine.cmdbuf().skip_balanced('<', '>')?;
    }
    Ok(())
}

/// `F<` — rewind to the top of the innermost loop without touching the
/// count.
fn exec_f_open(engine: &mut dyn Engine, _cmd: &CommandDescriptor) -> TecoResult<()> {
    let frame = *engine.loops().top().ok_or(TecoError::Mla)?;
    engine.cmdbuf().set_position(frame.start);
    Ok(())
}

/// `F>` — end the loop early, as if it had completed naturally. At a
/// macro's own base depth (no loop open in this frame) this instead
/// terminates the macro (spec §4.5).
fn exec_f_close(engine: &mut dyn Engine, _cmd: &CommandDescriptor) -> TecoResult<()> {
    if engine.loops().depth() <= engine.loop_base() {
        finish_macro_exit(engine);
        return Ok(());
    }
    engine.loops().pop().ok_or(TecoError::Mla)?;
    engine.cmdbuf().skip_balanced('<', '>')
}

// ---------------------------------------------------------------------
// §4.4 Conditionals
// ---------------------------------------------------------------------

/// `n"X` — test `n` under condition `X`, then either fall into the
/// then-branch or skip to `|`/`'`.
fn exec_quote(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let n = cmd.n_arg_required(TecoError::Naq)?;
    let test_char = cmd.c2;
    let holds = match test_char.to_ascii_uppercase() {
        'E' => n == 0,
        'N' => n != 0,
        'G' => n > 0,
        'L' => n < 0,
        'A' => (n as u8 as char).is_alphabetic(),
        'D' => (n as u8 as char).is_ascii_digit(),
        'C' => {
            let c = n as u8 as char;
            c.is_alphanumeric() || c == '.' || c == '_' || c == '$'
        }
        'S' => n == SUCCESS,
        'F' => n == FAILURE,
        'T' => n != 0,
        'U' => n == 0,
        _ => return Err(TecoError::Iqc),
    };
    engine.ifs().enter();
    if holds {
        return Ok(());
    }
    match engine.cmdbuf().skip_conditional(true)? {
        '|' => Ok(()),
        _ => {
            engine.ifs().exit()?;
            Ok(())
        }
    }
}

/// `|` — the then-branch finished; skip the else-branch.
fn exec_else(engine: &mut dyn Engine, _cmd: &CommandDescriptor) -> TecoResult<()> {
    engine.cmdbuf().skip_conditional(false)?;
    engine.ifs().exit()
}

/// `'` — end of conditional.
fn exec_endif(engine: &mut dyn Engine, _cmd: &CommandDescriptor) -> TecoResult<()> {
    engine.ifs().exit()
}

// ---------------------------------------------------------------------
// Buffer motion and editing (out-of-scope primitives, narrow interface
// per spec §6 — the commands below are the dispatch glue, not the
// algorithms).
// ---------------------------------------------------------------------

/// `nC` — advance `dot` by `n` (default 1).
fn exec_c(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let n = cmd.n_or(1);
    let pos = engine.buffer().dot() as i64 + n;
    engine.buffer().set_dot(pos)
}

/// `nR` — back `dot` up by `n` (default 1).
fn exec_r(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let n = cmd.n_or(1);
    let pos = engine.buffer().dot() as i64 - n;
    engine.buffer().set_dot(pos)
}

/// `nJ` — jump `dot` to the absolute position `n` (default 0).
fn exec_j(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    engine.buffer().set_dot(cmd.n_or(0))
}

/// `Itext` — insert `text1` at `dot`.
fn exec_insert(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let (start, len) = cmd.text1.map(|t| (t.start, t.len)).unwrap_or((0, 0));
    let owned = engine.cmdbuf().slice(start, len).into_owned();
    engine.buffer().insert(owned.as_bytes());
    Ok(())
}

/// `nD` — delete `n` characters forward (default 1) from `dot`.
fn exec_d(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    engine.buffer().delete(cmd.n_or(1))?;
    Ok(())
}

/// `K` — delete from `dot` to end of buffer (or `m,nK` a span).
fn exec_k(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    if cmd.m_set && cmd.n_set {
        let span = cmd.n_arg - cmd.m_arg;
        engine.buffer().set_dot(cmd.m_arg)?;
        engine.buffer().delete(span)?;
    } else {
        let z = engine.buffer().z() as i64;
        let dot = engine.buffer().dot() as i64;
        engine.buffer().delete(z - dot)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Print commands
// ---------------------------------------------------------------------

/// `n=` / `n:=` — print `n` in the current radix, with (default) or
/// without (`:`) a trailing newline.
fn exec_equals(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let n = cmd.n_arg_required(TecoError::Nae)?;
    let radix = engine.radix();
    let text = format_radix(n, radix);
    engine.terminal().print(&text);
    if !cmd.colon {
        engine.terminal().print("\n");
    }
    Ok(())
}

/// `^Atext^A` / `@^A/text/` — print a literal message.
fn scan_caret_a(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    cmd.delim = if cmd.atsign {
        engine.cmdbuf().next_char().ok_or(TecoError::Utc)? as u8
    } else {
        0x1b
    };
    let (start, len) = engine.cmdbuf().read_text_arg(cmd.delim)?;
    cmd.text1 = Some(teco_keymap::TextArg { start, len });
    Ok(())
}

fn exec_caret_a(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let (start, len) = cmd.text1.map(|t| (t.start, t.len)).unwrap_or((0, 0));
    let owned = engine.cmdbuf().slice(start, len).into_owned();
    engine.terminal().print(&owned);
    Ok(())
}

// ---------------------------------------------------------------------
// `E` table: file I/O is an out-of-scope external collaborator (spec
// §1/§6); `ER`/`EW` demonstrate only the `:`-converts-to-FAILURE policy
// (spec §7) since no file collaborator is wired in here.
// ---------------------------------------------------------------------

fn scan_text1(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    cmd.delim = if cmd.atsign {
        engine.cmdbuf().next_char().ok_or(TecoError::Utc)? as u8
    } else {
        0x1b
    };
    let (start, len) = engine.cmdbuf().read_text_arg(cmd.delim)?;
    cmd.text1 = Some(teco_keymap::TextArg { start, len });
    Ok(())
}

fn exec_er(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let (start, len) = cmd.text1.map(|t| (t.start, t.len)).unwrap_or((0, 0));
    let name = engine.cmdbuf().slice(start, len).into_owned();
    if cmd.colon {
        engine.expr().push_operand(FAILURE);
        Ok(())
    } else {
        Err(TecoError::Inp(name))
    }
}

fn exec_ew(engine: &mut dyn Engine, cmd: &CommandDescriptor) -> TecoResult<()> {
    let (start, len) = cmd.text1.map(|t| (t.start, t.len)).unwrap_or((0, 0));
    let name = engine.cmdbuf().slice(start, len).into_owned();
    if cmd.colon {
        engine.expr().push_operand(FAILURE);
        Ok(())
    } else {
        Err(TecoError::Out(name))
    }
}

// ---------------------------------------------------------------------
// Table construction
// ---------------------------------------------------------------------

pub fn build_table() -> CommandTable {
    let operand = Opts::OPERAND;
    let mut b = CommandTable::builder();

    for d in '0'..='9' {
        b = b.primary(d, TableEntry::new(Some(scan_digit), None, operand));
    }
    b = b
        .primary('+', TableEntry::new(Some(scan_op_add), None, operand))
        .primary('-', TableEntry::new(Some(scan_op_sub), None, operand))
        .primary('*', TableEntry::new(Some(scan_op_mul), None, operand))
        .primary('/', TableEntry::new(Some(scan_op_div), None, operand))
        .primary('%', TableEntry::new(Some(scan_percent), None, operand))
        .primary('&', TableEntry::new(Some(scan_op_and), None, operand))
        .primary('#', TableEntry::new(Some(scan_op_or), None, operand))
        .primary('(', TableEntry::new(Some(scan_lparen), None, operand))
        .primary(')', TableEntry::new(Some(scan_rparen), None, operand))
        .primary(',', TableEntry::new(Some(scan_comma), None, operand))
        .primary('.', TableEntry::new(Some(scan_dot), None, operand))
        .primary('\\', TableEntry::new(Some(scan_backslash), None, operand))
        .primary('Z', TableEntry::new(Some(scan_z), None, operand))
        .primary('B', TableEntry::new(Some(scan_b), None, operand))
        .primary('H', TableEntry::new(Some(scan_h), None, operand))
        .primary(
            'Q',
            TableEntry::new(Some(scan_q_operand), None, operand | Opts::COLON),
        )
        .primary(
            'U',
            TableEntry::new(Some(scan_qreg_arg), Some(exec_u), Opts::N | Opts::QREG),
        )
        .primary(
            '[',
            TableEntry::new(Some(scan_qreg_arg), Some(exec_lbracket), Opts::QREG),
        )
        .primary(
            ']',
            TableEntry::new(
                Some(scan_qreg_arg),
                Some(exec_rbracket),
                Opts::QREG | Opts::COLON,
            ),
        )
        .primary(
            'M',
            TableEntry::new(Some(scan_qreg_arg), Some(exec_m), Opts::QREG | Opts::COLON),
        )
        .primary('<', TableEntry::new(None, Some(exec_open_loop), Opts::N))
        .primary('>', TableEntry::new(None, Some(exec_close_loop), Opts::empty()))
        .primary(
            ';',
            TableEntry::new(None, Some(exec_semicolon), Opts::N | Opts::COLON),
        )
        .primary(
            '"',
            TableEntry::new(Some(scan_test_char), Some(exec_quote), Opts::N),
        )
        .primary('|', TableEntry::new(None, Some(exec_else), Opts::empty()))
        .primary('\'', TableEntry::new(None, Some(exec_endif), Opts::empty()))
        .primary(':', TableEntry::new(Some(scan_colon), None, operand))
        .primary('@', TableEntry::new(Some(scan_atsign), None, operand))
        .primary('C', TableEntry::new(None, Some(exec_c), Opts::N))
        .primary('R', TableEntry::new(None, Some(exec_r), Opts::N))
        .primary('J', TableEntry::new(None, Some(exec_j), Opts::N))
        .primary(
            'I',
            TableEntry::new(Some(scan_text1), Some(exec_insert), Opts::TEXT1 | Opts::ATSIGN),
        )
        .primary('D', TableEntry::new(None, Some(exec_d), Opts::N))
        .primary('K', TableEntry::new(None, Some(exec_k), Opts::M | Opts::N))
        .primary(
            '=',
            TableEntry::new(None, Some(exec_equals), Opts::N | Opts::COLON),
        )
        .primary('\x1b', TableEntry::new(None, None, Opts::empty()))
        // Whitespace between commands is a no-op (`cmd_exec.c`'s `NUL`/`LF`/
        // `CR`/`SPACE` entries are all `{ NULL, NULL, "" }` or equivalent),
        // so a command string can be laid out with separating blanks
        // without that being an illegal-command error.
        .primary('\0', TableEntry::new(None, None, Opts::empty()))
        .primary(' ', TableEntry::new(None, None, Opts::empty()))
        .primary('\n', TableEntry::new(None, None, Opts::empty()))
        .primary('\r', TableEntry::new(None, None, Opts::empty()));

    b = b
        .caret('_', TableEntry::new(Some(scan_not), None, operand))
        .caret('R', TableEntry::new(Some(scan_caret_r), None, operand))
        .caret('Y', TableEntry::new(Some(scan_caret_y), None, operand))
        .caret(
            'A',
            TableEntry::new(Some(scan_caret_a), Some(exec_caret_a), Opts::TEXT1 | Opts::ATSIGN),
        );

    b = b
        .e(
            'R',
            TableEntry::new(Some(scan_text1), Some(exec_er), Opts::TEXT1 | Opts::COLON),
        )
        .e(
            'W',
            TableEntry::new(Some(scan_text1), Some(exec_ew), Opts::TEXT1 | Opts::COLON),
        );

    b = b
        .f('<', TableEntry::new(None, Some(exec_f_open), Opts::empty()))
        .f('>', TableEntry::new(None, Some(exec_f_close), Opts::empty()));

    b.build()
}

fn scan_test_char(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    cmd.c2 = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
    Ok(())
}

fn scan_colon(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let _ = engine;
    if cmd.colon {
        cmd.dcolon = true;
    } else {
        cmd.colon = true;
    }
    Ok(())
}

fn scan_atsign(engine: &mut dyn Engine, cmd: &mut CommandDescriptor) -> TecoResult<()> {
    let _ = engine;
    cmd.atsign = true;
    Ok(())
}

trait CommandDescriptorExt {
    fn n_arg_required(&self, err: TecoError) -> TecoResult<teco_types::Operand>;
}

impl CommandDescriptorExt for CommandDescriptor {
    fn n_arg_required(&self, err: TecoError) -> TecoResult<teco_types::Operand> {
        if self.n_set { Ok(self.n_arg) } else { Err(err) }
    }
}
