//! The terminal collaborator (spec §6, §10.4): a `crossterm`-backed
//! implementation of `teco_keymap::Terminal` for a real console.
//!
//! Raw mode is entered on construction and restored on drop, even across
//! a panic. There is no async runtime here, so this is a direct blocking
//! implementation over `crossterm::event::read`/`poll` — and no alternate
//! screen or hidden cursor to manage, since a line-oriented interpreter
//! shares the scrollback with the operator rather than owning a pane.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use teco_keymap::Terminal;
use teco_types::{TecoError, TecoResult};
use tracing::trace;

/// State the driver feeds in so the terminal layer can answer `?`/`/`/`*q`
/// itself, without the terminal needing to know about `Interp` or
/// `ErrorCatalog` (spec §6's external-collaborator boundary). The driver
/// refreshes `error_summary`/`error_detail` after every `execute_str` call
/// and drains `star_store` after every `read_cmd` returns.
#[derive(Debug, Default, Clone)]
pub struct ImmediateModeState {
    pub error_summary: Option<String>,
    pub error_detail: Option<String>,
    pub star_store: Option<(char, String)>,
}

/// RAII guard: enters raw mode on construction, restores cooked mode on
/// drop. No alternate-screen or cursor-hide calls, since those belong to
/// a full-screen pane rather than a line-oriented interpreter (spec §10.4).
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { active: true })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            self.active = false;
        }
    }
}

/// A direct `crossterm`-backed `Terminal`. Holds no buffering of its own
/// beyond the in-progress command line; every `print`/`echo` call writes
/// straight to stdout.
pub struct CrosstermTerminal {
    line: Vec<u8>,
    state: Arc<Mutex<ImmediateModeState>>,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            line: Vec::new(),
            state: Arc::new(Mutex::new(ImmediateModeState::default())),
        }
    }

    /// A clone of the handle used to feed in error context and drain `*q`
    /// requests, mirroring `Interp::ctrl_c_flag`'s shared-handle pattern.
    pub fn immediate_state(&self) -> Arc<Mutex<ImmediateModeState>> {
        Arc::clone(&self.state)
    }

    fn write_raw(&self, bytes: &[u8]) {
        let mut out = std::io::stdout();
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

impl Terminal for CrosstermTerminal {
    fn getc(&mut self, wait: bool) -> Option<u8> {
        if !wait && !crossterm::event::poll(Duration::from_millis(0)).unwrap_or(false) {
            return None;
        }
        loop {
            let ev = crossterm::event::read().ok()?;
            if let Some(b) = key_to_byte(&ev) {
                return Some(b);
            }
            if !wait {
                return None;
            }
        }
    }

    fn echo(&mut self, c: u8) {
        self.write_raw(&[c]);
    }

    fn print(&mut self, s: &str) {
        self.write_raw(s.as_bytes());
    }

    /// Reads raw key events until a command line is complete. Immediate-
    /// mode characters are intercepted here and never reach the
    /// interpreter (spec §6): CTRL/C aborts the read with `E_XAB`
    /// (the double-tap-exits-process policy is the binary's, per spec
    /// §11); CTRL/U discards the line collected so far; BS/DEL erases one
    /// character, a no-op at the start of the line; `?` reprints the last
    /// trapped error's one-line summary and `/` its multi-line detail, both
    /// drawn from the [`ImmediateModeState`] the driver keeps refreshed;
    /// `*q` saves the line collected so far into Q-register `q` (the
    /// driver drains `star_store` and performs the actual Q-register write,
    /// since this layer has no access to the Q-register bank); CTRL/G
    /// retypes the line collected so far. A command line ends at a bare
    /// `ESC` typed with nothing pending after it — consecutive `ESC ESC`,
    /// TECO's conventional "execute now" — since a single `ESC` inside the
    /// line is a valid text-argument delimiter and must reach the
    /// interpreter intact.
    fn read_cmd(&mut self) -> TecoResult<String> {
        self.line.clear();
        loop {
            let Ok(ev) = crossterm::event::read() else {
                return Ok(String::from_utf8_lossy(&self.line).into_owned());
            };
            let Some(b) = key_to_byte(&ev) else { continue };
            match b {
                0x03 => {
                    trace!(target: "term.immediate", "ctrl-c");
                    return Err(TecoError::Xab);
                }
                0x15 => {
                    self.line.clear();
                    self.write_raw(b"\r\n");
                }
                0x08 | 0x7f => {
                    if self.line.pop().is_some() {
                        self.write_raw(b"\x08 \x08");
                    }
                }
                0x1b if self.line.last() == Some(&0x1b) => {
                    self.write_raw(b"\r\n");
                    self.line.pop();
                    return Ok(String::from_utf8_lossy(&self.line).into_owned());
                }
                b'?' => {
                    trace!(target: "term.immediate", "?");
                    let summary = self.state.lock().unwrap().error_summary.clone();
                    match summary {
                        Some(s) => self.write_raw(format!("\r\n{s}\r\n").as_bytes()),
                        None => self.write_raw(b"\r\n?no error\r\n"),
                    }
                }
                b'/' => {
                    trace!(target: "term.immediate", "/");
                    let detail = self.state.lock().unwrap().error_detail.clone();
                    match detail {
                        Some(d) => self.write_raw(format!("\r\n{d}\r\n").as_bytes()),
                        None => self.write_raw(b"\r\nno detail available\r\n"),
                    }
                }
                0x07 => {
                    trace!(target: "term.immediate", "ctrl-g");
                    let line = self.line.clone();
                    self.write_raw(b"\r\n");
                    self.write_raw(&line);
                }
                b'*' => {
                    let Some(reg) = loop {
                        let Ok(ev) = crossterm::event::read() else {
                            break None;
                        };
                        if let Some(b) = key_to_byte(&ev) {
                            break Some(b as char);
                        }
                    } else {
                        continue;
                    };
                    trace!(target: "term.immediate", ?reg, "*q");
                    let saved = String::from_utf8_lossy(&self.line).into_owned();
                    self.state.lock().unwrap().star_store = Some((reg, saved));
                }
                b'\r' => {
                    self.line.push(b'\n');
                    self.write_raw(b"\r\n");
                }
                b => {
                    self.line.push(b);
                    self.echo(b);
                }
            }
        }
    }
}

fn key_to_byte(ev: &Event) -> Option<u8> {
    let Event::Key(key) = ev else { return None };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                return Some((upper as u8) & 0x1f);
            }
        }
    }
    match key.code {
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Enter => Some(b'\r'),
        KeyCode::Esc => Some(0x1b),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Delete => Some(0x7f),
        KeyCode::Tab => Some(b'\t'),
        _ => None,
    }
}
