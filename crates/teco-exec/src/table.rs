//! The dispatch table (spec §4.1): a 128-entry array keyed by the
//! upper-cased command character, plus secondary tables selected by a
//! leading `E`, `F`, or `^`.

use teco_keymap::{CommandDescriptor, Engine, Opts};
use teco_types::{TecoError, TecoResult};

pub type ScanFn = fn(&mut dyn Engine, &mut CommandDescriptor) -> TecoResult<()>;
pub type ExecFn = fn(&mut dyn Engine, &CommandDescriptor) -> TecoResult<()>;

#[derive(Debug, Clone, Copy)]
pub struct TableEntry {
    pub scan: Option<ScanFn>,
    pub exec: Option<ExecFn>,
    pub opts: Opts,
}

impl TableEntry {
    pub const fn new(scan: Option<ScanFn>, exec: Option<ExecFn>, opts: Opts) -> Self {
        Self { scan, exec, opts }
    }
}

/// The full set of tables: primary (bare command characters), and the
/// `E`/`F`/`^` secondary tables, addressed by the character that follows
/// the prefix.
pub struct CommandTable {
    primary: [Option<TableEntry>; 128],
    e_table: [Option<TableEntry>; 128],
    f_table: [Option<TableEntry>; 128],
    caret_table: [Option<TableEntry>; 128],
}

impl CommandTable {
    pub fn builder() -> CommandTableBuilder {
        CommandTableBuilder {
            primary: [None; 128],
            e_table: [None; 128],
            f_table: [None; 128],
            caret_table: [None; 128],
        }
    }

    /// Resolve one dispatch step starting from `c` (already read from the
    /// `CmdBuf` and not yet case-folded). Consumes further characters
    /// from `engine.cmdbuf()` for the `E`/`F`/`^` prefix forms. Returns
    /// the resolved entry and the canonical (upper-cased, prefix-free)
    /// character to record as `cmd.c1`/`cmd.c2`.
    pub fn resolve(
        &self,
        engine: &mut dyn Engine,
        c: char,
        cmd: &mut CommandDescriptor,
    ) -> TecoResult<TableEntry> {
        match c {
            'E' | 'e' => {
                let c2 = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
                let key = c2.to_ascii_uppercase();
                cmd.c1 = 'E';
                cmd.c2 = key;
                self.e_table[key as usize % 128].ok_or(TecoError::Iec(c2))
            }
            'F' | 'f' => {
                let c2 = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
                let key = c2.to_ascii_uppercase();
                cmd.c1 = 'F';
                cmd.c2 = key;
                self.f_table[key as usize % 128].ok_or(TecoError::Ifc(c2))
            }
            '^' => {
                let c2 = engine.cmdbuf().next_char().ok_or(TecoError::Utc)?;
                if c2 == '_' {
                    cmd.c1 = '^';
                    cmd.c2 = '_';
                    return self.caret_table[b'_' as usize].ok_or(TecoError::Iuc(c2));
                }
                let key = c2.to_ascii_uppercase();
                if let Some(entry) = self.caret_table[key as usize % 128] {
                    cmd.c1 = '^';
                    cmd.c2 = key;
                    return Ok(entry);
                }
                // Fall back to literal control-character composition:
                // ^X is CTRL-X for A-Z (and a few punctuation codes).
                if key.is_ascii_uppercase() {
                    let composed = (key as u8) & 0x1f;
                    cmd.c1 = composed as char;
                    self.primary[composed as usize].ok_or(TecoError::Iuc(c2))
                } else {
                    Err(TecoError::Iuc(c2))
                }
            }
            _ => {
                let key = c.to_ascii_uppercase();
                cmd.c1 = key;
                self.primary[key as usize % 128].ok_or(TecoError::Ill(c))
            }
        }
    }
}

pub struct CommandTableBuilder {
    primary: [Option<TableEntry>; 128],
    e_table: [Option<TableEntry>; 128],
    f_table: [Option<TableEntry>; 128],
    caret_table: [Option<TableEntry>; 128],
}

impl CommandTableBuilder {
    pub fn primary(mut self, c: char, entry: TableEntry) -> Self {
        self.primary[c.to_ascii_uppercase() as usize % 128] = Some(entry);
        self
    }

    pub fn e(mut self, c: char, entry: TableEntry) -> Self {
        self.e_table[c.to_ascii_uppercase() as usize % 128] = Some(entry);
        self
    }

    pub fn f(mut self, c: char, entry: TableEntry) -> Self {
        self.f_table[c.to_ascii_uppercase() as usize % 128] = Some(entry);
        self
    }

    pub fn caret(mut self, c: char, entry: TableEntry) -> Self {
        self.caret_table[c.to_ascii_uppercase() as usize % 128] = Some(entry);
        self
    }

    pub fn build(self) -> CommandTable {
        CommandTable {
            primary: self.primary,
            e_table: self.e_table,
            f_table: self.f_table,
            caret_table: self.caret_table,
        }
    }
}
