//! The flat error enumeration raised by the scanner and executor.
//!
//! Every variant corresponds to one three-letter TECO error code. A handful
//! carry a payload (the offending character, a file name, a search string)
//! that the `?` and `/` commands surface to the operator. The long-form
//! multi-line descriptions that a real terminal would print for `/` are not
//! reproduced here — that catalog is an external collaborator's concern
//! (see [`crate::ErrorCatalog`]); this type only owns the code and the
//! one-line summary needed to unwind and report a failure.

use std::fmt;

/// Every error the core engine can raise, unified behind one throw channel.
///
/// Variants that format a placeholder character or string into the
/// message keep that payload; the rest are unit variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TecoError {
    Arg,
    Boa,
    Chr(char),
    Cpq,
    Div,
    Dtb,
    Dup(String),
    Egc,
    Ice,
    Iec(char),
    Ifc(char),
    Ife,
    Ifn(char),
    Iia,
    Ill(char),
    Iln,
    Ini,
    Inp(String),
    Iqc,
    Iqn(char),
    Ira,
    Isa,
    Iss,
    Iuc(char),
    Mat,
    Mem,
    Mix,
    Mla,
    Mlp,
    Mmx,
    Mod,
    Mqx,
    Mrp,
    Msc,
    Nab,
    Nac,
    Nae,
    Nap,
    Naq,
    Nas,
    Nau,
    Nca,
    Nfi,
    Nfo,
    Noa,
    Non,
    Not,
    Now,
    Npa,
    Nya,
    Nyi,
    Ofo,
    Out(String),
    Pdo,
    Pes,
    Pop(char),
    Sni,
    Srh(String),
    Sys(String),
    Tag(String),
    T10,
    Uma,
    Una,
    Utc,
    Utl,
    Utm,
    Utq,
    Win,
    Xab,
    Yca,
    Zpa,
}

impl TecoError {
    /// The three-letter code, e.g. `"IQN"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arg => "ARG",
            Self::Boa => "BOA",
            Self::Chr(_) => "CHR",
            Self::Cpq => "CPQ",
            Self::Div => "DIV",
            Self::Dtb => "DTB",
            Self::Dup(_) => "DUP",
            Self::Egc => "EGC",
            Self::Ice => "ICE",
            Self::Iec(_) => "IEC",
            Self::Ifc(_) => "IFC",
            Self::Ife => "IFE",
            Self::Ifn(_) => "IFN",
            Self::Iia => "IIA",
            Self::Ill(_) => "ILL",
            Self::Iln => "ILN",
            Self::Ini => "INI",
            Self::Inp(_) => "INP",
            Self::Iqc => "IQC",
            Self::Iqn(_) => "IQN",
            Self::Ira => "IRA",
            Self::Isa => "ISA",
            Self::Iss => "ISS",
            Self::Iuc(_) => "IUC",
            Self::Mat => "MAT",
            Self::Mem => "MEM",
            Self::Mix => "MIX",
            Self::Mla => "MLA",
            Self::Mlp => "MLP",
            Self::Mmx => "MMX",
            Self::Mod => "MOD",
            Self::Mqx => "MQX",
            Self::Mrp => "MRP",
            Self::Msc => "MSC",
            Self::Nab => "NAB",
            Self::Nac => "NAC",
            Self::Nae => "NAE",
            Self::Nap => "NAP",
            Self::Naq => "NAQ",
            Self::Nas => "NAS",
            Self::Nau => "NAU",
            Self::Nca => "NCA",
            Self::Nfi => "NFI",
            Self::Nfo => "NFO",
            Self::Noa => "NOA",
            Self::Non => "NON",
            Self::Not => "NOT",
            Self::Now => "NOW",
            Self::Npa => "NPA",
            Self::Nya => "NYA",
            Self::Nyi => "NYI",
            Self::Ofo => "OFO",
            Self::Out(_) => "OUT",
            Self::Pdo => "PDO",
            Self::Pes => "PES",
            Self::Pop(_) => "POP",
            Self::Sni => "SNI",
            Self::Srh(_) => "SRH",
            Self::Sys(_) => "SYS",
            Self::Tag(_) => "TAG",
            Self::T10 => "T10",
            Self::Uma => "UMA",
            Self::Una => "UNA",
            Self::Utc => "UTC",
            Self::Utl => "UTL",
            Self::Utm => "UTM",
            Self::Utq => "UTQ",
            Self::Win => "WIN",
            Self::Xab => "XAB",
            Self::Yca => "YCA",
            Self::Zpa => "ZPA",
        }
    }

    /// The one-line summary, independent of any payload.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Arg => "Improper arguments",
            Self::Boa => "O argument is out of range",
            Self::Chr(_) => "Invalid character for command",
            Self::Cpq => "Can't pop into Q-register",
            Self::Div => "Division by zero",
            Self::Dtb => "Delete too big",
            Self::Dup(_) => "Duplicate tag",
            Self::Egc => "EG command is too long",
            Self::Ice => "Illegal ^E command in search argument",
            Self::Iec(_) => "Illegal character after E",
            Self::Ifc(_) => "Illegal character after F",
            Self::Ife => "Ill-formed numeric expression",
            Self::Ifn(_) => "Illegal character in filename",
            Self::Iia => "Illegal insert arg",
            Self::Ill(_) => "Illegal command",
            Self::Iln => "Illegal number",
            Self::Ini => "Initialization error",
            Self::Inp(_) => "Error opening input file",
            Self::Iqc => "Illegal quote character",
            Self::Iqn(_) => "Illegal Q-register name",
            Self::Ira => "Illegal radix argument to ^R",
            Self::Isa => "Illegal search argument",
            Self::Iss => "Illegal search string",
            Self::Iuc(_) => "Illegal character following ^",
            Self::Mat => "No matching files",
            Self::Mem => "Memory overflow",
            Self::Mix => "Maximum insert string exceeded",
            Self::Mla => "Missing left angle bracket",
            Self::Mlp => "Missing left parenthesis",
            Self::Mmx => "Maximum macro depth exceeded",
            Self::Mod => "Invalid modifier",
            Self::Mqx => "Maximum Q-register depth exceeded",
            Self::Mrp => "Missing right parenthesis",
            Self::Msc => "Missing start of conditional",
            Self::Nab => "No argument before 1's complement operator",
            Self::Nac => "No argument before comma",
            Self::Nae => "No argument before equals sign",
            Self::Nap => "No argument before right parenthesis",
            Self::Naq => "No argument before quote",
            Self::Nas => "No argument before semi-colon",
            Self::Nau => "No argument before U command",
            Self::Nca => "Negative argument to comma",
            Self::Nfi => "No file for input",
            Self::Nfo => "No file for output",
            Self::Noa => "O argument is non-positive",
            Self::Non => "Missing n argument after m argument",
            Self::Not => "O command has no tag",
            Self::Now => "Window support not enabled",
            Self::Npa => "P or PW argument is negative",
            Self::Nya => "Numeric argument with Y",
            Self::Nyi => "Not yet implemented",
            Self::Ofo => "Output file already open",
            Self::Out(_) => "Error opening output file",
            Self::Pdo => "Push-down list overflow",
            Self::Pes => "Attempt to pop empty stack",
            Self::Pop(_) => "Attempt to move pointer off page",
            Self::Sni => "Semi-colon not in iteration",
            Self::Srh(_) => "Search failure",
            Self::Sys(_) => "System error",
            Self::Tag(_) => "Missing tag",
            Self::T10 => "TECO-10 command not implemented",
            Self::Uma => "Unused m argument",
            Self::Una => "Unused n argument",
            Self::Utc => "Unterminated command string",
            Self::Utl => "Unterminated loop",
            Self::Utm => "Unterminated macro",
            Self::Utq => "Unterminated quote",
            Self::Win => "Window initialization error",
            Self::Xab => "Execution aborted",
            Self::Yca => "Y command aborted",
            Self::Zpa => "P or PW argument is zero",
        }
    }
}

impl fmt::Display for TecoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}  {}", self.code(), self.summary())?;
        match self {
            Self::Chr(c) | Self::Iec(c) | Self::Ifc(c) | Self::Ifn(c) | Self::Ill(c)
            | Self::Iuc(c) | Self::Pop(c) | Self::Iqn(c) => write!(f, " \"{c}\""),
            Self::Dup(s) | Self::Inp(s) | Self::Out(s) | Self::Srh(s) | Self::Sys(s)
            | Self::Tag(s) => write!(f, " \"{s}\""),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for TecoError {}

/// Result alias used throughout the engine; `Err` is the single throw channel
/// described in the design notes (a modeled `setjmp`/`longjmp`).
pub type TecoResult<T> = Result<T, TecoError>;

/// Long-form, multi-line detail for an error code, consulted by the `/`
/// command. The wording itself lives outside the core (see spec's external
/// collaborator boundary); this trait is the narrow interface the core calls.
pub trait ErrorCatalog {
    fn detail(&self, code: &str) -> Option<&str>;
}

/// A catalog with no entries; `/` reports "no detail available" for every code.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyErrorCatalog;

impl ErrorCatalog for EmptyErrorCatalog {
    fn detail(&self, _code: &str) -> Option<&str> {
        None
    }
}
