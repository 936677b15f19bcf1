use crate::error::TecoError;

/// The numeric base used when parsing or formatting digit literals and the
/// `\` command. `^R` selects among these; default is decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub fn value(self) -> u32 {
        match self {
            Self::Octal => 8,
            Self::Decimal => 10,
            Self::Hex => 16,
        }
    }

    /// `^R` accepts only 8, 10, or 16; anything else is `E_IRA`.
    pub fn from_value(n: i64) -> Result<Self, TecoError> {
        match n {
            8 => Ok(Self::Octal),
            10 => Ok(Self::Decimal),
            16 => Ok(Self::Hex),
            _ => Err(TecoError::Ira),
        }
    }

    /// Digit value of `c` in this radix, honoring hex-digit tolerance for
    /// radix 16 (`A`-`F`/`a`-`f`). Returns `None` if `c` is not a digit of
    /// this radix at all.
    pub fn digit_value(self, c: char) -> Option<u32> {
        let v = c.to_digit(16)?;
        if v < self.value() { Some(v) } else { None }
    }
}

impl Default for Radix {
    fn default() -> Self {
        Self::Decimal
    }
}
