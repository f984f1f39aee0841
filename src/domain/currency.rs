//! Currency reference data.

use std::fmt;

/// Whether a currency is government-issued or a crypto asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyKind {
    Fiat,
    Crypto,
}

/// Immutable currency reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// ISO-style code, e.g. "USD", "EUR", "BTC".
    pub code: String,
    /// Human-readable name, e.g. "US Dollar".
    pub name: String,
    /// Display symbol, e.g. "$".
    pub symbol: String,
    pub kind: CurrencyKind,
}

impl Currency {
    /// Create a currency record.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        kind: CurrencyKind,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            symbol: symbol.into(),
            kind,
        }
    }

    /// Returns true for fiat currencies.
    #[must_use]
    pub fn is_fiat(&self) -> bool {
        self.kind == CurrencyKind::Fiat
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
