//! Contract reference data.

use std::fmt;

/// Identity of a tradable instrument. Used as the key of the position ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Contract {
    pub symbol: String,
    pub exchange: String,
    pub currency: String,
}

impl Contract {
    pub fn new(
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Contract {
            symbol: symbol.into(),
            exchange: exchange.into(),
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.symbol, self.exchange, self.currency)
    }
}
