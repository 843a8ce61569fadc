//! FX - Conversion-rate source for foreign-exchange-listed orders
//!
//! Orders on domestic exchanges settle at face value; anything else is
//! normalized into the base currency by multiplying the submitted
//! total with the provider's rate. The engine takes the provider as a
//! trait object so a live source can be swapped in without touching
//! execution logic.

use rust_decimal::Decimal;

/// Source of the foreign-total conversion rate
pub trait RateProvider: Send + Sync {
    /// Multiplier applied to totals from non-domestic exchanges
    fn conversion_rate(&self) -> Decimal;
}

/// Fixed-rate provider, the default. Rate comes from config.
pub struct FixedRate {
    rate: Decimal,
}

impl FixedRate {
    pub fn new(rate: Decimal) -> Self {
        FixedRate { rate }
    }
}

impl Default for FixedRate {
    /// Default conversion rate: 90.0
    fn default() -> Self {
        FixedRate {
            rate: Decimal::from(90),
        }
    }
}

impl RateProvider for FixedRate {
    fn conversion_rate(&self) -> Decimal {
        self.rate
    }
}
