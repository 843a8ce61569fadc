//! Market - Stock directory and halt gate
//!
//! The directory is the catalogue of listed instruments backing the
//! public stock list and admin telemetry. The halt gate owns the
//! global and per-symbol trading halt flags: admin-mutable, read-only
//! for the execution engine. Flipping a flag affects subsequently
//! validated orders only; in-flight requests are never cancelled.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One listed instrument
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockInfo {
    /// Trading symbol, unique key
    #[schema(example = "TCS")]
    pub symbol: String,
    /// Display name
    #[schema(example = "Tata Consultancy Services")]
    pub name: String,
    /// Exchange code the instrument trades on
    #[schema(example = "NSE")]
    pub exchange: String,
    /// Reference price shown in listings
    pub last_price: Decimal,
    /// Per-symbol trading halt flag
    pub halted: bool,
}

/// Stock directory + halt flags
pub struct Market {
    stocks: DashMap<String, StockInfo>,
    system_halted: AtomicBool,
}

impl Market {
    pub fn new() -> Self {
        Market {
            stocks: DashMap::new(),
            system_halted: AtomicBool::new(false),
        }
    }

    // ============================================================
    // Halt gate (engine-read, admin-write)
    // ============================================================

    pub fn is_system_halted(&self) -> bool {
        self.system_halted.load(Ordering::SeqCst)
    }

    pub fn set_system_halted(&self, halted: bool) {
        self.system_halted.store(halted, Ordering::SeqCst);
        tracing::warn!(halted, "system halt flag changed");
    }

    /// Per-symbol halt. Unknown symbols are not halted: the directory
    /// is a listing catalogue, not an order whitelist.
    pub fn is_symbol_halted(&self, symbol: &str) -> bool {
        self.stocks.get(symbol).map(|s| s.halted).unwrap_or(false)
    }

    /// Set the halt flag for a symbol. Creates a bare directory entry
    /// if the symbol was never listed, so the flag sticks.
    pub fn set_symbol_halted(&self, symbol: &str, halted: bool) {
        self.stocks
            .entry(symbol.to_string())
            .or_insert_with(|| StockInfo {
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                exchange: String::new(),
                last_price: Decimal::ZERO,
                halted: false,
            })
            .halted = halted;
        tracing::warn!(symbol, halted, "symbol halt flag changed");
    }

    // ============================================================
    // Directory
    // ============================================================

    /// Insert or replace a listing. An existing halt flag survives
    /// the upsert.
    pub fn upsert_stock(&self, mut info: StockInfo) {
        if let Some(existing) = self.stocks.get(&info.symbol) {
            info.halted = existing.halted;
        }
        self.stocks.insert(info.symbol.clone(), info);
    }

    pub fn get_stock(&self, symbol: &str) -> Option<StockInfo> {
        self.stocks.get(symbol).map(|s| s.clone())
    }

    /// All listings, sorted by symbol for stable output
    pub fn list_stocks(&self) -> Vec<StockInfo> {
        let mut stocks: Vec<StockInfo> = self.stocks.iter().map(|e| e.value().clone()).collect();
        stocks.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        stocks
    }

    pub fn stock_count(&self) -> usize {
        self.stocks.len()
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}
