// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supported network symbols and their pool targets.
//!
//! Production networks are kept at twice the per-cycle target, test networks
//! at the per-cycle target itself.

/// Production network symbols kept in the pool by default.
pub const DEFAULT_PRODUCTION_SYMBOLS: &[&str] = &["eth", "bnb", "trx", "btc"];

/// Test network symbols kept in the pool by default.
pub const DEFAULT_TEST_SYMBOLS: &[&str] = &["tbtc", "ropsten", "tbnb", "niles"];

/// Which kind of network a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
    Production,
    Test,
}

impl NetworkClass {
    /// Pool size multiplier applied to the per-cycle target.
    pub fn multiplier(self) -> u32 {
        match self {
            NetworkClass::Production => 2,
            NetworkClass::Test => 1,
        }
    }
}

/// A symbol together with the unclaimed supply it should be kept at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTarget {
    pub symbol: String,
    pub class: NetworkClass,
    pub target: u64,
}

/// The two symbol lists maintained by the replenisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    production: Vec<String>,
    test: Vec<String>,
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRODUCTION_SYMBOLS.iter().map(|s| s.to_string()),
            DEFAULT_TEST_SYMBOLS.iter().map(|s| s.to_string()),
        )
    }
}

impl SymbolSet {
    /// Build a symbol set; symbols are lowercased.
    pub fn new(
        production: impl IntoIterator<Item = String>,
        test: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            production: production.into_iter().map(|s| s.to_ascii_lowercase()).collect(),
            test: test.into_iter().map(|s| s.to_ascii_lowercase()).collect(),
        }
    }

    pub fn production(&self) -> &[String] {
        &self.production
    }

    pub fn test(&self) -> &[String] {
        &self.test
    }

    /// Targets for every symbol, production networks first.
    pub fn targets(&self, per_cycle: u32) -> Vec<SymbolTarget> {
        let production = self
            .production
            .iter()
            .map(|s| (s, NetworkClass::Production));
        let test = self.test.iter().map(|s| (s, NetworkClass::Test));

        production
            .chain(test)
            .map(|(symbol, class)| SymbolTarget {
                symbol: symbol.clone(),
                class,
                target: u64::from(per_cycle) * u64::from(class.multiplier()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_symbols_get_double_target() {
        let targets = SymbolSet::default().targets(5);

        let eth = targets.iter().find(|t| t.symbol == "eth").unwrap();
        assert_eq!(eth.class, NetworkClass::Production);
        assert_eq!(eth.target, 10);

        let niles = targets.iter().find(|t| t.symbol == "niles").unwrap();
        assert_eq!(niles.class, NetworkClass::Test);
        assert_eq!(niles.target, 5);
    }

    #[test]
    fn production_targets_come_first() {
        let targets = SymbolSet::default().targets(1);
        let order: Vec<&str> = targets.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(
            order,
            ["eth", "bnb", "trx", "btc", "tbtc", "ropsten", "tbnb", "niles"]
        );
    }

    #[test]
    fn symbols_are_lowercased() {
        let set = SymbolSet::new(vec!["ETH".to_string()], vec!["TBtc".to_string()]);
        assert_eq!(set.production(), ["eth"]);
        assert_eq!(set.test(), ["tbtc"]);
    }
}
