//! Configured ticker symbols and parsing helpers shared by ingestor and dashboard.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::StockError;

/// Trait providing file parsing for symbol lists.
pub trait SymbolParser: Sized {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces, or new lines. Blank entries are
    /// skipped; an invalid entry fails the whole parse.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Self, StockError>;
}

/// Ordered, deduplicated set of upper-cased ticker symbols.
///
/// The set is built once at startup and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: BTreeSet<String>,
}

impl SymbolSet {
    /// Build a set from already-split tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, StockError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            symbols.insert(validate(token)?);
        }
        Ok(Self { symbols })
    }

    /// Whether `symbol` is configured. Comparison ignores ASCII case.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_ascii_uppercase())
    }

    /// Iterate symbols in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Number of configured symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// `true` when no symbol is configured.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: SymbolSet) {
        self.symbols.extend(other.symbols);
    }
}

impl FromStr for SymbolSet {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tokens(split(s))
    }
}

impl SymbolParser for SymbolSet {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Self, StockError> {
        let mut set = SymbolSet::default();
        for line_result in reader.lines() {
            let line = line_result.map_err(StockError::Io)?;
            set.extend(Self::from_tokens(split(&line))?);
        }
        Ok(set)
    }
}

fn split(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == ',' || c.is_whitespace())
}

fn validate(token: &str) -> Result<String, StockError> {
    let symbol = token.to_ascii_uppercase();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-' | '^');
    if symbol.chars().all(allowed) {
        Ok(symbol)
    } else {
        Err(StockError::Config(format!("invalid ticker symbol: {token:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_mixed_separators_and_dedupes() {
        let set: SymbolSet = "aapl, EBAY\nmsft  aapl".parse().unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["AAPL", "EBAY", "MSFT"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("ebay"));
        assert!(!set.contains("TSLA"));
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let set: SymbolSet = " , \n".parse().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn rejects_injection_shaped_tokens() {
        let err = "AAPL';DROP".parse::<SymbolSet>().unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn parses_symbol_file() {
        let file = Cursor::new("AAPL\n\nBRK.B,^GSPC\n");
        let set = SymbolSet::parse_from_file(file).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["AAPL", "BRK.B", "^GSPC"]);
    }
}
