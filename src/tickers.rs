// src/tickers.rs
use std::{collections::HashSet, fmt};

/// Share-class tickers the provider publishes without a separator
/// ("BRKB") that quote sources expect split ("BRK-B").
pub const DEFAULT_SUFFIX_TICKERS: &[&str] = &[
    "BFA", "BFB", "LGFA", "LGFB", "BRKB", "HEIA", "UHALB", "LENB", "CWENA", "GEFB",
];

pub const DEFAULT_SEPARATOR: char = '-';

/// A cleaned ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Class-suffix corrections: which symbols to split and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRules {
    symbols: HashSet<String>,
    separator: char,
}

impl SuffixRules {
    pub fn new<I, S>(symbols: I, separator: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            separator,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Rewrite `raw` if it is one of the exception symbols; identity otherwise.
    pub fn apply(&self, raw: &str) -> String {
        if !self.contains(raw) {
            return raw.to_string();
        }
        match raw.char_indices().last() {
            Some((split, _)) if split > 0 => {
                let mut out = String::with_capacity(raw.len() + self.separator.len_utf8());
                out.push_str(&raw[..split]);
                out.push(self.separator);
                out.push_str(&raw[split..]);
                out
            }
            _ => raw.to_string(),
        }
    }
}

impl Default for SuffixRules {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX_TICKERS.iter().copied(), DEFAULT_SEPARATOR)
    }
}

/// Non-empty and every char alphanumeric. Footnote markers, blanks,
/// "N/A" and weights like "123.45%" all fail.
pub fn is_symbol(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(char::is_alphanumeric)
}

/// Filter + correct a single raw cell. `None` means drop it.
pub fn normalize(raw: &str, rules: &SuffixRules) -> Option<Ticker> {
    if !is_symbol(raw) {
        return None;
    }
    Some(Ticker(rules.apply(raw)))
}
