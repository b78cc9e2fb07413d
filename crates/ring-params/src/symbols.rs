use std::collections::HashSet;

use serde_json::Value;

pub const MAX_SYMBOLS: usize = 5;
pub const MAX_SYMBOL_CHARS: usize = 32;

/// Extracts at most [`MAX_SYMBOLS`] short display strings from a list-like value.
///
/// Non-string and blank entries are skipped. Duplicates are detected on the
/// lower-cased, truncated form, and the first spelling seen is kept.
pub fn clean_symbols(raw: &Value) -> Vec<String> {
    let Value::Array(items) = raw else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for item in items {
        let Some(text) = item.as_str() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let symbol: String = trimmed.chars().take(MAX_SYMBOL_CHARS).collect();
        if !seen.insert(symbol.to_lowercase()) {
            continue;
        }

        symbols.push(symbol);
        if symbols.len() >= MAX_SYMBOLS {
            break;
        }
    }

    symbols
}
