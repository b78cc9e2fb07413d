use ring_params::{DEFAULT_PARAMS, DesignParams, clean_symbols, normalize};
use serde::Serialize;
use serde_json::Value;

/// Symbols used whenever the provider's answer yields none of its own.
pub const DEFAULT_SYMBOLS: [&str; 3] = ["Abstract", "Organic", "Balance"];

/// Interpreted provider answer, ready to be stored with its prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDraft {
    pub symbols: Vec<String>,
    pub design_params: DesignParams,
}

impl ConceptDraft {
    pub fn fallback() -> Self {
        Self {
            symbols: default_symbols(),
            design_params: DEFAULT_PARAMS,
        }
    }
}

fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|symbol| symbol.to_string()).collect()
}

/// Turns free provider text into a usable draft. Never fails.
///
/// A top-level array is read as a bare symbol list. Otherwise symbols come from
/// `symbols` and parameters from `designParams`, or from the whole object when
/// `designParams` is absent or null.
pub fn interpret_response(content: &str) -> ConceptDraft {
    let parsed: Value = match serde_json::from_str(content) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "concept payload is not valid JSON; using defaults");
            return ConceptDraft::fallback();
        }
    };

    let (symbol_candidate, params_candidate) = match &parsed {
        Value::Array(_) => (&parsed, &Value::Null),
        _ => {
            let params = match parsed.get("designParams") {
                Some(Value::Null) | None => &parsed,
                Some(params) => params,
            };
            (parsed.get("symbols").unwrap_or(&Value::Null), params)
        }
    };

    let mut symbols = clean_symbols(symbol_candidate);
    if symbols.is_empty() {
        tracing::debug!("concept payload carried no usable symbols");
        symbols = default_symbols();
    }

    ConceptDraft {
        symbols,
        design_params: normalize(params_candidate),
    }
}
