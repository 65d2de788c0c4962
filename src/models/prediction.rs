//! Prediction form models

/// Placeholder shown when the backend omits a label
pub const MISSING_TEXT: &str = "N/A";

/// Normalize raw form input into a ticker symbol.
///
/// Returns `None` when nothing but whitespace was entered.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// Text for a result display: the label verbatim, or "N/A" when absent or empty
pub fn display_text(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => MISSING_TEXT,
    }
}
