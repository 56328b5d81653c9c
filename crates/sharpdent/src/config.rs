//
// config.rs
//
// User settings for indentation, read from the `sharpdent` configuration
// section sent by the client.
//

use serde_json::Value;
use tower_lsp::lsp_types;

use crate::indentation::{FormattingOptions, IndentStyle};
use crate::syntax::ParseOptions;

const MAX_WIDTH: u64 = 16;

/// Indentation settings. Unset widths defer to the client's per-request
/// formatting options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentSettings {
    pub indent_style: IndentStyle,
    pub indent_size: Option<u32>,
    pub tab_size: Option<u32>,
    pub insert_spaces: Option<bool>,
    pub preprocessor_symbols: Vec<String>,
}

impl IndentSettings {
    pub fn from_json(value: &Value) -> Self {
        let mut settings = Self::default();
        settings.apply_json(value);
        settings
    }

    /// Applies the recognised keys of `value` (either the `sharpdent` section
    /// itself or an object containing it). Invalid values are logged and
    /// skipped. Returns whether the preprocessor symbols changed.
    pub fn apply_json(&mut self, value: &Value) -> bool {
        let section = value.get("sharpdent").unwrap_or(value);
        let Some(section) = section.as_object() else {
            if !section.is_null() {
                log::warn!("Ignoring non-object sharpdent settings: {}", section);
            }
            return false;
        };

        if let Some(style) = section.get("indentStyle") {
            match style.as_str().map(str::parse::<IndentStyle>) {
                Some(Ok(style)) => self.indent_style = style,
                Some(Err(e)) => log::warn!("Ignoring indentStyle: {}", e),
                None => log::warn!("Ignoring indentStyle: expected a string, got {}", style),
            }
        }
        if let Some(size) = section.get("indentSize") {
            if let Some(size) = width("indentSize", size) {
                self.indent_size = Some(size);
            }
        }
        if let Some(size) = section.get("tabSize") {
            if let Some(size) = width("tabSize", size) {
                self.tab_size = Some(size);
            }
        }
        if let Some(spaces) = section.get("insertSpaces") {
            match spaces.as_bool() {
                Some(spaces) => self.insert_spaces = Some(spaces),
                None => log::warn!("Ignoring insertSpaces: expected a boolean, got {}", spaces),
            }
        }

        let mut symbols_changed = false;
        if let Some(symbols) = section.get("preprocessorSymbols") {
            match symbols_from_json(symbols) {
                Some(symbols) => {
                    symbols_changed = symbols != self.preprocessor_symbols;
                    self.preprocessor_symbols = symbols;
                }
                None => log::warn!(
                    "Ignoring preprocessorSymbols: expected an array of strings, got {}",
                    symbols
                ),
            }
        }
        symbols_changed
    }

    /// Options for one request, filling unset widths from the client.
    pub fn formatting_options(&self, client: Option<&lsp_types::FormattingOptions>) -> FormattingOptions {
        let client_tab = client.map(|c| c.tab_size);
        let tab_size = self.tab_size.or(client_tab).unwrap_or(4).max(1);
        let indent_unit = self.indent_size.or(client_tab).unwrap_or(4).max(1);
        let use_tabs = match (self.insert_spaces, client) {
            (Some(spaces), _) => !spaces,
            (None, Some(client)) => !client.insert_spaces,
            (None, None) => false,
        };
        FormattingOptions::new(indent_unit, tab_size, use_tabs).unwrap_or_default()
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            preprocessor_symbols: self.preprocessor_symbols.clone(),
        }
    }
}

fn width(key: &str, value: &Value) -> Option<u32> {
    match value.as_u64() {
        Some(n) if (1..=MAX_WIDTH).contains(&n) => Some(n as u32),
        _ => {
            log::warn!("Ignoring {}: expected an integer in 1..={}, got {}", key, MAX_WIDTH, value);
            None
        }
    }
}

fn symbols_from_json(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|symbol| symbol.as_str().map(|s| s.trim().to_string()))
        .collect::<Option<Vec<_>>>()
        .map(|symbols| symbols.into_iter().filter(|s| !s.is_empty()).collect())
}
