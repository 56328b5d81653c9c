//! Per-call formatting inputs.
//!
//! Options are plain values handed to every engine call; nothing here is
//! process-wide or mutated after construction.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rejected option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("indent unit must be at least 1")]
    ZeroIndentUnit,
    #[error("tab size must be at least 1")]
    ZeroTabSize,
}

/// Indentation width settings for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingOptions {
    indent_unit: u32,
    tab_size: u32,
    use_tabs: bool,
}

impl FormattingOptions {
    /// Validates that both widths are non-zero.
    pub fn new(indent_unit: u32, tab_size: u32, use_tabs: bool) -> Result<Self, OptionsError> {
        if indent_unit == 0 {
            return Err(OptionsError::ZeroIndentUnit);
        }
        if tab_size == 0 {
            return Err(OptionsError::ZeroTabSize);
        }
        Ok(Self {
            indent_unit,
            tab_size,
            use_tabs,
        })
    }

    /// Columns added per indentation level.
    pub fn indent_unit(&self) -> u32 {
        self.indent_unit
    }

    /// Width a tab character expands to.
    pub fn tab_size(&self) -> u32 {
        self.tab_size
    }

    /// Whether generated whitespace uses tabs for whole tab stops.
    pub fn use_tabs(&self) -> bool {
        self.use_tabs
    }
}

impl Default for FormattingOptions {
    /// Four-column units, four-column tabs, spaces only.
    fn default() -> Self {
        Self {
            indent_unit: 4,
            tab_size: 4,
            use_tabs: false,
        }
    }
}

/// Host-selected indentation behaviour.
///
/// Only `Smart` consults the syntax tree; `Block` and `None` are handled by
/// the editor integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentStyle {
    /// Leave the new line at column 0.
    None,
    /// Copy the indentation of the previous non-blank line.
    Block,
    /// Syntax-aware indentation.
    #[default]
    Smart,
}

impl FromStr for IndentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(IndentStyle::None),
            "block" => Ok(IndentStyle::Block),
            "smart" => Ok(IndentStyle::Smart),
            other => Err(format!("unknown indent style '{}'", other)),
        }
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndentStyle::None => "none",
            IndentStyle::Block => "block",
            IndentStyle::Smart => "smart",
        };
        f.write_str(name)
    }
}

/// Placement of a C# island embedded in a foreign host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectionContext {
    /// Column of the island's top level in the host buffer.
    pub base_indentation: u32,
}
