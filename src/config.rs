use std::path::Path;

use serde::Deserialize;

use crate::diagnostic::Diagnostic;
use crate::ir::LabelGen;
use crate::span::Span;

/// Lowering options, usually read from the `[lower]` table of a
/// `p4dpdk.toml` or from a standalone file with the same keys.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LowerConfig {
    /// Prefix of every generated label.
    pub label_prefix: String,
    /// First label id of the unit.
    pub first_label: u32,
    /// Treat `InternetChecksum.get()` with no accumulator as an internal error.
    pub strict_checksum_get: bool,
    /// Warn when a standalone `Register.read` call is dropped.
    pub report_dropped_reads: bool,
    /// Check jump targets of each lowered block before returning it.
    pub verify_output: bool,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            label_prefix: "label_".to_string(),
            first_label: 0,
            strict_checksum_get: false,
            report_dropped_reads: true,
            verify_output: true,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    lower: Option<LowerConfig>,
}

impl LowerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Diagnostic> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read lowering config '{}': {}", path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse(&content).map_err(|d| Diagnostic {
            message: format!("{}: {}", path.display(), d.message),
            ..d
        })
    }

    /// Parse TOML text. Accepts either a `[lower]` table or bare top-level keys.
    pub fn parse(content: &str) -> Result<Self, Diagnostic> {
        let err = |e: toml::de::Error| {
            Diagnostic::error(format!("invalid lowering config: {}", e.message()), Span::dummy())
        };
        let value: toml::Table = content.parse().map_err(err)?;
        let config = if value.contains_key("lower") {
            let file: ConfigFile = toml::from_str(content).map_err(err)?;
            file.lower.unwrap_or_default()
        } else {
            toml::from_str::<LowerConfig>(content).map_err(err)?
        };
        if config.label_prefix.is_empty() {
            return Err(Diagnostic::error(
                "invalid lowering config: label_prefix must not be empty".to_string(),
                Span::dummy(),
            ));
        }
        Ok(config)
    }

    /// A fresh label counter for a whole unit.
    pub fn label_gen(&self) -> LabelGen {
        LabelGen::new(self.label_prefix.clone(), self.first_label)
    }
}
