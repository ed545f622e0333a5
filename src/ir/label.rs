//! Labels and the per-unit label counter.

use std::fmt;

use serde::Serialize;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// A jump target inside one lowered sequence.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Label(pub String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three labels an `if` statement lowers around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfLabels {
    pub on_true: Label,
    pub on_false: Label,
    pub end: Label,
}

/// Monotonic label counter for one compilation unit.
///
/// Every statement and branch lowering in the unit draws from the same
/// counter, passed down by `&mut`. Two counters with the same prefix must
/// never serve the same unit.
#[derive(Clone, Debug)]
pub struct LabelGen {
    prefix: String,
    next: u32,
}

impl LabelGen {
    pub fn new(prefix: impl Into<String>, first: u32) -> Self {
        Self {
            prefix: prefix.into(),
            next: first,
        }
    }

    /// Ids never wrap: once the counter cannot advance the unit is out of labels.
    fn bump(&mut self) -> Result<u32, Diagnostic> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or_else(|| {
            Diagnostic::internal(
                format!("label counter exhausted after `{}{}`", self.prefix, id),
                Span::dummy(),
            )
        })?;
        Ok(id)
    }

    /// Fresh connective label, `label_N`.
    pub fn fresh(&mut self) -> Result<Label, Diagnostic> {
        let id = self.bump()?;
        Ok(Label::new(format!("{}{}", self.prefix, id)))
    }

    /// Fresh `label_Ntrue` / `label_Nfalse` / `label_Nend` triple sharing one id.
    pub fn fresh_if(&mut self) -> Result<IfLabels, Diagnostic> {
        let id = self.bump()?;
        Ok(IfLabels {
            on_true: Label::new(format!("{}{}true", self.prefix, id)),
            on_false: Label::new(format!("{}{}false", self.prefix, id)),
            end: Label::new(format!("{}{}end", self.prefix, id)),
        })
    }

    /// Next id to be handed out.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl Default for LabelGen {
    fn default() -> Self {
        Self::new("label_", 0)
    }
}
