//! StmtLowering: lowers type-checked statement trees into `Vec<Instr>`.
//!
//! One `StmtLowering` serves one compilation unit. It owns the unit's label
//! counter and lends it by `&mut` to every nested `BranchGen`, so labels
//! stay unique across all statement trees lowered through it.
//!
//! Two failure modes:
//! - internal inconsistencies return `Err(Diagnostic)` and abort the unit;
//! - malformed target usage records an error diagnostic, abandons the
//!   current statement and returns `Ok(())` so lowering continues.

mod branch;
mod call;
mod stmt;

use crate::ast::{CallExpr, Expr, Stmt};
use crate::checksum::ChecksumTable;
use crate::config::LowerConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::ir::{Instr, LabelGen};
use crate::span::{Span, Spanned};

pub use branch::BranchGen;
pub use call::ExternMethod;

// ─── StmtLowering ─────────────────────────────────────────────────

pub struct StmtLowering<'a> {
    /// Unit-wide label counter.
    pub(crate) labels: LabelGen,
    /// Accumulator names of checksum instances.
    pub(crate) checksums: &'a ChecksumTable,
    pub(crate) strict_checksum_get: bool,
    pub(crate) report_dropped_reads: bool,
    /// Recoverable errors and warnings seen so far.
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> StmtLowering<'a> {
    pub fn new(checksums: &'a ChecksumTable, config: &LowerConfig) -> Self {
        Self {
            labels: config.label_gen(),
            checksums,
            strict_checksum_get: config.strict_checksum_get,
            report_dropped_reads: config.report_dropped_reads,
            diagnostics: Vec::new(),
        }
    }

    /// Replace the label counter, e.g. with a per-block prefixed one.
    pub fn with_labels(mut self, labels: LabelGen) -> Self {
        self.labels = labels;
        self
    }

    /// Lower one statement tree into a fresh buffer.
    pub fn lower_tree(&mut self, stmt: &Spanned<Stmt>) -> Result<Vec<Instr>, Diagnostic> {
        let mut out = Vec::new();
        self.lower(stmt, &mut out)?;
        Ok(out)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn labels(&self) -> &LabelGen {
        &self.labels
    }

    /// Hand back the counter and the collected diagnostics.
    pub fn finish(self) -> (LabelGen, Vec<Diagnostic>) {
        (self.labels, self.diagnostics)
    }

    // ── Diagnostics ───────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: String, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    pub(crate) fn warning(&mut self, message: String, span: Span) {
        self.diagnostics.push(Diagnostic::warning(message, span));
    }
}

// ─── Helpers ──────────────────────────────────────────────────────

/// Argument `idx` of a call the type checker already accepted.
pub(crate) fn arg<'c>(call: &'c CallExpr, idx: usize, span: Span) -> Result<&'c Spanned<Expr>, Diagnostic> {
    call.args.get(idx).ok_or_else(|| {
        Diagnostic::internal(
            format!(
                "`{}` has {} argument(s), lowering needs argument {}",
                call.callee,
                call.args.len(),
                idx + 1
            ),
            span,
        )
    })
}
