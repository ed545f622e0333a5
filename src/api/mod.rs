//! Unit driver: lowers every control block of one compilation unit.

use rayon::prelude::*;
use serde::Serialize;

use crate::ast::Stmt;
use crate::checksum::ChecksumTable;
use crate::config::LowerConfig;
use crate::diagnostic::Diagnostic;
use crate::ir::{render, Instr, LabelGen};
use crate::lower::StmtLowering;
use crate::span::{Span, Spanned};
use crate::verify::{check_unit_labels, verify};

#[cfg(test)]
mod tests;

/// A named control block awaiting lowering (e.g. `ingress`, `egress`).
#[derive(Clone, Debug)]
pub struct ControlBlock {
    pub name: String,
    pub body: Spanned<Stmt>,
}

impl ControlBlock {
    pub fn new(name: impl Into<String>, body: Spanned<Stmt>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoweredBlock {
    pub name: String,
    pub span: Span,
    pub instrs: Vec<Instr>,
}

impl LoweredBlock {
    pub fn render(&self) -> String {
        render(&self.instrs)
    }
}

/// Result of a unit that lowered without errors.
#[derive(Clone, Debug)]
pub struct LoweredUnit {
    pub blocks: Vec<LoweredBlock>,
    pub warnings: Vec<Diagnostic>,
}

impl LoweredUnit {
    pub fn block(&self, name: &str) -> Option<&LoweredBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

/// Lower `blocks` in order with one label counter for the whole unit.
///
/// Recoverable errors from every block are collected; the first fatal
/// diagnostic stops the unit and is returned after everything recorded
/// before it.
pub fn lower_unit(
    blocks: &[ControlBlock],
    checksums: &ChecksumTable,
    config: &LowerConfig,
) -> Result<LoweredUnit, Vec<Diagnostic>> {
    let mut lowering = StmtLowering::new(checksums, config);
    let mut lowered = Vec::with_capacity(blocks.len());

    for block in blocks {
        match lowering.lower_tree(&block.body) {
            Ok(instrs) => lowered.push(LoweredBlock {
                name: block.name.clone(),
                span: block.body.span,
                instrs,
            }),
            Err(fatal) => {
                let (_, mut diagnostics) = lowering.finish();
                diagnostics.push(fatal);
                return Err(diagnostics);
            }
        }
    }

    let (_, diagnostics) = lowering.finish();
    finish_unit(lowered, diagnostics, config)
}

/// Lower `blocks` concurrently. Block `i` draws labels from its own
/// `{label_prefix}{i}_` range, so no two blocks share a label.
pub fn lower_unit_parallel(
    blocks: &[ControlBlock],
    checksums: &ChecksumTable,
    config: &LowerConfig,
) -> Result<LoweredUnit, Vec<Diagnostic>> {
    let results: Vec<(Result<Vec<Instr>, Diagnostic>, Vec<Diagnostic>)> = blocks
        .par_iter()
        .enumerate()
        .map(|(idx, block)| {
            let labels = LabelGen::new(
                format!("{}{}_", config.label_prefix, idx),
                config.first_label,
            );
            let mut lowering = StmtLowering::new(checksums, config).with_labels(labels);
            let result = lowering.lower_tree(&block.body);
            let (_, diagnostics) = lowering.finish();
            (result, diagnostics)
        })
        .collect();

    let mut lowered = Vec::with_capacity(blocks.len());
    let mut diagnostics = Vec::new();
    let mut fatal = false;
    for (block, (result, block_diagnostics)) in blocks.iter().zip(results) {
        diagnostics.extend(block_diagnostics);
        match result {
            Ok(instrs) => lowered.push(LoweredBlock {
                name: block.name.clone(),
                span: block.body.span,
                instrs,
            }),
            Err(err) => {
                diagnostics.push(err);
                fatal = true;
            }
        }
    }
    if fatal {
        return Err(diagnostics);
    }
    finish_unit(lowered, diagnostics, config)
}

fn finish_unit(
    blocks: Vec<LoweredBlock>,
    mut diagnostics: Vec<Diagnostic>,
    config: &LowerConfig,
) -> Result<LoweredUnit, Vec<Diagnostic>> {
    if config.verify_output {
        diagnostics.extend(verify_blocks(&blocks));
    }
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(diagnostics);
    }
    Ok(LoweredUnit {
        blocks,
        warnings: diagnostics,
    })
}

/// Structural problems in lowered output are lowering bugs.
fn verify_blocks(blocks: &[LoweredBlock]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for block in blocks {
        if let Err(errors) = verify(&block.instrs) {
            out.extend(errors.into_iter().map(|e| {
                Diagnostic::internal(
                    format!("malformed lowering of block `{}`: {}", block.name, e),
                    block.span,
                )
            }));
        }
    }
    let named = blocks
        .iter()
        .map(|b| (b.name.as_str(), b.instrs.as_slice()));
    if let Err(errors) = check_unit_labels(named) {
        out.extend(errors.into_iter().map(|e| {
            Diagnostic::internal(format!("malformed lowering of unit: {}", e), Span::dummy())
        }));
    }
    out
}
