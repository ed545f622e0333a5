//! Structural checks on lowered instruction sequences.
//!
//! A sequence is split into basic blocks at labels and after jumps; the
//! blocks form a petgraph control-flow graph. Checks:
//! - every jump target is defined in the same sequence,
//! - no label is defined twice,
//! - every block is reachable from the first instruction.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::ir::{Instr, Label};


// ─── Errors ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// Jump at `at` targets a label never defined.
    UndefinedLabel { at: usize, label: Label },
    /// Label defined at both positions.
    DuplicateLabel { label: Label, first: usize, second: usize },
    /// Instructions `start..end` cannot be reached.
    Unreachable { start: usize, end: usize },
    /// Label defined in two blocks of the same unit.
    LabelReused { label: Label, first_block: String, second_block: String },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::UndefinedLabel { at, label } => {
                write!(f, "instruction {} jumps to undefined label `{}`", at, label)
            }
            VerifyError::DuplicateLabel {
                label,
                first,
                second,
            } => write!(
                f,
                "label `{}` defined at instruction {} and again at {}",
                label, first, second
            ),
            VerifyError::Unreachable { start, end } => {
                write!(f, "instructions {}..{} are unreachable", start, end)
            }
            VerifyError::LabelReused {
                label,
                first_block,
                second_block,
            } => write!(
                f,
                "label `{}` defined in block `{}` and again in block `{}`",
                label, first_block, second_block
            ),
        }
    }
}

// ─── Control-flow graph ───────────────────────────────────────────

/// Basic blocks of a lowered sequence and the edges between them.
pub struct ControlFlow {
    pub graph: DiGraph<BasicBlock, ()>,
    /// Label name -> block it starts.
    pub label_blocks: BTreeMap<Label, NodeIndex>,
}

/// Half-open instruction range `start..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    pub start: usize,
    pub end: usize,
}

impl ControlFlow {
    pub fn build(instrs: &[Instr]) -> Self {
        let mut graph = DiGraph::new();
        let mut label_blocks = BTreeMap::new();

        // leaders: first instruction, every label, every instruction after a jump
        let mut leaders = BTreeSet::new();
        if !instrs.is_empty() {
            leaders.insert(0);
        }
        for (i, instr) in instrs.iter().enumerate() {
            if matches!(instr, Instr::Label(_)) {
                leaders.insert(i);
            }
            if instr.jump_target().is_some() && i + 1 < instrs.len() {
                leaders.insert(i + 1);
            }
        }

        let starts: Vec<usize> = leaders.into_iter().collect();
        let mut nodes = Vec::with_capacity(starts.len());
        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(instrs.len());
            let node = graph.add_node(BasicBlock { start, end });
            if let Instr::Label(label) = &instrs[start] {
                label_blocks.entry(label.clone()).or_insert(node);
            }
            nodes.push(node);
        }

        for (n, &node) in nodes.iter().enumerate() {
            let block = graph[node];
            let last = &instrs[block.end - 1];
            if let Some(target) = last.jump_target() {
                if let Some(&to) = label_blocks.get(target) {
                    graph.add_edge(node, to, ());
                }
            }
            if !last.is_unconditional_jump() {
                if let Some(&next) = nodes.get(n + 1) {
                    graph.add_edge(node, next, ());
                }
            }
        }

        Self {
            graph,
            label_blocks,
        }
    }

    pub fn entry(&self) -> Option<NodeIndex> {
        self.graph.node_indices().next()
    }

    /// Blocks not reachable from the entry block.
    pub fn unreachable_blocks(&self) -> Vec<BasicBlock> {
        let Some(entry) = self.entry() else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut dfs = Dfs::new(&self.graph, entry);
        while let Some(node) = dfs.next(&self.graph) {
            seen.insert(node);
        }
        self.graph
            .node_indices()
            .filter(|n| !seen.contains(n))
            .map(|n| self.graph[n])
            .collect()
    }
}

// ─── Checks ───────────────────────────────────────────────────────

/// Check one lowered statement tree.
pub fn verify(instrs: &[Instr]) -> Result<(), Vec<VerifyError>> {
    let mut errors = Vec::new();

    let mut defined: BTreeMap<&Label, usize> = BTreeMap::new();
    for (i, instr) in instrs.iter().enumerate() {
        if let Instr::Label(label) = instr {
            if let Some(&first) = defined.get(label) {
                errors.push(VerifyError::DuplicateLabel {
                    label: label.clone(),
                    first,
                    second: i,
                });
            } else {
                defined.insert(label, i);
            }
        }
    }

    for (i, instr) in instrs.iter().enumerate() {
        if let Some(target) = instr.jump_target() {
            if !defined.contains_key(target) {
                errors.push(VerifyError::UndefinedLabel {
                    at: i,
                    label: target.clone(),
                });
            }
        }
    }

    let cfg = ControlFlow::build(instrs);
    for block in cfg.unreachable_blocks() {
        errors.push(VerifyError::Unreachable {
            start: block.start,
            end: block.end,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that no label is defined in more than one block of a unit.
pub fn check_unit_labels<'a>(
    blocks: impl IntoIterator<Item = (&'a str, &'a [Instr])>,
) -> Result<(), Vec<VerifyError>> {
    let mut owner: BTreeMap<&Label, &str> = BTreeMap::new();
    let mut errors = Vec::new();
    for (name, instrs) in blocks {
        for instr in instrs {
            if let Instr::Label(label) = instr {
                match owner.get(label) {
                    Some(&first) if first != name => errors.push(VerifyError::LabelReused {
                        label: label.clone(),
                        first_block: first.to_string(),
                        second_block: name.to_string(),
                    }),
                    Some(_) => {}
                    None => {
                        owner.insert(label, name);
                    }
                }
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
