//! Short-circuit lowering of branch conditions.

use crate::ast::{BinOp, CallTarget, Expr, Literal};
use crate::diagnostic::Diagnostic;
use crate::ir::{Instr, JumpCond, Label, LabelGen};
use crate::span::Spanned;

/// Turns a boolean condition into jumps to `on_true` / `on_false`.
///
/// Every leaf predicate lowers to the same pair: a conditional jump to the
/// true label followed by an unconditional jump to the false label.
pub struct BranchGen<'l> {
    labels: &'l mut LabelGen,
}

impl<'l> BranchGen<'l> {
    pub fn new(labels: &'l mut LabelGen) -> Self {
        Self { labels }
    }

    pub fn generate(
        &mut self,
        cond: &Spanned<Expr>,
        on_true: &Label,
        on_false: &Label,
        out: &mut Vec<Instr>,
    ) -> Result<(), Diagnostic> {
        match &cond.node {
            Expr::Binary {
                op: BinOp::LAnd,
                lhs,
                rhs,
            } => {
                // lhs false skips rhs entirely
                let rhs_label = self.labels.fresh().map_err(|d| d.with_span(cond.span))?;
                self.generate(lhs, &rhs_label, on_false, out)?;
                out.push(Instr::Label(rhs_label));
                self.generate(rhs, on_true, on_false, out)
            }

            Expr::Binary {
                op: BinOp::LOr,
                lhs,
                rhs,
            } => {
                let rhs_label = self.labels.fresh().map_err(|d| d.with_span(cond.span))?;
                self.generate(lhs, on_true, &rhs_label, out)?;
                out.push(Instr::Label(rhs_label));
                self.generate(rhs, on_true, on_false, out)
            }

            Expr::Binary { op, lhs, rhs } => {
                let Some(jump) = JumpCond::from_bin_op(*op) else {
                    return Err(Diagnostic::internal(
                        format!("unsupported operator '{}' in branch condition", op.as_str()),
                        cond.span,
                    )
                    .with_note(format!("condition: {}", cond.node)));
                };
                self.leaf(
                    Instr::JmpIf {
                        cond: jump,
                        target: on_true.clone(),
                        lhs: lhs.node.clone(),
                        rhs: rhs.node.clone(),
                    },
                    on_false,
                    out,
                );
                Ok(())
            }

            Expr::Call(call) => match &call.target {
                CallTarget::BuiltIn { name, applied_to } if name == "isValid" => {
                    self.leaf(
                        Instr::Validate {
                            target: on_true.clone(),
                            header: applied_to.node.clone(),
                        },
                        on_false,
                        out,
                    );
                    Ok(())
                }
                CallTarget::BuiltIn { name, .. } => Err(Diagnostic::internal(
                    format!("built-in method `{}` cannot be lowered as a condition", name),
                    cond.span,
                )),
                other => Err(Diagnostic::internal(
                    format!(
                        "{} `{}` cannot be lowered as a condition",
                        other.category(),
                        call.callee
                    ),
                    cond.span,
                )),
            },

            // `if (flag)` tests against 1
            Expr::Path(_) | Expr::Member { .. } => {
                self.leaf(
                    Instr::JmpIf {
                        cond: JumpCond::Equal,
                        target: on_true.clone(),
                        lhs: cond.node.clone(),
                        rhs: Expr::Literal(Literal::Integer(1)),
                    },
                    on_false,
                    out,
                );
                Ok(())
            }

            other => Err(Diagnostic::internal(
                format!("unsupported {} in branch condition", other.kind_name()),
                cond.span,
            )
            .with_note(format!("condition: {}", other))),
        }
    }

    fn leaf(&mut self, jump: Instr, on_false: &Label, out: &mut Vec<Instr>) {
        out.push(jump);
        out.push(Instr::Jmp(on_false.clone()));
    }
}
