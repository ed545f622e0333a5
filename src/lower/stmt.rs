//! Block, assignment and `if` lowering.

use crate::ast::{Expr, Stmt};
use crate::diagnostic::Diagnostic;
use crate::ir::{ArithOp, Instr};
use crate::span::Spanned;

use super::{BranchGen, StmtLowering};

impl StmtLowering<'_> {
    /// Append the instructions of `stmt` to `out`.
    pub fn lower(&mut self, stmt: &Spanned<Stmt>, out: &mut Vec<Instr>) -> Result<(), Diagnostic> {
        match &stmt.node {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.lower(s, out)?;
                }
                Ok(())
            }

            Stmt::Assign { lhs, rhs } => self.lower_assign(lhs, rhs, out),

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let labels = self
                    .labels
                    .fresh_if()
                    .map_err(|d| d.with_span(stmt.span))?;
                BranchGen::new(&mut self.labels).generate(
                    cond,
                    &labels.on_true,
                    &labels.on_false,
                    out,
                )?;

                out.push(Instr::Label(labels.on_true));
                self.lower(then_branch, out)?;
                out.push(Instr::Jmp(labels.end.clone()));
                out.push(Instr::Label(labels.on_false));
                if let Some(else_branch) = else_branch {
                    self.lower(else_branch, out)?;
                }
                out.push(Instr::Label(labels.end));
                Ok(())
            }

            Stmt::Call(call) => self.lower_call_stmt(call, out),
        }
    }

    fn lower_assign(
        &mut self,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
        out: &mut Vec<Instr>,
    ) -> Result<(), Diagnostic> {
        let dst = &lhs.node;
        match &rhs.node {
            Expr::Binary {
                op,
                lhs: left,
                rhs: right,
            } => {
                let Some(arith) = ArithOp::from_bin_op(*op) else {
                    return Err(Diagnostic::internal(
                        format!("unsupported binary operator '{}' in assignment", op.as_str()),
                        rhs.span,
                    )
                    .with_note(format!("while lowering `{} = {}`", dst, rhs.node)));
                };
                out.push(Instr::Binary {
                    op: arith,
                    dst: dst.clone(),
                    lhs: left.node.clone(),
                    rhs: right.node.clone(),
                });
            }

            Expr::Call(call) => self.lower_call_assign(dst, call, rhs.span, out)?,

            Expr::Unary { op, operand } => out.push(Instr::unary(op, dst, &operand.node)),

            Expr::Path(_) | Expr::Member { .. } | Expr::Literal(_) => {
                out.push(Instr::mov(dst, &rhs.node))
            }

            Expr::List(_) => {
                return Err(Diagnostic::internal(
                    format!(
                        "unsupported {} on the right-hand side of an assignment",
                        rhs.node.kind_name()
                    ),
                    rhs.span,
                )
                .with_note(format!("while lowering `{} = {}`", dst, rhs.node)));
            }
        }
        Ok(())
    }
}
