//! Call dispatch: tables, extern methods, extern functions.
//!
//! Dispatch is two-level. The resolved `CallTarget` picks the category;
//! within extern methods, `ExternMethod::resolve` maps the
//! (primitive type, method name) pair to the one operation the target
//! supports. Supporting a new primitive means adding a variant there and
//! its instruction sequence below.

use crate::ast::{CallExpr, CallTarget, Expr, ExternRef, ExternType};
use crate::diagnostic::Diagnostic;
use crate::ir::Instr;
use crate::span::{Span, Spanned};

use super::{arg, StmtLowering};

// ─── Extern method table ──────────────────────────────────────────

/// Extern methods the target can lower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternMethod {
    HashGet,
    ChecksumAdd,
    ChecksumGet,
    RegisterGet,
    RegisterRead,
    RegisterWrite,
    MeterExecute,
    CounterCount,
    PacketEmit,
    PacketExtract,
}

impl ExternMethod {
    pub fn resolve(ty: &ExternType, method: &str) -> Option<Self> {
        match ty {
            ExternType::Hash => match method {
                "get" => Some(ExternMethod::HashGet),
                _ => None,
            },
            ExternType::InternetChecksum => match method {
                "add" => Some(ExternMethod::ChecksumAdd),
                "get" => Some(ExternMethod::ChecksumGet),
                _ => None,
            },
            ExternType::Register => match method {
                "get" => Some(ExternMethod::RegisterGet),
                "read" => Some(ExternMethod::RegisterRead),
                "write" => Some(ExternMethod::RegisterWrite),
                _ => None,
            },
            ExternType::Meter => match method {
                "execute" => Some(ExternMethod::MeterExecute),
                _ => None,
            },
            ExternType::Counter => match method {
                "count" => Some(ExternMethod::CounterCount),
                _ => None,
            },
            ExternType::PacketOut => match method {
                "emit" => Some(ExternMethod::PacketEmit),
                _ => None,
            },
            ExternType::PacketIn => match method {
                "extract" => Some(ExternMethod::PacketExtract),
                _ => None,
            },
            ExternType::Other(_) => None,
        }
    }

    /// Arguments lowering reads.
    pub fn required_args(&self) -> usize {
        match self {
            ExternMethod::ChecksumGet | ExternMethod::RegisterRead => 0,
            ExternMethod::HashGet
            | ExternMethod::ChecksumAdd
            | ExternMethod::RegisterGet
            | ExternMethod::CounterCount
            | ExternMethod::PacketEmit
            | ExternMethod::PacketExtract => 1,
            ExternMethod::RegisterWrite | ExternMethod::MeterExecute => 2,
        }
    }
}

/// Resolve an extern call and check it carries the arguments lowering reads.
fn resolve_extern(ext: &ExternRef, call: &CallExpr, span: Span) -> Result<ExternMethod, Diagnostic> {
    let Some(method) = ExternMethod::resolve(&ext.ty, &ext.method) else {
        return Err(Diagnostic::internal(
            format!("extern method `{}.{}` is not supported", ext.ty.name(), ext.method),
            span,
        )
        .with_note(format!("called as `{}` on {}", call.callee, ext)));
    };
    if call.args.len() < method.required_args() {
        return Err(Diagnostic::internal(
            format!(
                "`{}.{}` expects {} argument(s), found {}",
                ext.ty.name(),
                ext.method,
                method.required_args(),
                call.args.len()
            ),
            span,
        ));
    }
    Ok(method)
}

// ─── Call lowering ────────────────────────────────────────────────

impl StmtLowering<'_> {
    /// `dst = call(...)`
    pub(crate) fn lower_call_assign(
        &mut self,
        dst: &Expr,
        call: &CallExpr,
        span: Span,
        out: &mut Vec<Instr>,
    ) -> Result<(), Diagnostic> {
        let ext = match &call.target {
            CallTarget::ExternMethod(ext) => ext,
            CallTarget::BuiltIn { name, .. } => {
                return Err(Diagnostic::internal(
                    format!("built-in method `{}` is not supported in an assignment", name),
                    span,
                ));
            }
            other => {
                return Err(Diagnostic::internal(
                    format!(
                        "{} `{}` is not supported in an assignment",
                        other.category(),
                        call.callee
                    ),
                    span,
                ));
            }
        };

        let instance = ext.instance.name.clone();
        match resolve_extern(ext, call, span)? {
            ExternMethod::HashGet => out.push(Instr::GetHash {
                instance,
                field: arg(call, 0, span)?.node.clone(),
                dst: dst.clone(),
            }),
            ExternMethod::ChecksumGet => {
                let checksums = self.checksums;
                let accumulator = match checksums.get(&ext.instance) {
                    Some(acc) => acc.to_string(),
                    None if self.strict_checksum_get => {
                        return Err(Diagnostic::internal(
                            format!("no checksum accumulator recorded for `{}`", instance),
                            span,
                        ));
                    }
                    None => {
                        self.warning(
                            format!(
                                "no checksum accumulator recorded for `{}`; using an empty accumulator name",
                                instance
                            ),
                            span,
                        );
                        String::new()
                    }
                };
                out.push(Instr::GetChecksum {
                    dst: dst.clone(),
                    instance,
                    accumulator,
                });
            }
            ExternMethod::RegisterGet => out.push(Instr::RegisterRead {
                dst: dst.clone(),
                instance,
                index: arg(call, 0, span)?.node.clone(),
            }),
            method => {
                return Err(Diagnostic::internal(
                    format!(
                        "extern method `{}.{}` is not supported in an assignment",
                        ext.ty.name(),
                        ext.method
                    ),
                    span,
                )
                .with_note(format!("resolved as {:?}", method)));
            }
        }
        Ok(())
    }

    /// A call used as a statement.
    pub(crate) fn lower_call_stmt(
        &mut self,
        call: &Spanned<CallExpr>,
        out: &mut Vec<Instr>,
    ) -> Result<(), Diagnostic> {
        let span = call.span;
        let call = &call.node;
        match &call.target {
            CallTarget::Apply {
                object,
                is_table: true,
            } => {
                out.push(Instr::Apply {
                    table: object.clone(),
                });
                Ok(())
            }
            CallTarget::Apply { object, .. } => Err(Diagnostic::internal(
                format!("`apply` is only supported on tables, not on `{}`", object),
                span,
            )),
            CallTarget::ExternMethod(ext) => self.lower_extern_stmt(ext, call, span, out),
            CallTarget::ExternFunction { name } if name == "verify" => {
                out.push(Instr::Verify {
                    condition: arg(call, 0, span)?.node.clone(),
                    error: arg(call, 1, span)?.node.clone(),
                });
                Ok(())
            }
            CallTarget::ExternFunction { name } => Err(Diagnostic::internal(
                format!("extern function `{}` is not supported", name),
                span,
            )),
            other => Err(Diagnostic::internal(
                format!("{} `{}` is not supported as a statement", other.category(), call.callee),
                span,
            )),
        }
    }

    fn lower_extern_stmt(
        &mut self,
        ext: &ExternRef,
        call: &CallExpr,
        span: Span,
        out: &mut Vec<Instr>,
    ) -> Result<(), Diagnostic> {
        let instance = ext.instance.name.clone();
        match resolve_extern(ext, call, span)? {
            ExternMethod::ChecksumAdd => {
                let checksums = self.checksums;
                let Some(accumulator) = checksums.get(&ext.instance) else {
                    let note = "every InternetChecksum instance used with `add` \
                                must be collected before lowering";
                    return Err(Diagnostic::internal(
                        format!("no checksum accumulator recorded for `{}`", instance),
                        span,
                    )
                    .with_note(note.to_string()));
                };
                let accumulator = accumulator.to_string();
                let fields = arg(call, 0, span)?;
                match &fields.node {
                    Expr::List(items) => {
                        for field in items {
                            out.push(Instr::ChecksumAdd {
                                instance: instance.clone(),
                                accumulator: accumulator.clone(),
                                field: field.node.clone(),
                            });
                        }
                    }
                    other => self.error(
                        format!(
                            "the argument of `InternetChecksum.add` must be a list, found {}",
                            other.kind_name()
                        ),
                        fields.span,
                    ),
                }
            }
            ExternMethod::PacketEmit => {
                if let Some(header) = self.header_arg(call, span, "emit")? {
                    out.push(Instr::Emit { header });
                }
            }
            ExternMethod::PacketExtract => {
                if let Some(header) = self.header_arg(call, span, "extract")? {
                    out.push(Instr::Extract { header });
                }
            }
            ExternMethod::MeterExecute => out.push(Instr::MeterExecute {
                instance,
                index: arg(call, 0, span)?.node.clone(),
                color: arg(call, 1, span)?.node.clone(),
            }),
            ExternMethod::CounterCount => out.push(Instr::CounterCount {
                instance,
                index: arg(call, 0, span)?.node.clone(),
            }),
            ExternMethod::RegisterRead => {
                // value is consumed through the `get` assignment path
                if self.report_dropped_reads {
                    self.warning(
                        format!("result of `{}` is unused; register read dropped", call),
                        span,
                    );
                }
            }
            ExternMethod::RegisterWrite => out.push(Instr::RegisterWrite {
                instance,
                index: arg(call, 0, span)?.node.clone(),
                value: arg(call, 1, span)?.node.clone(),
            }),
            method @ (ExternMethod::HashGet
            | ExternMethod::ChecksumGet
            | ExternMethod::RegisterGet) => {
                return Err(Diagnostic::internal(
                    format!(
                        "extern method `{}.{}` returns a value and is not supported as a statement",
                        ext.ty.name(),
                        ext.method
                    ),
                    span,
                )
                .with_note(format!("resolved as {:?}", method)));
            }
        }
        Ok(())
    }

    /// The header operand of `emit` / `extract`, or `None` after recording
    /// an error when it is not a plain field reference.
    fn header_arg(
        &mut self,
        call: &CallExpr,
        span: Span,
        what: &str,
    ) -> Result<Option<Expr>, Diagnostic> {
        let header = arg(call, 0, span)?;
        if header.node.is_field_ref() {
            return Ok(Some(header.node.clone()));
        }
        self.diagnostics.push(
            Diagnostic::error(
                format!(
                    "the argument of `{}` must be a header or header field, found {}",
                    what,
                    header.node.kind_name()
                ),
                header.span,
            )
            .with_help(format!("write `packet.{}(hdr.name)`", what)),
        );
        Ok(None)
    }
}
