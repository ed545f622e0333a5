//! Target instruction model.
//!
//! A lowered statement tree is a flat `Vec<Instr>`: program order is
//! execution order and `Instr::Label` marks jump targets. There is no
//! structured control flow and no implicit fallthrough between branches;
//! every edge is an explicit jump or label.

pub mod label;

use std::fmt;

use serde::Serialize;

use crate::ast::{BinOp, Expr, Type, UnOp};

pub use label::{IfLabels, Label, LabelGen};

// ─── Operator kinds ───────────────────────────────────────────────

/// Binary operators with a direct target instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Shl,
    Shr,
    Equ,
    LAnd,
    Leq,
}

impl ArithOp {
    /// Instruction for `dst = lhs OP rhs`, if the target has one.
    pub fn from_bin_op(op: BinOp) -> Option<Self> {
        match op {
            BinOp::Add => Some(ArithOp::Add),
            BinOp::Sub => Some(ArithOp::Sub),
            BinOp::Shl => Some(ArithOp::Shl),
            BinOp::Shr => Some(ArithOp::Shr),
            BinOp::Equ => Some(ArithOp::Equ),
            BinOp::LAnd => Some(ArithOp::LAnd),
            BinOp::Leq => Some(ArithOp::Leq),
            BinOp::Mul
            | BinOp::Neq
            | BinOp::Lss
            | BinOp::Grt
            | BinOp::Geq
            | BinOp::BAnd
            | BinOp::BOr
            | BinOp::BXor
            | BinOp::LOr => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Shl => "shl",
            ArithOp::Shr => "shr",
            ArithOp::Equ => "equ",
            ArithOp::LAnd => "land",
            ArithOp::Leq => "leq",
        }
    }
}

/// Single-operand instructions other than cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryKind {
    Neg,
    Cmpl,
    LNot,
}

impl UnaryKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            UnaryKind::Neg => "neg",
            UnaryKind::Cmpl => "cmpl",
            UnaryKind::LNot => "lnot",
        }
    }
}

/// Comparators of conditional jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum JumpCond {
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl JumpCond {
    /// Comparator for a relational leaf in a branch condition.
    pub fn from_bin_op(op: BinOp) -> Option<Self> {
        match op {
            BinOp::Equ => Some(JumpCond::Equal),
            BinOp::Neq => Some(JumpCond::NotEqual),
            BinOp::Lss => Some(JumpCond::Less),
            BinOp::Grt => Some(JumpCond::Greater),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            JumpCond::Equal => "jmpeq",
            JumpCond::NotEqual => "jmpneq",
            JumpCond::Less => "jmplt",
            JumpCond::Greater => "jmpgt",
        }
    }
}

// ─── Instructions ─────────────────────────────────────────────────

/// One target instruction. Operands are expressions from the input tree;
/// instance names are the declared extern instance names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Instr {
    // ── Data movement and arithmetic ──
    Mov {
        dst: Expr,
        src: Expr,
    },
    Binary {
        op: ArithOp,
        dst: Expr,
        lhs: Expr,
        rhs: Expr,
    },
    Unary {
        op: UnaryKind,
        dst: Expr,
        src: Expr,
    },
    Cast {
        dst: Expr,
        src: Expr,
        ty: Type,
    },

    // ── Control flow ──
    Label(Label),
    Jmp(Label),
    /// Jump to `target` when `lhs <cond> rhs`.
    JmpIf {
        cond: JumpCond,
        target: Label,
        lhs: Expr,
        rhs: Expr,
    },
    /// Jump to `target` when `header` is valid.
    Validate {
        target: Label,
        header: Expr,
    },

    // ── Tables ──
    Apply {
        table: String,
    },

    // ── Hash and checksum ──
    GetHash {
        instance: String,
        field: Expr,
        dst: Expr,
    },
    GetChecksum {
        dst: Expr,
        instance: String,
        accumulator: String,
    },
    ChecksumAdd {
        instance: String,
        accumulator: String,
        field: Expr,
    },

    // ── Stateful externs ──
    RegisterRead {
        dst: Expr,
        instance: String,
        index: Expr,
    },
    RegisterWrite {
        instance: String,
        index: Expr,
        value: Expr,
    },
    MeterExecute {
        instance: String,
        index: Expr,
        color: Expr,
    },
    CounterCount {
        instance: String,
        index: Expr,
    },

    // ── Packet ──
    Emit {
        header: Expr,
    },
    Extract {
        header: Expr,
    },
    /// Drop the packet with `error` unless `condition` holds.
    Verify {
        condition: Expr,
        error: Expr,
    },
}

impl Instr {
    pub fn mov(dst: &Expr, src: &Expr) -> Self {
        Instr::Mov {
            dst: dst.clone(),
            src: src.clone(),
        }
    }

    /// Unary instruction for a unary tree operator.
    pub fn unary(op: &UnOp, dst: &Expr, src: &Expr) -> Self {
        let (dst, src) = (dst.clone(), src.clone());
        match op {
            UnOp::Cast(ty) => Instr::Cast {
                dst,
                src,
                ty: ty.clone(),
            },
            UnOp::Neg => Instr::Unary {
                op: UnaryKind::Neg,
                dst,
                src,
            },
            UnOp::Cmpl => Instr::Unary {
                op: UnaryKind::Cmpl,
                dst,
                src,
            },
            UnOp::LNot => Instr::Unary {
                op: UnaryKind::LNot,
                dst,
                src,
            },
        }
    }

    /// Label this instruction may transfer control to, other than the next one.
    pub fn jump_target(&self) -> Option<&Label> {
        match self {
            Instr::Jmp(l) => Some(l),
            Instr::JmpIf { target, .. } | Instr::Validate { target, .. } => Some(target),
            _ => None,
        }
    }

    /// True when control never falls through to the next instruction.
    pub fn is_unconditional_jump(&self) -> bool {
        matches!(self, Instr::Jmp(_))
    }
}

// ─── Display ──────────────────────────────────────────────────────

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Mov { dst, src } => write!(f, "mov {} {}", dst, src),
            Instr::Binary { op, dst, lhs, rhs } => {
                write!(f, "{} {} {} {}", op.mnemonic(), dst, lhs, rhs)
            }
            Instr::Unary { op, dst, src } => write!(f, "{} {} {}", op.mnemonic(), dst, src),
            Instr::Cast { dst, src, ty } => write!(f, "cast {} {} {}", dst, ty, src),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Jmp(label) => write!(f, "jmp {}", label),
            Instr::JmpIf {
                cond,
                target,
                lhs,
                rhs,
            } => write!(f, "{} {} {} {}", cond.mnemonic(), target, lhs, rhs),
            Instr::Validate { target, header } => write!(f, "jmpv {} {}", target, header),
            Instr::Apply { table } => write!(f, "table {}", table),
            Instr::GetHash {
                instance,
                field,
                dst,
            } => write!(f, "hash {} {} {}", instance, field, dst),
            Instr::GetChecksum {
                dst,
                instance,
                accumulator,
            } => write!(f, "ckget {} {} {}", dst, instance, accumulator),
            Instr::ChecksumAdd {
                instance,
                accumulator,
                field,
            } => write!(f, "ckadd {} {} {}", instance, accumulator, field),
            Instr::RegisterRead {
                dst,
                instance,
                index,
            } => write!(f, "regrd {} {} {}", dst, instance, index),
            Instr::RegisterWrite {
                instance,
                index,
                value,
            } => write!(f, "regwr {} {} {}", instance, index, value),
            Instr::MeterExecute {
                instance,
                index,
                color,
            } => write!(f, "meter {} {} {}", instance, index, color),
            Instr::CounterCount { instance, index } => write!(f, "count {} {}", instance, index),
            Instr::Emit { header } => write!(f, "emit {}", header),
            Instr::Extract { header } => write!(f, "extract {}", header),
            Instr::Verify { condition, error } => write!(f, "verify {} {}", condition, error),
        }
    }
}

/// Render a lowered sequence one instruction per line, labels flush left
/// and everything else indented.
pub fn render(instrs: &[Instr]) -> String {
    let mut out = String::new();
    for instr in instrs {
        match instr {
            Instr::Label(_) => out.push_str(&format!("{}\n", instr)),
            _ => out.push_str(&format!("    {}\n", instr)),
        }
    }
    out
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;

    #[test]
    fn test_arith_op_supported_set() {
        assert_eq!(ArithOp::from_bin_op(BinOp::Add), Some(ArithOp::Add));
        assert_eq!(ArithOp::from_bin_op(BinOp::Leq), Some(ArithOp::Leq));
        assert_eq!(ArithOp::from_bin_op(BinOp::LAnd), Some(ArithOp::LAnd));
        assert_eq!(ArithOp::from_bin_op(BinOp::Neq), None);
        assert_eq!(ArithOp::from_bin_op(BinOp::LOr), None);
        assert_eq!(ArithOp::from_bin_op(BinOp::Mul), None);
    }

    #[test]
    fn test_jump_cond_relational_leaves() {
        assert_eq!(JumpCond::from_bin_op(BinOp::Equ), Some(JumpCond::Equal));
        assert_eq!(JumpCond::from_bin_op(BinOp::Neq), Some(JumpCond::NotEqual));
        assert_eq!(JumpCond::from_bin_op(BinOp::Lss), Some(JumpCond::Less));
        assert_eq!(JumpCond::from_bin_op(BinOp::Grt), Some(JumpCond::Greater));
        assert_eq!(JumpCond::from_bin_op(BinOp::Leq), None);
    }

    #[test]
    fn test_instr_display() {
        let dst = member(var("m"), "x").node;
        let ip = member(var("h"), "ip").node;
        assert_eq!(Instr::mov(&dst, &int(7).node).to_string(), "mov m.x 7");
        assert_eq!(
            Instr::Binary {
                op: ArithOp::Shl,
                dst: dst.clone(),
                lhs: var("a").node,
                rhs: int(2).node,
            }
            .to_string(),
            "shl m.x a 2"
        );
        assert_eq!(
            Instr::Validate {
                target: Label::new("label_0true"),
                header: ip.clone(),
            }
            .to_string(),
            "jmpv label_0true h.ip"
        );
        assert_eq!(
            Instr::Apply {
                table: "ipv4_lpm".into()
            }
            .to_string(),
            "table ipv4_lpm"
        );
        assert_eq!(Instr::Emit { header: ip }.to_string(), "emit h.ip");
    }

    #[test]
    fn test_unary_maps_cast_separately() {
        let dst = var("d").node;
        let src = var("s").node;
        assert_eq!(
            Instr::unary(&UnOp::Cast(Type::Bit(8)), &dst, &src).to_string(),
            "cast d bit<8> s"
        );
        assert_eq!(Instr::unary(&UnOp::Cmpl, &dst, &src).to_string(), "cmpl d s");
    }

    #[test]
    fn test_jump_target() {
        let l = Label::new("label_3");
        assert_eq!(Instr::Jmp(l.clone()).jump_target(), Some(&l));
        assert!(Instr::Jmp(l.clone()).is_unconditional_jump());
        let jif = Instr::JmpIf {
            cond: JumpCond::Less,
            target: l.clone(),
            lhs: var("a").node,
            rhs: var("b").node,
        };
        assert_eq!(jif.jump_target(), Some(&l));
        assert!(!jif.is_unconditional_jump());
        assert_eq!(Instr::Label(l).jump_target(), None);
    }

    #[test]
    fn test_render_indents_non_labels() {
        let ops = vec![
            Instr::Label(Label::new("label_0true")),
            Instr::Jmp(Label::new("label_0end")),
        ];
        assert_eq!(render(&ops), "label_0true:\n    jmp label_0end\n");
    }
}
