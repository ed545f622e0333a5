//! Typed statement/expression trees handed to lowering by the front end.
//!
//! Trees arrive type-checked and with every call already resolved to a
//! `CallTarget`. Lowering only reads them.

pub mod build;
pub mod display;

use serde::Serialize;

use crate::span::Spanned;

/// Stable identity of a declared instance: declared name plus the scope
/// (control, parser or package) it was declared in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InstanceId {
    pub scope: String,
    pub name: String,
}

impl InstanceId {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

/// Types that can appear as the target of a cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Type {
    Bool,
    Bit(u32),
    Int(u32),
    Named(String),
}

/// Statements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Stmt {
    Block(Vec<Spanned<Stmt>>),
    Assign {
        lhs: Spanned<Expr>,
        rhs: Spanned<Expr>,
    },
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    Call(Spanned<CallExpr>),
}

/// Expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Expr {
    /// Reference to a local, parameter or header instance.
    Path(String),
    Member {
        expr: Box<Spanned<Expr>>,
        member: String,
    },
    Literal(Literal),
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Unary {
        op: UnOp,
        operand: Box<Spanned<Expr>>,
    },
    Call(CallExpr),
    /// `{a, b, c}` list expression.
    List(Vec<Spanned<Expr>>),
}

impl Expr {
    /// Short name of the expression kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Path(_) => "path expression",
            Expr::Member { .. } => "member expression",
            Expr::Literal(Literal::Integer(_)) => "integer constant",
            Expr::Literal(Literal::Bool(_)) => "boolean literal",
            Expr::Binary { .. } => "binary expression",
            Expr::Unary { .. } => "unary expression",
            Expr::Call(_) => "method call expression",
            Expr::List(_) => "list expression",
        }
    }

    /// Plain variable reference or member access.
    pub fn is_field_ref(&self) -> bool {
        matches!(self, Expr::Path(_) | Expr::Member { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Literal {
    Integer(u64),
    Bool(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,  // +
    Sub,  // -
    Mul,  // *
    Shl,  // <<
    Shr,  // >>
    Equ,  // ==
    Neq,  // !=
    Lss,  // <
    Grt,  // >
    Leq,  // <=
    Geq,  // >=
    BAnd, // &
    BOr,  // |
    BXor, // ^
    LAnd, // &&
    LOr,  // ||
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Equ => "==",
            BinOp::Neq => "!=",
            BinOp::Lss => "<",
            BinOp::Grt => ">",
            BinOp::Leq => "<=",
            BinOp::Geq => ">=",
            BinOp::BAnd => "&",
            BinOp::BOr => "|",
            BinOp::BXor => "^",
            BinOp::LAnd => "&&",
            BinOp::LOr => "||",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Cast(Type),
    Neg,
    Cmpl,
    LNot,
}

/// A call expression together with what the resolver decided it calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallExpr {
    /// Callee as written, e.g. `pkt.emit` or `ipv4_lpm.apply`.
    pub callee: String,
    pub target: CallTarget,
    pub args: Vec<Spanned<Expr>>,
}

/// Semantic category of a resolved call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CallTarget {
    /// `x.apply()` where `x` is a table (`is_table`) or a control/parser.
    Apply { object: String, is_table: bool },
    /// Method on an extern object instance.
    ExternMethod(ExternRef),
    /// Free extern function such as `verify`.
    ExternFunction { name: String },
    /// Built-in method such as `hdr.isValid()`.
    BuiltIn {
        name: String,
        applied_to: Box<Spanned<Expr>>,
    },
    /// Direct action invocation.
    Action { name: String },
}

impl CallTarget {
    pub fn category(&self) -> &'static str {
        match self {
            CallTarget::Apply { .. } => "apply method",
            CallTarget::ExternMethod(_) => "extern method",
            CallTarget::ExternFunction { .. } => "extern function",
            CallTarget::BuiltIn { .. } => "built-in method",
            CallTarget::Action { .. } => "action call",
        }
    }
}

/// Resolved identity of an extern method call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExternRef {
    pub instance: InstanceId,
    pub ty: ExternType,
    pub method: String,
}

/// Extern primitive types of the target architecture.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExternType {
    Hash,
    InternetChecksum,
    Register,
    Meter,
    Counter,
    PacketIn,
    PacketOut,
    /// Any other declared extern; the target cannot lower it.
    Other(String),
}

impl ExternType {
    pub fn name(&self) -> &str {
        match self {
            ExternType::Hash => "Hash",
            ExternType::InternetChecksum => "InternetChecksum",
            ExternType::Register => "Register",
            ExternType::Meter => "Meter",
            ExternType::Counter => "Counter",
            ExternType::PacketIn => "packet_in",
            ExternType::PacketOut => "packet_out",
            ExternType::Other(name) => name,
        }
    }
}
