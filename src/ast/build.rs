//! Shorthand constructors for trees with synthesized (dummy) spans.
//!
//! Front ends attach real spans; these helpers serve tests, benches and
//! passes that synthesize statements.

use super::*;
use crate::span::Spanned;

pub fn var(name: &str) -> Spanned<Expr> {
    Spanned::dummy(Expr::Path(name.to_string()))
}

pub fn member(base: Spanned<Expr>, name: &str) -> Spanned<Expr> {
    Spanned::dummy(Expr::Member {
        expr: Box::new(base),
        member: name.to_string(),
    })
}

pub fn int(value: u64) -> Spanned<Expr> {
    Spanned::dummy(Expr::Literal(Literal::Integer(value)))
}

pub fn boolean(value: bool) -> Spanned<Expr> {
    Spanned::dummy(Expr::Literal(Literal::Bool(value)))
}

pub fn binary(op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn unary(op: UnOp, operand: Spanned<Expr>) -> Spanned<Expr> {
    Spanned::dummy(Expr::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn list(items: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    Spanned::dummy(Expr::List(items))
}

/// `header.isValid()`
pub fn is_valid(header: Spanned<Expr>) -> Spanned<Expr> {
    let callee = format!("{}.isValid", header.node);
    call(CallExpr {
        callee,
        target: CallTarget::BuiltIn {
            name: "isValid".to_string(),
            applied_to: Box::new(header),
        },
        args: Vec::new(),
    })
}

/// `instance.method(args)` on an extern declared in `scope`.
pub fn extern_call(
    scope: &str,
    instance: &str,
    ty: ExternType,
    method: &str,
    args: Vec<Spanned<Expr>>,
) -> CallExpr {
    CallExpr {
        callee: format!("{}.{}", instance, method),
        target: CallTarget::ExternMethod(ExternRef {
            instance: InstanceId::new(scope, instance),
            ty,
            method: method.to_string(),
        }),
        args,
    }
}

/// Free extern function call, e.g. `verify(cond, err)`.
pub fn extern_fn(name: &str, args: Vec<Spanned<Expr>>) -> CallExpr {
    CallExpr {
        callee: name.to_string(),
        target: CallTarget::ExternFunction {
            name: name.to_string(),
        },
        args,
    }
}

/// `table.apply()`
pub fn table_apply(table: &str) -> CallExpr {
    CallExpr {
        callee: format!("{}.apply", table),
        target: CallTarget::Apply {
            object: table.to_string(),
            is_table: true,
        },
        args: Vec::new(),
    }
}

pub fn call(call: CallExpr) -> Spanned<Expr> {
    Spanned::dummy(call).map(Expr::Call)
}

pub fn assign(lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::Assign { lhs, rhs })
}

pub fn call_stmt(call: CallExpr) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::Call(Spanned::dummy(call)))
}

pub fn block(stmts: Vec<Spanned<Stmt>>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::Block(stmts))
}

pub fn if_then(cond: Spanned<Expr>, then_branch: Spanned<Stmt>) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch: None,
    })
}

pub fn if_else(
    cond: Spanned<Expr>,
    then_branch: Spanned<Stmt>,
    else_branch: Spanned<Stmt>,
) -> Spanned<Stmt> {
    Spanned::dummy(Stmt::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch: Some(Box::new(else_branch)),
    })
}
