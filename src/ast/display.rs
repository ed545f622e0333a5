//! Source-like rendering of expressions.
//!
//! Used for instruction operands and diagnostic messages.

use std::fmt;

use super::{CallExpr, Expr, ExternRef, Literal, Type, UnOp};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Bit(w) => write!(f, "bit<{}>", w),
            Type::Int(w) => write!(f, "int<{}>", w),
            Type::Named(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Path(name) => write!(f, "{}", name),
            Expr::Member { expr, member } => write!(f, "{}.{}", expr.node, member),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs.node, op.as_str(), rhs.node)
            }
            Expr::Unary { op, operand } => match op {
                UnOp::Cast(ty) => write!(f, "({}){}", ty, operand.node),
                UnOp::Neg => write!(f, "-{}", operand.node),
                UnOp::Cmpl => write!(f, "~{}", operand.node),
                UnOp::LNot => write!(f, "!{}", operand.node),
            },
            Expr::Call(call) => write!(f, "{}", call),
            Expr::List(items) => {
                write!(f, "{{")?;
                write_comma_list(f, items.iter().map(|i| &i.node))?;
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.callee)?;
        write_comma_list(f, self.args.iter().map(|a| &a.node))?;
        write!(f, ")")
    }
}

impl fmt::Display for ExternRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} on '{}' ({})",
            self.ty.name(),
            self.method,
            self.instance.name,
            self.instance.scope
        )
    }
}

fn write_comma_list<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Expr>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;
    use crate::ast::{BinOp, Type, UnOp};

    #[test]
    fn test_display_member_chain() {
        let e = member(member(var("hdr"), "ipv4"), "ttl");
        assert_eq!(e.node.to_string(), "hdr.ipv4.ttl");
    }

    #[test]
    fn test_display_binary_and_cast() {
        let e = binary(BinOp::Add, var("a"), int(1));
        assert_eq!(e.node.to_string(), "(a + 1)");
        let c = unary(UnOp::Cast(Type::Bit(16)), var("x"));
        assert_eq!(c.node.to_string(), "(bit<16>)x");
    }

    #[test]
    fn test_display_builtin_call() {
        let e = is_valid(member(var("hdr"), "ipv4"));
        assert_eq!(e.node.to_string(), "hdr.ipv4.isValid()");
    }

    #[test]
    fn test_display_list() {
        let e = list(vec![var("a"), member(var("h"), "b")]);
        assert_eq!(e.node.to_string(), "{a, h.b}");
    }
}
