use crate::{
    ast::Value,
    translate::{BinaryOp, Expression, LikeShape},
};
use std::fmt::{Display, Formatter, Result};

/// Wraps a translated expression so it can be rendered with `format!` and
/// friends.
pub struct Printer<'a> {
    tree: &'a Expression,
}

impl<'a> Printer<'a> {
    pub fn new(tree: &'a Expression) -> Self {
        Self { tree }
    }
}

impl Display for Printer<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.tree.to_sql(f)
    }
}

pub trait ToSQL {
    fn to_sql(&self, out: &mut Formatter) -> Result;
}

impl ToSQL for BinaryOp {
    fn to_sql(&self, out: &mut Formatter) -> Result {
        match self {
            BinaryOp::Add => write!(out, "+"),
            BinaryOp::Sub => write!(out, "-"),
            BinaryOp::Mul => write!(out, "*"),
            BinaryOp::Div => write!(out, "/"),
            BinaryOp::Mod => write!(out, "%"),

            BinaryOp::Eq => write!(out, "="),
            BinaryOp::Ne => write!(out, "<>"),
            BinaryOp::Lt => write!(out, "<"),
            BinaryOp::Le => write!(out, "<="),
            BinaryOp::Gt => write!(out, ">"),
            BinaryOp::Ge => write!(out, ">="),
            BinaryOp::And => write!(out, "AND"),
            BinaryOp::Or => write!(out, "OR"),
            BinaryOp::Is => write!(out, "IS"),
        }
    }
}

impl ToSQL for Expression {
    fn to_sql(&self, out: &mut Formatter) -> Result {
        match self {
            Expression::Column(name) => write!(out, "{name}"),
            Expression::Param(name) => write!(out, "@{name}"),
            Expression::Null => write!(out, "NULL"),
            Expression::BinaryOperator(l, op, r) => {
                l.to_sql(out)?;
                write!(out, " ")?;
                op.to_sql(out)?;
                write!(out, " ")?;
                r.to_sql(out)
            }
            Expression::BoolColumn(name) => write!(out, "({name} = 1)"),
            Expression::Like {
                column,
                shape,
                param,
            } => match shape {
                LikeShape::Substring => write!(out, "({column} LIKE '%@{param}%')"),
                LikeShape::Prefix => write!(out, "({column} LIKE '@{param}%')"),
                LikeShape::Suffix => write!(out, "({column} LIKE '%@{param}')"),
            },
            Expression::InList { column, items } => {
                write!(out, "({column} IN (")?;
                let mut is_first = true;
                for item in items {
                    if is_first {
                        is_first = false;
                    } else {
                        write!(out, ", ")?;
                    }
                    write_value(out, item, false)?;
                }
                write!(out, "))")
            }
            Expression::BoolLiteral(v) => write!(out, "{}", if *v { "(1=1)" } else { "(1=0)" }),
        }
    }
}

/// Canonical textual form of a value in a literal-interpolated position.
/// Booleans become `1`/`0` in ordinary position but the `(1=1)`/`(1=0)`
/// forms when the value stands alone as a predicate.
pub(crate) fn write_value(out: &mut Formatter, value: &Value, unary: bool) -> Result {
    match value {
        Value::Null => write!(out, "NULL"),
        Value::Bool(v) if unary => write!(out, "{}", if *v { "(1=1)" } else { "(1=0)" }),
        Value::Bool(v) => write!(out, "{}", if *v { "1" } else { "0" }),
        Value::Int(v) => write!(out, "{v}"),
        Value::Decimal(v) => write!(out, "{v}"),
        Value::Text(v) => write!(out, "{v}"),
        Value::DateTime(v) => write!(out, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        Value::List(items) => {
            let mut is_first = true;
            for item in items {
                if is_first {
                    is_first = false;
                } else {
                    write!(out, ", ")?;
                }
                write_value(out, item, false)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ValuePrinter<'a>(&'a Value, bool);

    impl Display for ValuePrinter<'_> {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write_value(f, self.0, self.1)
        }
    }

    fn rendered(value: Value, unary: bool) -> String {
        ValuePrinter(&value, unary).to_string()
    }

    #[test]
    fn booleans_depend_on_position() {
        assert_eq!(rendered(Value::Bool(true), false), "1");
        assert_eq!(rendered(Value::Bool(false), false), "0");
        assert_eq!(rendered(Value::Bool(true), true), "(1=1)");
        assert_eq!(rendered(Value::Bool(false), true), "(1=0)");
    }

    #[test]
    fn scalars_render_canonically() {
        assert_eq!(rendered(Value::Int(42), false), "42");
        assert_eq!(rendered(Value::Decimal(9.5), false), "9.5");
        assert_eq!(rendered(Value::Text("widget".into()), false), "widget");
        assert_eq!(rendered(Value::Null, false), "NULL");
    }
}
