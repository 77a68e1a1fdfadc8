//! Important implementation note!
//! WHERE fragments render bare column names (`Id > @Id`), not the
//! bracket-qualified `[table].[column]` form the statement templates use:
//! the fragment must splice onto a single-table statement where the bare
//! name is unambiguous, and parameter names must line up with what the
//! extractor produces for the same tree.
//!
//! Two positions interpolate literals instead of binding parameters: the
//! LIKE patterns (the `@Name` token is spliced into a quoted pattern) and
//! IN-list elements. Both are accepted limitations of the modeled dialect,
//! preserved as-is.

use crate::{
    ast::{CompareOp, Field, Predicate, Value},
    error::Error,
};

/// Binary operators of the output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Is,
}

/// Where the wildcard goes in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeShape {
    /// `'%@Name%'`
    Substring,
    /// `'@Name%'`
    Prefix,
    /// `'%@Name'`
    Suffix,
}

/// The output of translation: a predicate tree goes in, a SQL boolean
/// expression tree comes out. Rendering to text lives in [`crate::to_sql`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A bare column reference.
    Column(String),
    /// A named bind parameter, printed `@Name`.
    Param(String),
    Null,
    BinaryOperator(Box<Expression>, BinaryOp, Box<Expression>),
    /// `(Name = 1)`, a boolean column used standalone.
    BoolColumn(String),
    /// `(Name LIKE '%@Name%')` and friends.
    Like {
        column: String,
        shape: LikeShape,
        param: String,
    },
    /// `(Name IN (1, 2, 3))` with elements inlined at translation time.
    /// Never empty: an empty membership collection translates to the
    /// constant-false literal instead.
    InList { column: String, items: Vec<Value> },
    /// `(1=1)` / `(1=0)`.
    BoolLiteral(bool),
}

pub type Result = std::result::Result<Expression, Error>;

/// Translates a predicate into a boolean expression of the output dialect.
///
/// `AND`/`OR` may appear only at the root of the tree; one level is all
/// the parameter extractor can name without collisions, and the two walks
/// must stay in lockstep.
pub fn translate(predicate: &Predicate) -> Result {
    translate_node(predicate, true)
}

fn translate_node(predicate: &Predicate, root: bool) -> Result {
    match predicate {
        Predicate::And(l, r) => connective(BinaryOp::And, l, r, root),
        Predicate::Or(l, r) => connective(BinaryOp::Or, l, r, root),

        Predicate::Compare { op, field, value } => {
            let column = column_name(field)?;
            if *value == Value::Null {
                // Equality against NULL becomes the IS form; the other
                // operators keep their token and compare against the
                // literal NULL, which no parameter can stand in for.
                let op = match op {
                    CompareOp::Eq => BinaryOp::Is,
                    other => binary_op(*other),
                };
                return Ok(Expression::BinaryOperator(
                    Box::new(Expression::Column(column)),
                    op,
                    Box::new(Expression::Null),
                ));
            }
            Ok(Expression::BinaryOperator(
                Box::new(Expression::Column(column.clone())),
                binary_op(*op),
                Box::new(Expression::Param(column)),
            ))
        }

        Predicate::BoolField(field) => Ok(Expression::BoolColumn(column_name(field)?)),

        Predicate::Method { name, field, .. } => {
            let shape = match name.as_str() {
                "Contains" => LikeShape::Substring,
                "StartsWith" => LikeShape::Prefix,
                "EndsWith" => LikeShape::Suffix,
                other => return Err(Error::UnsupportedMethod(other.to_string())),
            };
            let column = column_name(field)?;
            Ok(Expression::Like {
                param: column.clone(),
                column,
                shape,
            })
        }

        Predicate::In { field, values } => {
            if values.is_empty() {
                // An empty IN() is invalid SQL; fold to constant false.
                return Ok(Expression::BoolLiteral(false));
            }
            Ok(Expression::InList {
                column: column_name(field)?,
                items: values.clone(),
            })
        }

        Predicate::Not(_) => Err(Error::UnsupportedNode("Not")),
    }
}

fn connective(op: BinaryOp, l: &Predicate, r: &Predicate, root: bool) -> Result {
    if !root {
        let name = if op == BinaryOp::And { "AND" } else { "OR" };
        return Err(Error::NestingDepth(name.to_string()));
    }
    Ok(Expression::BinaryOperator(
        Box::new(translate_node(l, false)?),
        op,
        Box::new(translate_node(r, false)?),
    ))
}

fn binary_op(op: CompareOp) -> BinaryOp {
    match op {
        CompareOp::Add => BinaryOp::Add,
        CompareOp::Sub => BinaryOp::Sub,
        CompareOp::Mul => BinaryOp::Mul,
        CompareOp::Div => BinaryOp::Div,
        CompareOp::Mod => BinaryOp::Mod,
        CompareOp::Eq => BinaryOp::Eq,
        CompareOp::Ne => BinaryOp::Ne,
        CompareOp::Lt => BinaryOp::Lt,
        CompareOp::Le => BinaryOp::Le,
        CompareOp::Gt => BinaryOp::Gt,
        CompareOp::Ge => BinaryOp::Ge,
    }
}

pub(crate) fn column_name(field: &Field) -> std::result::Result<String, Error> {
    match field.depth() {
        1 | 2 => Ok(field.key()),
        _ => Err(Error::NestingDepth(field.key())),
    }
}
