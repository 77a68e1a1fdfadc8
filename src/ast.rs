use chrono::NaiveDateTime;

/// Operators allowed in a [`Predicate::Compare`].
///
/// The arithmetic operators are mapped through to the dialect for
/// completeness; top-level predicates only ever produce the relational ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
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
}

/// A reference to an entity field.
///
/// At most one level of member nesting is supported ([`Field::nested`]), and
/// a nested reference resolves to the concatenation of its segments, so
/// `nested("Category", "Name")` names the column and parameter
/// `CategoryName`. Deeper paths are representable through
/// [`Field::from_path`] but rejected at translation time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    path: Vec<String>,
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            path: vec![name.into()],
        }
    }

    pub fn nested(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: vec![parent.into(), name.into()],
        }
    }

    pub fn from_path(path: Vec<String>) -> Self {
        Self { path }
    }

    /// The column/parameter name this reference resolves to: the path
    /// segments concatenated without a separator.
    pub fn key(&self) -> String {
        self.path.concat()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// A literal in a predicate, and the unit of parameter binding.
///
/// Each kind has one canonical textual form (see [`crate::to_sql`]) used
/// wherever a value is inlined into statement text rather than bound by name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// An array-valued bind parameter (the `@Ids` key of a batch delete).
    /// Never produced by predicate translation.
    List(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}
impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// A boolean expression tree over a single entity: the input to the WHERE
/// translator and the parameter extractor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    Compare {
        op: CompareOp,
        field: Field,
        value: Value,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    /// A boolean field used standalone, an implicit `= true`.
    BoolField(Field),
    /// A string method call, dispatched by name. Only `Contains`,
    /// `StartsWith` and `EndsWith` translate.
    Method {
        name: String,
        field: Field,
        value: Value,
    },
    /// Collection membership; elements are inlined as literals at
    /// translation time.
    In { field: Field, values: Vec<Value> },
    /// Constructible but outside the supported grammar; translation
    /// reports it as an unsupported node.
    Not(Box<Predicate>),
}

impl Field {
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }
    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }
    pub fn le(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Le, value)
    }
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }
    pub fn ge(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ge, value)
    }

    pub fn compare(self, op: CompareOp, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            op,
            field: self,
            value: value.into(),
        }
    }

    pub fn contains(self, value: impl Into<Value>) -> Predicate {
        self.method("Contains", value)
    }
    pub fn starts_with(self, value: impl Into<Value>) -> Predicate {
        self.method("StartsWith", value)
    }
    pub fn ends_with(self, value: impl Into<Value>) -> Predicate {
        self.method("EndsWith", value)
    }

    pub fn method(self, name: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::Method {
            name: name.into(),
            field: self,
            value: value.into(),
        }
    }

    pub fn is_in<V, I>(self, values: I) -> Predicate
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Predicate::In {
            field: self,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_true(self) -> Predicate {
        Predicate::BoolField(self)
    }
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Shorthand for [`Field::named`], the usual entry point of the builder:
/// `field("Id").gt(0).and(field("Published").is_true())`.
pub fn field(name: impl Into<String>) -> Field {
    Field::named(name)
}
