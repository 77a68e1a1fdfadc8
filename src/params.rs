use crate::{
    ast::{Predicate, Value},
    error::Error,
    translate::column_name,
};

/// An ordered name→value binding map.
///
/// Order is insertion order, so a map extracted alongside a statement lists
/// its bindings in the order the placeholders appear in the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, Value)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, rejecting a name that is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let name = name.into();
        if self.0.iter().any(|(n, _)| *n == name) {
            return Err(Error::DuplicateParameter(name));
        }
        self.0.push((name, value.into()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a str, &'a Value);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, Value)>,
        fn(&'a (String, Value)) -> (&'a str, &'a Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let project: fn(&'a (String, Value)) -> (&'a str, &'a Value) = |(n, v)| (n.as_str(), v);
        self.0.iter().map(project)
    }
}

/// Walks a predicate and produces the bind map its translated text expects.
///
/// This is a second, independent walk over the same tree as the WHERE
/// translator; the two agree on naming (field path concatenation) and on
/// the single supported level of `AND`/`OR` nesting, which is what keeps
/// the names collision-free.
pub fn extract(predicate: &Predicate) -> Result<Parameters, Error> {
    let mut params = Parameters::new();
    fill(predicate, true, &mut params)?;
    Ok(params)
}

fn fill(predicate: &Predicate, root: bool, params: &mut Parameters) -> Result<(), Error> {
    match predicate {
        Predicate::And(l, r) | Predicate::Or(l, r) => {
            if !root {
                let name = if matches!(predicate, Predicate::And(..)) {
                    "AND"
                } else {
                    "OR"
                };
                return Err(Error::NestingDepth(name.to_string()));
            }
            fill(l, false, params)?;
            fill(r, false, params)
        }

        Predicate::Compare { field, value, .. } => {
            // NULL comparisons render the literal NULL; there is no
            // placeholder to bind.
            if *value == Value::Null {
                return Ok(());
            }
            params.insert(column_name(field)?, value.clone())
        }

        // Renders as `(Name = 1)`, nothing to bind.
        Predicate::BoolField(_) => Ok(()),

        Predicate::Method { name, field, value } => match name.as_str() {
            "Contains" | "StartsWith" | "EndsWith" => {
                params.insert(column_name(field)?, value.clone())
            }
            other => Err(Error::UnsupportedMethod(other.to_string())),
        },

        // Elements are inlined in the text, but the collection is still
        // surfaced under the field's name for binders that support
        // array-valued parameters.
        Predicate::In { field, values } => {
            if values.is_empty() {
                return Ok(());
            }
            params.insert(column_name(field)?, Value::List(values.clone()))
        }

        Predicate::Not(_) => Err(Error::UnsupportedNode("Not")),
    }
}
