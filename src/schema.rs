use crate::{ast::Value, error::Error, repository::Row};

/// Registration-time column descriptor for an entity type: the column
/// names in declaration order plus the identity column, supplied once and
/// shared by every statement built for that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    columns: &'static [&'static str],
    identity: &'static str,
}

impl EntitySchema {
    /// A schema whose identity column follows the `Id` convention.
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            identity: "Id",
        }
    }

    pub const fn with_identity(
        columns: &'static [&'static str],
        identity: &'static str,
    ) -> Self {
        Self { columns, identity }
    }

    pub const fn identity(&self) -> &'static str {
        self.identity
    }

    /// All columns in declaration order, identity included.
    pub fn columns(&self) -> Result<&'static [&'static str], Error> {
        if self.columns.is_empty() {
            return Err(Error::EmptySchema);
        }
        Ok(self.columns)
    }

    /// Declaration order with the identity column filtered out.
    pub fn columns_without_identity(&self) -> Result<Vec<&'static str>, Error> {
        let columns: Vec<_> = self
            .columns
            .iter()
            .copied()
            .filter(|c| *c != self.identity)
            .collect();
        if columns.is_empty() {
            return Err(Error::EmptySchema);
        }
        Ok(columns)
    }
}

/// Implemented once per persisted type. The repository facade derives
/// statement text from [`Entity::schema`] and bind values from
/// [`Entity::values`]; the table name is never inferred from anything else.
pub trait Entity {
    const TABLE: &'static str;

    fn schema() -> &'static EntitySchema;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);

    /// Bind values for every column, in schema order, identity included.
    /// Statements that exclude the identity simply never reference its
    /// placeholder.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Rebuilds the entity from a result row. `None` when the row is
    /// missing a required column or holds an incompatible value.
    fn from_row(row: &Row) -> Option<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    static PRODUCT: EntitySchema =
        EntitySchema::new(&["Name", "Price", "UpdatedDate", "CreatedDate", "Id"]);

    #[test]
    fn columns_keep_declaration_order() {
        assert_eq!(
            PRODUCT.columns().unwrap(),
            &["Name", "Price", "UpdatedDate", "CreatedDate", "Id"]
        );
    }

    #[test]
    fn identity_is_filtered() {
        assert_eq!(
            PRODUCT.columns_without_identity().unwrap(),
            vec!["Name", "Price", "UpdatedDate", "CreatedDate"]
        );
    }

    #[test]
    fn custom_identity_name() {
        static S: EntitySchema = EntitySchema::with_identity(&["Code", "Key"], "Key");
        assert_eq!(S.identity(), "Key");
        assert_eq!(S.columns_without_identity().unwrap(), vec!["Code"]);
    }

    #[test]
    fn empty_schema_is_an_error() {
        static S: EntitySchema = EntitySchema::new(&[]);
        assert_eq!(S.columns(), Err(Error::EmptySchema));
    }

    #[test]
    fn identity_only_schema_has_no_insertable_columns() {
        static S: EntitySchema = EntitySchema::new(&["Id"]);
        assert_eq!(S.columns().unwrap(), &["Id"]);
        assert_eq!(S.columns_without_identity(), Err(Error::EmptySchema));
    }
}
