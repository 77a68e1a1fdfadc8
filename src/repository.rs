//! The execution boundary and the thin facade over it.
//!
//! The core never opens connections or talks to the network; everything
//! that touches a database goes through [`SqlExecutor`], whose
//! implementations own connections, transactions and any retry policy.
//! [`DataContext`] composes statement generation, entity value binding and
//! parameter extraction on top of one executor.

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Field, Predicate, Value},
    error::Error as TranslateError,
    params::{self, Parameters},
    schema::Entity,
    statement::{self, BulkUpdateKey},
};

/// One result row, column name → value.
pub type Row = Vec<(String, Value)>;

/// The binding primitive the core consumes: runs statement text against a
/// live connection with a named-parameter map. Parameters not referenced
/// by the text must be ignored by the implementation (single-row
/// statements bind the whole entity and reference a subset).
pub trait SqlExecutor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a statement, returning the affected-row count.
    fn execute(&mut self, sql: &str, params: &Parameters) -> Result<u64, Self::Error>;

    /// Runs a statement expected to produce a single scalar.
    fn query_scalar(&mut self, sql: &str, params: &Parameters) -> Result<Value, Self::Error>;

    /// Runs a query, returning the result rows.
    fn query_rows(&mut self, sql: &str, params: &Parameters) -> Result<Vec<Row>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum RepoError<E> {
    /// The statement or predicate could not be rendered; a programming
    /// error, not a transient condition.
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// The execution layer failed; database-side failures surface here
    /// untouched.
    #[error("statement execution failed: {0}")]
    Execute(E),

    /// The insert's OUTPUT clause did not come back as an integer.
    #[error("insert did not return an integer identity")]
    IdentityScalar,
}

/// Facade pairing an entity type's statements with an executor.
pub struct DataContext<E> {
    executor: E,
}

impl<E: SqlExecutor> DataContext<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Inserts one entity and assigns the database-generated identity back
    /// onto it.
    pub fn insert<T: Entity>(&mut self, item: &mut T) -> Result<(), RepoError<E::Error>> {
        let sql = statement::insert(T::TABLE, T::schema())?;
        let params = entity_params(item)?;
        debug!(table = T::TABLE, sql = %sql, "insert");
        let id = self
            .executor
            .query_scalar(&sql, &params)
            .map_err(RepoError::Execute)?;
        match id {
            Value::Int(id) => {
                item.set_id(id);
                Ok(())
            }
            _ => Err(RepoError::IdentityScalar),
        }
    }

    /// Inserts a batch as row-suffixed single-row statements. Identities
    /// are not read back; the bulk form has no OUTPUT clause.
    pub fn insert_bulk<T: Entity>(&mut self, items: &[T]) -> Result<u64, RepoError<E::Error>> {
        let sql = statement::insert_bulk(T::TABLE, T::schema(), items.len())?;
        let params = batch_params(items)?;
        debug!(table = T::TABLE, rows = items.len(), "insert bulk");
        self.executor
            .execute(&sql, &params)
            .map_err(RepoError::Execute)
    }

    pub fn update<T: Entity>(&mut self, item: &T) -> Result<u64, RepoError<E::Error>> {
        let sql = statement::update(T::TABLE, T::schema())?;
        let params = entity_params(item)?;
        debug!(table = T::TABLE, sql = %sql, "update");
        self.executor
            .execute(&sql, &params)
            .map_err(RepoError::Execute)
    }

    /// Updates a batch. With [`BulkUpdateKey::Shared`] every row's WHERE
    /// clause binds the single `@Id` parameter, which is bound to the
    /// first row's identity; callers almost always want
    /// [`BulkUpdateKey::PerRow`].
    pub fn update_bulk<T: Entity>(
        &mut self,
        items: &[T],
        key: BulkUpdateKey,
    ) -> Result<u64, RepoError<E::Error>> {
        let sql = statement::update_bulk(T::TABLE, T::schema(), items.len(), key)?;
        let mut params = batch_params(items)?;
        if key == BulkUpdateKey::Shared {
            // items is non-empty here; a zero-row batch fails above.
            params.insert(T::schema().identity(), items[0].id())?;
        }
        debug!(table = T::TABLE, rows = items.len(), "update bulk");
        self.executor
            .execute(&sql, &params)
            .map_err(RepoError::Execute)
    }

    pub fn delete<T: Entity>(&mut self, item: &T) -> Result<u64, RepoError<E::Error>> {
        let sql = statement::delete(T::TABLE, T::schema());
        let mut params = Parameters::new();
        params.insert(T::schema().identity(), item.id())?;
        debug!(table = T::TABLE, sql = %sql, "delete");
        self.executor
            .execute(&sql, &params)
            .map_err(RepoError::Execute)
    }

    /// Deletes a batch through a single statement binding one array-valued
    /// `Ids` parameter.
    pub fn delete_bulk<T: Entity>(&mut self, items: &[T]) -> Result<u64, RepoError<E::Error>> {
        if items.is_empty() {
            return Err(TranslateError::EmptyBatch.into());
        }
        let sql = statement::delete_bulk(T::TABLE, T::schema());
        let ids: Vec<Value> = items.iter().map(|i| Value::Int(i.id())).collect();
        let mut params = Parameters::new();
        params.insert(statement::bulk_key_param(T::schema()), ids)?;
        debug!(table = T::TABLE, rows = items.len(), "delete bulk");
        self.executor
            .execute(&sql, &params)
            .map_err(RepoError::Execute)
    }

    /// Looks an entity up by identity.
    pub fn find<T: Entity>(&mut self, id: i64) -> Result<Option<T>, RepoError<E::Error>> {
        let predicate = Field::named(T::schema().identity()).eq(id);
        self.find_by(&predicate)
    }

    /// First entity matching the predicate, if any.
    pub fn find_by<T: Entity>(
        &mut self,
        predicate: &Predicate,
    ) -> Result<Option<T>, RepoError<E::Error>> {
        let sql = statement::select_first(T::TABLE, T::schema(), Some(predicate))?;
        let params = params::extract(predicate)?;
        debug!(table = T::TABLE, sql = %sql, "find");
        let rows = self
            .executor
            .query_rows(&sql, &params)
            .map_err(RepoError::Execute)?;
        Ok(rows.first().and_then(T::from_row))
    }

    /// All entities matching the predicate (or the whole table).
    pub fn find_all<T: Entity>(
        &mut self,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<T>, RepoError<E::Error>> {
        let sql = statement::select(T::TABLE, T::schema(), predicate)?;
        let params = match predicate {
            Some(predicate) => params::extract(predicate)?,
            None => Parameters::new(),
        };
        debug!(table = T::TABLE, sql = %sql, "find all");
        let rows = self
            .executor
            .query_rows(&sql, &params)
            .map_err(RepoError::Execute)?;
        Ok(rows.iter().filter_map(T::from_row).collect())
    }
}

fn entity_params<T: Entity>(item: &T) -> Result<Parameters, TranslateError> {
    let mut params = Parameters::new();
    for (name, value) in item.values() {
        params.insert(name, value)?;
    }
    Ok(params)
}

/// Every column of every row, suffixed with the row's 1-based index, so
/// names are unique across the batch.
fn batch_params<T: Entity>(items: &[T]) -> Result<Parameters, TranslateError> {
    let mut params = Parameters::new();
    for (i, item) in items.iter().enumerate() {
        for (name, value) in item.values() {
            params.insert(format!("{name}{}", i + 1), value)?;
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::field, schema::EntitySchema};
    use std::convert::Infallible;

    #[derive(Debug, Default, PartialEq)]
    struct Product {
        id: i64,
        name: String,
        price: f64,
    }

    impl Entity for Product {
        const TABLE: &'static str = "Product";

        fn schema() -> &'static EntitySchema {
            static SCHEMA: EntitySchema = EntitySchema::new(&["Name", "Price", "Id"]);
            &SCHEMA
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("Name", Value::Text(self.name.clone())),
                ("Price", Value::Decimal(self.price)),
                ("Id", Value::Int(self.id)),
            ]
        }

        fn from_row(row: &Row) -> Option<Self> {
            let get = |name: &str| row.iter().find(|(n, _)| n == name).map(|(_, v)| v);
            Some(Self {
                id: match get("Id")? {
                    Value::Int(v) => *v,
                    _ => return None,
                },
                name: match get("Name")? {
                    Value::Text(v) => v.clone(),
                    _ => return None,
                },
                price: match get("Price")? {
                    Value::Decimal(v) => *v,
                    _ => return None,
                },
            })
        }
    }

    /// Records every call; answers scalars/rows from canned responses.
    #[derive(Default)]
    struct FakeExecutor {
        calls: Vec<(String, Parameters)>,
        scalar: Option<Value>,
        rows: Vec<Row>,
    }

    impl SqlExecutor for FakeExecutor {
        type Error = Infallible;

        fn execute(&mut self, sql: &str, params: &Parameters) -> Result<u64, Infallible> {
            self.calls.push((sql.to_string(), params.clone()));
            Ok(1)
        }

        fn query_scalar(&mut self, sql: &str, params: &Parameters) -> Result<Value, Infallible> {
            self.calls.push((sql.to_string(), params.clone()));
            Ok(self.scalar.clone().unwrap_or(Value::Null))
        }

        fn query_rows(&mut self, sql: &str, params: &Parameters) -> Result<Vec<Row>, Infallible> {
            self.calls.push((sql.to_string(), params.clone()));
            Ok(self.rows.clone())
        }
    }

    fn product(name: &str, price: f64, id: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
        }
    }

    #[test]
    fn insert_assigns_identity_from_scalar() {
        let mut ctx = DataContext::new(FakeExecutor {
            scalar: Some(Value::Int(42)),
            ..Default::default()
        });
        let mut item = product("widget", 9.5, 0);
        ctx.insert(&mut item).unwrap();
        assert_eq!(item.id, 42);

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert!(sql.contains("OUTPUT INSERTED.Id"));
        assert_eq!(params.get("Name"), Some(&Value::Text("widget".into())));
    }

    #[test]
    fn insert_rejects_non_integer_identity() {
        let mut ctx = DataContext::new(FakeExecutor {
            scalar: Some(Value::Text("nope".into())),
            ..Default::default()
        });
        let mut item = product("widget", 9.5, 0);
        assert!(matches!(
            ctx.insert(&mut item),
            Err(RepoError::IdentityScalar)
        ));
    }

    #[test]
    fn insert_bulk_binds_row_suffixed_names() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        let items = [product("a", 1.0, 0), product("b", 2.0, 0)];
        ctx.insert_bulk(&items).unwrap();

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert_eq!(sql.matches("INSERT INTO").count(), 2);
        assert_eq!(params.get("Name1"), Some(&Value::Text("a".into())));
        assert_eq!(params.get("Name2"), Some(&Value::Text("b".into())));
    }

    #[test]
    fn update_bulk_shared_key_binds_first_identity() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        let items = [product("a", 1.0, 7), product("b", 2.0, 8)];
        ctx.update_bulk(&items, BulkUpdateKey::Shared).unwrap();

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert!(sql.contains("WHERE [Product].[Id] = @Id\r\n"));
        assert_eq!(params.get("Id"), Some(&Value::Int(7)));
        assert_eq!(params.get("Id2"), Some(&Value::Int(8)));
    }

    #[test]
    fn delete_binds_the_identity() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        ctx.delete(&product("a", 1.0, 5)).unwrap();

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert_eq!(sql, "DELETE FROM [Product] WHERE [Product].[Id] = @Id");
        assert_eq!(params.get("Id"), Some(&Value::Int(5)));
    }

    #[test]
    fn delete_bulk_binds_one_ids_list() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        let items = [product("a", 1.0, 1), product("b", 2.0, 2)];
        ctx.delete_bulk(&items).unwrap();

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert_eq!(sql, "DELETE FROM [Product] WHERE [Product].[Id] IN(@Ids)");
        assert_eq!(
            params.get("Ids"),
            Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn delete_bulk_of_nothing_is_an_empty_batch() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        assert!(matches!(
            ctx.delete_bulk::<Product>(&[]),
            Err(RepoError::Translate(TranslateError::EmptyBatch))
        ));
    }

    #[test]
    fn find_selects_top_one_by_identity() {
        let row: Row = vec![
            ("Name".to_string(), Value::Text("widget".into())),
            ("Price".to_string(), Value::Decimal(9.5)),
            ("Id".to_string(), Value::Int(3)),
        ];
        let mut ctx = DataContext::new(FakeExecutor {
            rows: vec![row],
            ..Default::default()
        });
        let found: Product = ctx.find(3).unwrap().unwrap();
        assert_eq!(found, product("widget", 9.5, 3));

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert!(sql.starts_with("SELECT TOP(1)"));
        assert!(sql.ends_with("WHERE Id = @Id"));
        assert_eq!(params.get("Id"), Some(&Value::Int(3)));
    }

    #[test]
    fn find_all_without_predicate_scans_the_table() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        let found: Vec<Product> = ctx.find_all(None).unwrap();
        assert!(found.is_empty());

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn find_by_extracts_predicate_parameters() {
        let mut ctx = DataContext::new(FakeExecutor::default());
        let predicate = field("Price").gt(1.5);
        let _: Option<Product> = ctx.find_by(&predicate).unwrap();

        let exec = ctx.into_inner();
        let (sql, params) = &exec.calls[0];
        assert!(sql.ends_with("WHERE Price > @Price"));
        assert_eq!(params.get("Price"), Some(&Value::Decimal(1.5)));
    }
}
