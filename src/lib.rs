pub mod ast;
pub mod error;
pub mod params;
pub mod repository;
pub mod schema;
pub mod statement;
pub mod to_sql;
pub mod translate;

pub use error::Error;
