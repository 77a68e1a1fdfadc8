use thiserror::Error;

/// Errors raised while translating predicates or rendering statement text.
///
/// All of these surface synchronously, before any SQL reaches a connection.
/// They indicate a schema or predicate authored outside the supported
/// grammar, not a transient condition, so callers should treat them as
/// programming errors rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The entity schema exposes no usable columns (or none besides the
    /// identity column, for statements that exclude it).
    #[error("entity schema exposes no usable columns")]
    EmptySchema,

    /// A predicate node outside the supported grammar.
    #[error("unsupported predicate node: {0}")]
    UnsupportedNode(&'static str),

    /// A method call whose name the translator does not recognize.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// A bulk statement was requested for zero rows.
    #[error("bulk statement requires at least one row")]
    EmptyBatch,

    /// A field access chain or a logical connective nested deeper than the
    /// single supported level.
    #[error("only one level of nesting is supported: {0}")]
    NestingDepth(String),

    /// Two predicate nodes resolved to the same parameter name.
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),
}
