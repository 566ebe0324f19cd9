//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod document;
pub mod folder;
pub mod grant;
pub mod label;
pub mod rule;

pub use activity::ActivityRepository;
pub use document::DocumentRepository;
pub use folder::FolderRepository;
pub use grant::GrantRepository;
pub use label::LabelRepository;
pub use rule::RuleRepository;

/// Whether `err` is a violation of the named constraint or unique index.
fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Whether `err` is a foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// Clamp a `u64` into the `BIGINT` range for binding.
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
