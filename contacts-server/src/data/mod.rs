pub mod contact_repository;
#[cfg(test)]
pub mod memory;
pub mod user_repository;

/// True when `err` is a unique violation on the named constraint.
pub(crate) fn violates_constraint(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .map(|c| c == constraint)
        == Some(true)
}
