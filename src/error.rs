use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from listings API: {0}")]
    UnexpectedResponse(String),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Duplicate key: {entity} {id} already exists")]
    DuplicateKey { entity: &'static str, id: i32 },

    #[error("Constraint violation ({kind}) on vacancy {vacancy_id}: {message}")]
    ConstraintViolation {
        vacancy_id: i32,
        kind: ConstraintKind,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Failures that only take down the employer currently being ingested.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::UnexpectedResponse(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    Other,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Other => "other",
        };
        f.write_str(label)
    }
}

impl ConstraintKind {
    pub fn classify(err: &sqlx::Error) -> Option<Self> {
        let db_err = err.as_database_error()?;
        if db_err.is_foreign_key_violation() {
            Some(ConstraintKind::ForeignKey)
        } else if db_err.is_unique_violation() {
            Some(ConstraintKind::Unique)
        } else if db_err.is_check_violation() {
            Some(ConstraintKind::Other)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid identifier: {value}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("field `{field}` has an invalid value: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("record is not a JSON object")]
    Malformed,
}
