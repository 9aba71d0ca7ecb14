use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// What went wrong with a single input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    InvalidDate,
    InvalidAmount,
    InvalidEnum,
    TooLong,
    OutOfRange,
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

/// All field failures of one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, kind, message);
        errors
    }

    pub fn push(&mut self, field: &str, kind: FieldErrorKind, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First error reported against `field`.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was collected.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> std::result::Result<T, Self> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Failures reported by the repository collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key (month per user, budget per category) already exists.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The store refused the request for now (rate limit, busy or locked database).
    #[error("Too many requests, try again later: {0}")]
    RateLimited(String),

    #[error("Store failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Month,
    Transaction,
    Budget,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Month => "Month",
            Self::Transaction => "Transaction",
            Self::Budget => "Budget",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("At least one category needs a positive budget")]
    EmptyBudgetSet,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for LedgerError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl LedgerError {
    /// Stable code the presentation layer can localize on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::EmptyBudgetSet => "empty_budget_set",
            Self::Store(StoreError::RateLimited(_)) => "rate_limited",
            Self::Store(_) => "store",
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// `{ "data": .. }` on success, `{ "error": .., "kind": .., "fields": [..] }` otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ActionResult<T> {
    Data {
        data: T,
    },
    Error {
        error: String,
        kind: &'static str,
        #[serde(skip_serializing_if = "FieldErrors::is_empty")]
        fields: FieldErrors,
    },
}

impl<T> ActionResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

impl<T> From<Result<T>> for ActionResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Data { data },
            Err(e) => Self::Error {
                error: e.to_string(),
                kind: e.kind(),
                fields: e.field_errors().cloned().unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
