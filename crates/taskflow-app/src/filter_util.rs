use taskflow_core::{DueFilter, ListId, ParseDueFilterError, ParsePriorityError, Priority, TaskFilter};
use thiserror::Error;

/// Error returned while constructing task filters from user-facing inputs.
#[derive(Debug, Error)]
pub enum FilterParseError {
    /// The priority token is not one of the known levels.
    #[error(transparent)]
    InvalidPriority(#[from] ParsePriorityError),
    /// The due token is not one of the known date constraints.
    #[error(transparent)]
    InvalidDue(#[from] ParseDueFilterError),
    /// The list token is not a numeric id.
    #[error("invalid list id {token:?}: {source}")]
    InvalidList {
        /// Offending token with surrounding whitespace trimmed.
        token: String,
        /// Integer parse failure.
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Result alias for filter construction helpers.
pub type FilterParseResult<T> = Result<T, FilterParseError>;

/// Builder that accepts user-facing strings and normalizes them into [`TaskFilter`] values.
///
/// Empty or whitespace-only inputs impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    filter: TaskFilter,
}

impl TaskFilterBuilder {
    /// Create an empty builder that hides completed tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the optional search text.
    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.filter.text = text.and_then(|raw| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
        self
    }

    /// Keep or drop completed tasks.
    #[must_use]
    pub const fn with_show_completed(mut self, show: bool) -> Self {
        self.filter.show_completed = show;
        self
    }

    /// Restrict to one priority (`high`, `medium`, `low`, or `none`).
    ///
    /// # Errors
    /// Returns an error if the token is not a known priority.
    pub fn with_priority(mut self, token: Option<&str>) -> FilterParseResult<Self> {
        self.filter.priority = non_blank(token).map(str::parse::<Priority>).transpose()?;
        Ok(self)
    }

    /// Restrict to one list id.
    ///
    /// # Errors
    /// Returns an error if the token is not a numeric id.
    pub fn with_list(mut self, token: Option<&str>) -> FilterParseResult<Self> {
        self.filter.list = non_blank(token)
            .map(|raw| {
                raw.parse::<ListId>().map_err(|source| FilterParseError::InvalidList {
                    token: raw.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(self)
    }

    /// Restrict by due date (`overdue`, `today`, `tomorrow`, `week`).
    ///
    /// # Errors
    /// Returns an error if the token is not a known due filter.
    pub fn with_due(mut self, token: Option<&str>) -> FilterParseResult<Self> {
        self.filter.due = non_blank(token).map(str::parse::<DueFilter>).transpose()?;
        Ok(self)
    }

    /// Build the final [`TaskFilter`].
    #[must_use]
    pub fn build(self) -> TaskFilter {
        self.filter
    }
}

fn non_blank(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|raw| !raw.is_empty())
}
