use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::{fmt, str::FromStr};

/// Identifier of a task list (positive integer, unique among lists).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub u64);

impl ListId {
    /// Next identifier after the highest one in `existing` (`1` when empty).
    #[must_use]
    pub fn next_after<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self(existing.into_iter().map(|id| id.0).max().unwrap_or(0) + 1)
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ListId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Identifier of a task (positive integer, unique among tasks).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Next identifier after the highest one in `existing` (`1` when empty).
    #[must_use]
    pub fn next_after<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self(existing.into_iter().map(|id| id.0).max().unwrap_or(0) + 1)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}
