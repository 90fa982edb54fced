//! Score accumulation and winner resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::QuizError;

/// Per-category answer counts.
///
/// A well-formed mapping has an entry for every category; [`Scores::zero`] is
/// the only constructor that guarantees that, and the mutating operations
/// refuse to work on anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scores(BTreeMap<Category, u32>);

impl Scores {
    /// Every category present with a count of zero.
    pub fn zero() -> Self {
        Self(Category::PRIORITY.into_iter().map(|c| (c, 0)).collect())
    }

    /// Build from raw entries (as read back from storage).
    pub fn from_counts(counts: impl IntoIterator<Item = (Category, u32)>) -> Self {
        Self(counts.into_iter().collect())
    }

    /// Return a copy with `category` raised by exactly one.
    pub fn increment(&self, category: Category) -> Result<Self, QuizError> {
        let mut next = self.clone();
        let count = next
            .0
            .get_mut(&category)
            .ok_or_else(|| QuizError::UnknownCategory(category.to_string()))?;
        *count += 1;
        Ok(next)
    }

    /// The category with the highest count.
    ///
    /// Ties go to whichever tied category comes first in
    /// [`Category::PRIORITY`]. Fails if any category is missing.
    pub fn resolve_winner(&self) -> Result<Category, QuizError> {
        self.ensure_complete()?;

        let max = self.0.values().copied().max().unwrap_or(0);
        Category::PRIORITY
            .into_iter()
            .find(|c| self.get(*c) == max)
            .ok_or_else(|| QuizError::UnknownCategory("no category holds the maximum".into()))
    }

    /// Fail unless every category has an entry.
    pub fn ensure_complete(&self) -> Result<(), QuizError> {
        match Category::PRIORITY.into_iter().find(|c| !self.0.contains_key(c)) {
            Some(missing) => Err(QuizError::UnknownCategory(format!(
                "scores are missing category '{missing}'"
            ))),
            None => Ok(()),
        }
    }

    pub fn get(&self, category: Category) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Sum of all counts; equals the number of recorded answers.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }

    /// String-keyed view for API payloads.
    pub fn to_map(&self) -> BTreeMap<String, u32> {
        self.iter().map(|(c, n)| (c.to_string(), n)).collect()
    }
}
