//! Category → TMDB discover parameters.

use std::collections::BTreeMap;

use crate::quiz::Category;

/// TMDB movie genres used by the recommendation bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    SciFi,
    Thriller,
}

impl Genre {
    /// TMDB genre identifier.
    pub fn tmdb_id(&self) -> u32 {
        match self {
            Self::Action => 28,
            Self::Adventure => 12,
            Self::Animation => 16,
            Self::Comedy => 35,
            Self::Drama => 18,
            Self::Family => 10751,
            Self::Fantasy => 14,
            Self::History => 36,
            Self::Horror => 27,
            Self::Music => 10402,
            Self::Mystery => 9648,
            Self::Romance => 10749,
            Self::SciFi => 878,
            Self::Thriller => 53,
        }
    }
}

/// TMDB `sort_by` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PopularityDesc,
    VoteAverageDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::VoteAverageDesc => "vote_average.desc",
        }
    }
}

/// Filter bundle for one discover query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverParams {
    pub genres: Vec<Genre>,
    pub sort_by: SortOrder,
    /// Minimum `vote_count` a movie needs to be considered.
    pub min_vote_count: u32,
}

impl DiscoverParams {
    /// Genre ids joined with commas, as TMDB expects for `with_genres`.
    pub fn genre_ids(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.tmdb_id().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query-string pairs, excluding the API key.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("language", "en-US".to_string()),
            ("include_adult", "false".to_string()),
            ("page", "1".to_string()),
            ("with_genres", self.genre_ids()),
            ("sort_by", self.sort_by.as_str().to_string()),
            ("vote_count.gte", self.min_vote_count.to_string()),
        ]
    }
}

/// Everything needed to ask for, and report, recommendations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub category: Category,
    pub params: DiscoverParams,
    /// Raw per-question answers, echoed back to the caller untouched.
    pub answers: BTreeMap<String, String>,
}

/// Build the query for a resolved category.
pub fn params_for(category: Category, answers: BTreeMap<String, String>) -> RecommendationQuery {
    RecommendationQuery {
        category,
        params: bundle(category),
        answers,
    }
}

/// Fixed discover bundle per category.
///
/// The match is exhaustive, so a new category does not compile until it has
/// a bundle.
pub fn bundle(category: Category) -> DiscoverParams {
    use Genre::*;

    match category {
        Category::Fantasy => DiscoverParams {
            genres: vec![Fantasy, Adventure, Animation],
            sort_by: SortOrder::PopularityDesc,
            min_vote_count: 500,
        },
        Category::Motivation => DiscoverParams {
            genres: vec![Drama, History, Music],
            sort_by: SortOrder::VoteAverageDesc,
            min_vote_count: 1000,
        },
        Category::Healing => DiscoverParams {
            genres: vec![Comedy, Romance, Family],
            sort_by: SortOrder::PopularityDesc,
            min_vote_count: 300,
        },
        Category::Dark => DiscoverParams {
            genres: vec![Thriller, Horror, Mystery],
            sort_by: SortOrder::VoteAverageDesc,
            min_vote_count: 800,
        },
    }
}
