//! Recommendation payloads: raw TMDB results and the items we return.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix for poster images on the TMDB CDN.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Maximum number of items returned per request.
pub const MAX_ITEMS: usize = 12;

/// A movie as returned by TMDB `/discover/movie`. Only the fields we use.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Envelope of a TMDB discover response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// One recommended movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub title: String,
    pub year: Option<String>,
    pub rating: Option<f64>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
}

impl From<TmdbMovie> for RecommendationItem {
    fn from(movie: TmdbMovie) -> Self {
        let year = movie
            .release_date
            .as_deref()
            .map(|d| d.chars().take(4).collect::<String>())
            .filter(|y| !y.is_empty());
        let poster_url = movie
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{POSTER_BASE_URL}{p}"));

        Self {
            title: movie.title.or(movie.original_title).unwrap_or_default(),
            year,
            rating: movie.vote_average,
            overview: movie.overview,
            poster_url,
        }
    }
}

/// Response of the recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub category: String,
    pub category_label: String,
    pub scores: BTreeMap<String, u32>,
    pub answers: BTreeMap<String, String>,
    pub items: Vec<RecommendationItem>,
}

/// Convert raw results into at most [`MAX_ITEMS`] items, preserving order.
pub fn to_items(movies: Vec<TmdbMovie>) -> Vec<RecommendationItem> {
    movies
        .into_iter()
        .take(MAX_ITEMS)
        .map(RecommendationItem::from)
        .collect()
}
