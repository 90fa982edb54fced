//! Movie recommendations for a resolved movie DNA category.
//!
//! The mapper turns a category into a fixed TMDB discover bundle; the catalog
//! trait runs the query; model types shape the results for the API.

pub mod mapper;
pub mod model;
pub mod tmdb;

pub use mapper::{DiscoverParams, Genre, RecommendationQuery, SortOrder, bundle, params_for};
pub use model::{RecommendationItem, RecommendationResponse, TmdbMovie};
pub use tmdb::{MovieCatalog, TmdbClient, TmdbConfig};
