//! MovieDNA — a chat quiz that maps your answers to a movie category and
//! recommends films from TMDB.

pub mod api;
pub mod config;
pub mod error;
pub mod quiz;
pub mod recommend;
pub mod service;
pub mod store;
