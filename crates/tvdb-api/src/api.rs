//! `TvdbApi` trait definition.
#![allow(clippy::future_not_send)]

use crate::error::Result;
use crate::types::{
    Artwork, Episode, Movie, Person, SearchResult, Season, SeasonType, Series, SeriesEpisodes,
};

/// TVDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvdbApi: Send)]
pub trait LocalTvdbApi {
    /// Searches series, movies and people by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Fetches a series by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn series(&self, id: u64) -> Result<Series>;

    /// Fetches one page of a series' episodes in the given ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn series_episodes(
        &self,
        series_id: u64,
        season_type: SeasonType,
        page: u32,
    ) -> Result<SeriesEpisodes>;

    /// Fetches an episode by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn episode(&self, id: u64) -> Result<Episode>;

    /// Fetches the seasons of a series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn series_seasons(&self, series_id: u64) -> Result<Vec<Season>>;

    /// Fetches a movie by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn movie(&self, id: u64) -> Result<Movie>;

    /// Fetches a person by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn person(&self, id: u64) -> Result<Person>;

    /// Fetches an artwork item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn artwork(&self, id: u64) -> Result<Artwork>;
}
