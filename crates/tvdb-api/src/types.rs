//! TVDB API records, response envelopes and endpoint parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::datetime::ApiDateTime;

// --- Envelopes ---

/// One-level `{status, data}` wrapper used by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Status string (`"success"` on success).
    #[serde(default)]
    pub status: Option<String>,
    /// Payload.
    pub data: T,
}

/// Envelope of list endpoints, carrying a `links` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    /// Status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Payload.
    pub data: T,
    /// Paging links and counts.
    #[serde(default)]
    pub links: Links,
}

/// `links` block of list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    /// Previous page URL.
    pub prev: Option<String>,
    /// This page URL.
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    /// Next page URL.
    pub next: Option<String>,
    /// Total number of items across pages.
    pub total_items: u64,
    /// Items per page.
    pub page_size: u64,
}

// --- Shared ---

/// Status of a series or movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    /// Status ID.
    pub id: Option<u64>,
    /// Status name (e.g. `"Ended"`).
    pub name: Option<String>,
}

/// Alternative name in a given language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alias {
    /// Language code (ISO 639-2).
    pub language: String,
    /// Alias text.
    pub name: String,
}

// --- Series ---

/// A TV series (`series/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Series {
    /// TVDB series ID.
    pub id: u64,
    /// Name.
    pub name: String,
    /// URL slug.
    pub slug: Option<String>,
    /// Poster image URL.
    pub image: Option<String>,
    /// First air date (`YYYY-MM-DD`).
    pub first_aired: Option<String>,
    /// Last air date (`YYYY-MM-DD`).
    pub last_aired: Option<String>,
    /// Next air date (`YYYY-MM-DD`).
    pub next_aired: Option<String>,
    /// Airing status.
    pub status: Status,
    /// Overview text.
    pub overview: Option<String>,
    /// Network name.
    pub network: Option<String>,
    /// Average runtime in minutes.
    pub runtime: Option<u32>,
    /// Primary language.
    pub language: Option<String>,
    /// Genres.
    pub genre: Vec<String>,
    /// Last modification time.
    pub last_updated: Option<ApiDateTime>,
    /// Average rating.
    pub average_rating: Option<f64>,
    /// Country of origin.
    pub original_country: Option<String>,
    /// Original language.
    pub original_language: Option<String>,
    /// Content rating.
    pub content_rating: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
    /// Zap2it ID.
    pub zap2it_id: Option<String>,
    /// Alternative names.
    pub aliases: Vec<Alias>,
    /// Languages with a translated name.
    pub name_translations: Vec<String>,
    /// Languages with a translated overview.
    pub overview_translations: Vec<String>,
}

/// A season of a series (`series/{id}/seasons`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Season {
    /// TVDB season ID.
    pub id: u64,
    /// Parent series ID.
    pub series_id: u64,
    /// Season number.
    pub number: u32,
    /// Name.
    pub name: Option<String>,
    /// Number of episodes.
    pub episode_count: u32,
    /// Overview text.
    pub overview: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Network ID.
    pub network_id: Option<u64>,
    /// Last modification time.
    pub last_updated: Option<ApiDateTime>,
    /// Languages with a translated name.
    pub name_translations: Vec<String>,
    /// Languages with a translated overview.
    pub overview_translations: Vec<String>,
}

/// A TV episode (`episodes/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Episode {
    /// TVDB episode ID.
    pub id: u64,
    /// Parent series ID.
    pub series_id: u64,
    /// Name.
    pub name: Option<String>,
    /// Season number.
    pub aired_season: u32,
    /// Episode number within the season.
    pub aired_episode_number: u32,
    /// Air time.
    pub aired_date: Option<ApiDateTime>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Overview text.
    pub overview: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
    /// Last modification time.
    pub last_updated: Option<ApiDateTime>,
    /// Languages with a translated name.
    pub name_translations: Vec<String>,
    /// Languages with a translated overview.
    pub overview_translations: Vec<String>,
}

/// `data` of `series/{id}/episodes/{season-type}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesEpisodesData {
    /// The series.
    pub series: Series,
    /// Episodes on this page.
    pub episodes: Vec<Episode>,
}

/// One page of a series' episodes, with the server's counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesEpisodes {
    /// The series.
    pub series: Series,
    /// Episodes on this page.
    pub episodes: Vec<Episode>,
    /// Total number of episodes across pages.
    pub total_items: u64,
    /// Episodes per page.
    pub page_size: u64,
}

impl From<Paged<SeriesEpisodesData>> for SeriesEpisodes {
    fn from(page: Paged<SeriesEpisodesData>) -> Self {
        Self {
            series: page.data.series,
            episodes: page.data.episodes,
            total_items: page.links.total_items,
            page_size: page.links.page_size,
        }
    }
}

// --- Movies ---

/// A movie (`movies/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Movie {
    /// TVDB movie ID.
    pub id: u64,
    /// Name.
    pub name: String,
    /// URL slug.
    pub slug: Option<String>,
    /// Poster image URL.
    pub image: Option<String>,
    /// Release time.
    pub release_date: Option<ApiDateTime>,
    /// Release status.
    pub status: Status,
    /// Overview text.
    pub overview: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Primary language.
    pub language: Option<String>,
    /// Genres.
    pub genre: Vec<String>,
    /// Last modification time.
    pub last_updated: Option<ApiDateTime>,
    /// Average rating.
    pub average_rating: Option<f64>,
    /// Country of origin.
    pub original_country: Option<String>,
    /// Original language.
    pub original_language: Option<String>,
    /// Content rating.
    pub content_rating: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
    /// Alternative names.
    pub aliases: Vec<Alias>,
    /// Languages with a translated name.
    pub name_translations: Vec<String>,
    /// Languages with a translated overview.
    pub overview_translations: Vec<String>,
}

// --- People / artwork ---

/// An actor, director or other person (`people/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
    /// TVDB person ID.
    pub id: u64,
    /// Name.
    pub name: String,
    /// Image URL.
    pub image: Option<String>,
    /// Birth date.
    pub birth_date: Option<ApiDateTime>,
    /// Death date.
    pub death_date: Option<ApiDateTime>,
    /// Gender code.
    pub gender: i32,
    /// Last modification time.
    pub last_updated: Option<ApiDateTime>,
}

/// An artwork item (`artwork/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artwork {
    /// TVDB artwork ID.
    pub id: u64,
    /// Language code.
    pub language: Option<String>,
    /// Artwork type ID.
    #[serde(rename = "type")]
    pub kind: u32,
    /// Score.
    pub score: i64,
    /// Full-size image URL.
    pub url: String,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

// --- Search ---

/// One `search` hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// Object ID (e.g. `"series-81189"`).
    #[serde(rename = "objectID")]
    pub object_id: String,
    /// Record type (`series`, `movie`, `person`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Name.
    pub name: String,
    /// Image URL.
    #[serde(rename = "image_url")]
    pub image: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
}

// --- Parameters ---

/// Episode ordering used by `series/{id}/episodes/{season-type}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonType {
    /// Default (aired) order.
    #[default]
    Default,
    /// Official order.
    Official,
    /// DVD order.
    Dvd,
    /// Absolute order.
    Absolute,
    /// Alternate order.
    Alternate,
    /// Regional order.
    Regional,
}

impl SeasonType {
    /// All season types, in display order.
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Official,
        Self::Dvd,
        Self::Absolute,
        Self::Alternate,
        Self::Regional,
    ];

    /// Path segment for this season type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Official => "official",
            Self::Dvd => "dvd",
            Self::Absolute => "absolute",
            Self::Alternate => "alternate",
            Self::Regional => "regional",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown season type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown season type {0:?} (expected one of: \
     default, official, dvd, absolute, alternate, regional)"
)]
pub struct ParseSeasonTypeError(pub String);

impl FromStr for SeasonType {
    type Err = ParseSeasonTypeError;

    /// Parses case-insensitively; an empty string means [`SeasonType::Default`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Default);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSeasonTypeError(String::from(s)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_series_envelope() {
        // Arrange
        let json = r#"{
            "status": "success",
            "data": {
                "id": 81189,
                "name": "Breaking Bad",
                "slug": "breaking-bad",
                "firstAired": "2008-01-20",
                "status": {"id": 2, "name": "Ended"},
                "lastUpdated": "2023-05-15 14:30:00",
                "averageRating": 9.2,
                "zap2itId": "SH01009396",
                "aliases": [{"language": "spa", "name": "Breaking Bad: Reacciones"}],
                "genre": ["Drama", "Crime"]
            }
        }"#;

        // Act
        let envelope: Envelope<Series> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(envelope.status.as_deref(), Some("success"));
        let series = envelope.data;
        assert_eq!(series.id, 81_189);
        assert_eq!(series.name, "Breaking Bad");
        assert_eq!(series.status.name.as_deref(), Some("Ended"));
        assert_eq!(series.zap2it_id.as_deref(), Some("SH01009396"));
        assert_eq!(series.aliases[0].language, "spa");
        assert_eq!(
            series.last_updated.unwrap().to_string(),
            "2023-05-15 14:30:00"
        );
        assert!(series.next_aired.is_none());
    }

    #[test]
    fn test_malformed_date_fails_episode_decode() {
        // Arrange
        let json = r#"{"id": 1, "airedDate": "2023-05-15"}"#;

        // Act
        let result = serde_json::from_str::<Episode>(json);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_null_date_decodes_as_none() {
        // Arrange
        let json = r#"{"id": 1, "name": "Pilot", "airedDate": null}"#;

        // Act
        let episode: Episode = serde_json::from_str(json).unwrap();

        // Assert
        assert!(episode.aired_date.is_none());
        assert_eq!(episode.name.as_deref(), Some("Pilot"));
    }

    #[test]
    fn test_parse_series_episodes_page() {
        // Arrange
        let json = r#"{
            "status": "success",
            "data": {
                "series": {"id": 81189, "name": "Breaking Bad"},
                "episodes": [
                    {"id": 349232, "seriesId": 81189, "name": "Pilot",
                     "airedSeason": 1, "airedEpisodeNumber": 1,
                     "airedDate": "2008-01-20 00:00:00"}
                ]
            },
            "links": {"prev": null, "self": "https://x/?page=0", "next": null,
                      "total_items": 62, "page_size": 500}
        }"#;

        // Act
        let page: Paged<SeriesEpisodesData> = serde_json::from_str(json).unwrap();
        let episodes = SeriesEpisodes::from(page);

        // Assert
        assert_eq!(episodes.series.id, 81_189);
        assert_eq!(episodes.episodes.len(), 1);
        assert_eq!(episodes.episodes[0].aired_episode_number, 1);
        assert_eq!(episodes.total_items, 62);
        assert_eq!(episodes.page_size, 500);
    }

    #[test]
    fn test_parse_search_results() {
        // Arrange
        let json = r#"{"data": [
            {"objectID": "series-81189", "type": "series", "name": "Breaking Bad",
             "image_url": "https://artworks/1.jpg", "overview": "A chemist turns to crime."}
        ]}"#;

        // Act
        let envelope: Envelope<Vec<SearchResult>> = serde_json::from_str(json).unwrap();

        // Assert
        let hit = &envelope.data[0];
        assert_eq!(hit.object_id, "series-81189");
        assert_eq!(hit.kind, "series");
        assert_eq!(hit.image.as_deref(), Some("https://artworks/1.jpg"));
    }

    #[test]
    fn test_parse_artwork_type_field() {
        // Arrange
        let json =
            r#"{"id": 5, "type": 2, "url": "https://a/5.jpg", "width": 680, "height": 1000}"#;

        // Act
        let artwork: Artwork = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(artwork.kind, 2);
        assert_eq!(artwork.width, 680);
    }

    #[test]
    fn test_season_type_parse() {
        // Arrange & Act & Assert
        assert_eq!("".parse::<SeasonType>().unwrap(), SeasonType::Default);
        assert_eq!("DVD".parse::<SeasonType>().unwrap(), SeasonType::Dvd);
        assert_eq!(" absolute ".parse::<SeasonType>().unwrap(), SeasonType::Absolute);
        assert!("weekly".parse::<SeasonType>().is_err());
        assert_eq!(SeasonType::Regional.to_string(), "regional");
    }
}
