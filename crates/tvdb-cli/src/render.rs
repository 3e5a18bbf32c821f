//! Plain-text rendering of API records.
//!
//! Each function returns the lines to show; the caller decides whether they
//! go to the log (one-shot subcommands) or to the shell's output.

use tvdb_api::datetime::ApiDateTime;
use tvdb_api::types::{
    Artwork, Episode, Movie, Person, SearchResult, Season, Series, SeriesEpisodes,
};

/// Placeholder for absent values.
const NONE: &str = "-";

fn or_none(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NONE)
}

fn datetime_or_none(value: Option<ApiDateTime>) -> String {
    value.map_or_else(|| String::from(NONE), |v| v.to_string())
}

fn date_or_none(value: Option<ApiDateTime>) -> String {
    value.map_or_else(
        || String::from(NONE),
        |v| v.naive().date().format("%Y-%m-%d").to_string(),
    )
}

/// Renders `search` hits.
#[must_use]
pub fn search_lines(results: &[SearchResult]) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.len().saturating_add(1));
    lines.push(format!("Found {} results:", results.len()));
    for result in results {
        lines.push(format!(
            "- {} ({}, {}): {}",
            result.name,
            result.kind,
            result.object_id,
            or_none(result.overview.as_deref()),
        ));
    }
    lines
}

/// Renders a series with its aliases.
#[must_use]
pub fn series_lines(series: &Series) -> Vec<String> {
    let mut lines = vec![
        format!("Series: {} (ID: {})", series.name, series.id),
        format!("First Aired: {}", or_none(series.first_aired.as_deref())),
        format!("Status: {}", or_none(series.status.name.as_deref())),
        format!("Network: {}", or_none(series.network.as_deref())),
        format!("Last Updated: {}", datetime_or_none(series.last_updated)),
        format!("Overview: {}", or_none(series.overview.as_deref())),
        String::from("Aliases:"),
    ];
    for alias in &series.aliases {
        lines.push(format!("  - {} ({})", alias.name, alias.language));
    }
    lines
}

/// Renders one page of episodes.
#[must_use]
pub fn episodes_lines(page: &SeriesEpisodes) -> Vec<String> {
    if page.episodes.is_empty() {
        return vec![String::from("No episodes found for this criteria.")];
    }

    let mut lines = Vec::with_capacity(page.episodes.len().saturating_add(1));
    lines.push(format!(
        "Retrieved {} episodes of {} (total: {}, page size: {}):",
        page.episodes.len(),
        page.series.name,
        page.total_items,
        page.page_size,
    ));
    for episode in &page.episodes {
        lines.push(format!(
            "S{:02}E{:02}: {} (ID: {})",
            episode.aired_season,
            episode.aired_episode_number,
            or_none(episode.name.as_deref()),
            episode.id,
        ));
    }
    lines
}

/// Renders a single episode.
#[must_use]
pub fn episode_lines(episode: &Episode) -> Vec<String> {
    vec![
        format!(
            "Episode: {} (S{:02}E{:02}, ID: {})",
            or_none(episode.name.as_deref()),
            episode.aired_season,
            episode.aired_episode_number,
            episode.id,
        ),
        format!("Aired Date: {}", date_or_none(episode.aired_date)),
        format!("Last Updated: {}", datetime_or_none(episode.last_updated)),
        format!("Overview: {}", or_none(episode.overview.as_deref())),
    ]
}

/// Renders the seasons of a series.
#[must_use]
pub fn seasons_lines(seasons: &[Season]) -> Vec<String> {
    seasons
        .iter()
        .map(|season| {
            format!(
                "Season {}: {} (Episodes: {})",
                season.number,
                or_none(season.name.as_deref()),
                season.episode_count,
            )
        })
        .collect()
}

/// Renders a movie.
#[must_use]
pub fn movie_lines(movie: &Movie) -> Vec<String> {
    vec![
        format!("Movie: {} (ID: {})", movie.name, movie.id),
        format!("Released: {}", date_or_none(movie.release_date)),
        format!(
            "Runtime: {}",
            movie
                .runtime
                .map_or_else(|| String::from(NONE), |r| format!("{r}min"))
        ),
        format!("Overview: {}", or_none(movie.overview.as_deref())),
    ]
}

/// Renders a person.
#[must_use]
pub fn person_lines(person: &Person) -> Vec<String> {
    vec![
        format!("Person: {} (ID: {})", person.name, person.id),
        format!("Born: {}", date_or_none(person.birth_date)),
        format!("Died: {}", date_or_none(person.death_date)),
        format!("Image: {}", or_none(person.image.as_deref())),
    ]
}

/// Renders an artwork item.
#[must_use]
pub fn artwork_lines(artwork: &Artwork) -> Vec<String> {
    vec![
        format!(
            "Artwork {}: type {}, {}x{} ({})",
            artwork.id,
            artwork.kind,
            artwork.width,
            artwork.height,
            or_none(artwork.language.as_deref()),
        ),
        format!("URL: {}", artwork.url),
        format!("Thumbnail: {}", or_none(artwork.thumbnail.as_deref())),
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tvdb_api::types::{Alias, Status};

    use super::*;

    #[test]
    fn test_series_lines_with_aliases() {
        // Arrange
        let series = Series {
            id: 81_189,
            name: String::from("Breaking Bad"),
            first_aired: Some(String::from("2008-01-20")),
            status: Status {
                id: Some(2),
                name: Some(String::from("Ended")),
            },
            last_updated: Some("2023-05-15 14:30:00".parse().unwrap()),
            aliases: vec![Alias {
                language: String::from("spa"),
                name: String::from("Breaking Bad: Reacciones"),
            }],
            ..Series::default()
        };

        // Act
        let lines = series_lines(&series);

        // Assert
        assert_eq!(lines[0], "Series: Breaking Bad (ID: 81189)");
        assert!(lines.contains(&String::from("Last Updated: 2023-05-15 14:30:00")));
        assert!(lines.contains(&String::from("Network: -")));
        assert_eq!(
            lines.last().unwrap(),
            "  - Breaking Bad: Reacciones (spa)"
        );
    }

    #[test]
    fn test_episodes_lines_empty_page() {
        // Arrange
        let page = SeriesEpisodes::default();

        // Act
        let lines = episodes_lines(&page);

        // Assert
        assert_eq!(lines, vec!["No episodes found for this criteria."]);
    }

    #[test]
    fn test_episodes_lines_numbering() {
        // Arrange
        let page = SeriesEpisodes {
            series: Series {
                name: String::from("Breaking Bad"),
                ..Series::default()
            },
            episodes: vec![Episode {
                id: 349_232,
                name: Some(String::from("Pilot")),
                aired_season: 1,
                aired_episode_number: 1,
                ..Episode::default()
            }],
            total_items: 62,
            page_size: 500,
        };

        // Act
        let lines = episodes_lines(&page);

        // Assert
        assert_eq!(
            lines,
            vec![
                "Retrieved 1 episodes of Breaking Bad (total: 62, page size: 500):",
                "S01E01: Pilot (ID: 349232)",
            ]
        );
    }

    #[test]
    fn test_episode_lines_shows_date_only() {
        // Arrange
        let episode = Episode {
            id: 1,
            aired_date: Some("2008-01-20 21:00:00".parse().unwrap()),
            ..Episode::default()
        };

        // Act
        let lines = episode_lines(&episode);

        // Assert
        assert_eq!(lines[1], "Aired Date: 2008-01-20");
        assert_eq!(lines[2], "Last Updated: -");
    }

    #[test]
    fn test_search_lines() {
        // Arrange
        let results = vec![SearchResult {
            object_id: String::from("movie-12"),
            kind: String::from("movie"),
            name: String::from("El Camino"),
            ..SearchResult::default()
        }];

        // Act
        let lines = search_lines(&results);

        // Assert
        assert_eq!(lines, vec!["Found 1 results:", "- El Camino (movie, movie-12): -"]);
    }
}
