//! Fetching and parsing hierarchical JSON datasets.

use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::TreeNode;

const BASE_URL: &str =
    "https://cdn.rawgit.com/freeCodeCamp/testable-projects-fcc/a80ce8f9/src/data/tree_map";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The published treemap datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    #[default]
    VideoGames,
    Movies,
    Kickstarter,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Kickstarter, Dataset::Movies, Dataset::VideoGames];

    pub fn url(self) -> String {
        let file = match self {
            Dataset::VideoGames => "video-game-sales-data.json",
            Dataset::Movies => "movie-data.json",
            Dataset::Kickstarter => "kickstarter-funding-data.json",
        };
        format!("{BASE_URL}/{file}")
    }

    pub fn title(self) -> &'static str {
        match self {
            Dataset::VideoGames => "Video Game Sales",
            Dataset::Movies => "Movie Sales",
            Dataset::Kickstarter => "Kickstarter Pledges",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Dataset::VideoGames => "Top 100 Most Sold Video Games Grouped by Platform",
            Dataset::Movies => "Top 100 Highest Grossing Movies Grouped By Genre",
            Dataset::Kickstarter => "Top 100 Most Pledged Kickstarter Campaigns Grouped By Category",
        }
    }

    /// Short name used for output file names.
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::VideoGames => "video-games",
            Dataset::Movies => "movies",
            Dataset::Kickstarter => "kickstarter",
        }
    }
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Dataset(Dataset),
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Dataset(d) => write!(f, "{}", d.url()),
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a JSON document into a tree.
pub fn parse(json: &str) -> Result<TreeNode, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Fetch or read `source` and parse it.
pub fn load(source: &Source) -> Result<TreeNode, LoadError> {
    let start = std::time::Instant::now();
    let body = match source {
        Source::Dataset(d) => fetch(&d.url())?,
        Source::Url(url) => fetch(url)?,
        Source::File(path) => std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?,
    };

    let root = parse(&body)?;
    tracing::info!(
        "Loaded '{}' from {} ({} nodes, {} bytes) in {:.2}s",
        root.name,
        source,
        root.count(),
        body.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(root)
}

/// Load independent sources in parallel. Results keep the input order.
pub fn load_all(sources: &[Source]) -> Vec<Result<TreeNode, LoadError>> {
    sources.par_iter().map(load).collect()
}

fn fetch(url: &str) -> Result<String, LoadError> {
    tracing::debug!("GET {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "name": "Video Game Sales Data Top 100",
        "children": [
            {"name": "Wii", "children": [
                {"name": "Wii Sports", "category": "Wii", "value": "82.53"}
            ]},
            {"name": "NES", "children": [
                {"name": "Super Mario Bros.", "category": "NES", "value": "40.24"}
            ]}
        ]
    }"#;

    #[test]
    fn parse_reads_the_published_shape() {
        let root = parse(SAMPLE).unwrap();
        assert_eq!(root.name, "Video Game Sales Data Top 100");
        assert_eq!(root.children.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn parse_reports_malformed_json() {
        assert!(matches!(parse("{\"name\": "), Err(LoadError::Json(_))));
    }

    #[test]
    fn load_reads_files_and_reports_missing_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let ok = load(&Source::File(file.path().to_path_buf())).unwrap();
        assert_eq!(ok.count(), 5);

        let missing = load(&Source::File(PathBuf::from("/definitely/not/here.json")));
        assert!(matches!(missing, Err(LoadError::Io { .. })));
    }

    #[test]
    fn load_all_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&a, r#"{"name": "first", "value": 1}"#).unwrap();
        std::fs::write(&b, r#"{"name": "second", "value": 2}"#).unwrap();

        let results = load_all(&[Source::File(a), Source::File(b)]);
        let names: Vec<_> = results.into_iter().map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn datasets_point_at_the_published_files() {
        assert!(Dataset::VideoGames.url().ends_with("/video-game-sales-data.json"));
        assert_eq!(Dataset::default(), Dataset::VideoGames);
        assert_eq!(
            Dataset::VideoGames.description(),
            "Top 100 Most Sold Video Games Grouped by Platform"
        );
    }
}
