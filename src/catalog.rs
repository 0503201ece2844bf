//! Tile catalog: the shortcut list and the search-engine registry.
//!
//! Browser start pages store tiles with `src`/`href` keys; those are
//! accepted next to the long names.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    #[serde(default, alias = "src")]
    pub icon: String,
    #[serde(alias = "href")]
    pub destination: String,
}

impl Tile {
    pub fn new(name: &str, icon: &str, destination: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            destination: destination.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "src")]
    pub icon: String,
    /// Query prefix; the encoded query is appended verbatim.
    #[serde(alias = "href")]
    pub url: String,
}

impl SearchEngine {
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            return name.to_string();
        }
        let stem = Path::new(&self.icon)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        if !stem.is_empty() {
            return filename_to_label(stem);
        }
        url_host(&self.url).unwrap_or(&self.url).to_string()
    }

    pub fn search_url(&self, query: &str) -> String {
        append_query(&self.url, query)
    }
}

/// Appends a percent-encoded query to a URL template such as
/// `https://duckduckgo.com/?q=`.
pub fn append_query(template: &str, query: &str) -> String {
    format!("{template}{}", utf8_percent_encode(query, NON_ALPHANUMERIC))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default, rename = "searchEngines", alias = "search_engines")]
    pub search_engines: Vec<SearchEngine>,
}

impl Catalog {
    pub fn parse(data: &str, path: &Path) -> Result<Self, CatalogError> {
        serde_json::from_str(data).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data, path)
    }

    /// Seeds `path` with the starter catalog on first run.
    pub fn write_default_if_missing(path: &Path) -> anyhow::Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&Self::default_data())?)?;
        Ok(true)
    }

    pub fn default_data() -> Self {
        let tiles = [
            ("GitHub", "🐙", "https://github.com"),
            ("Rust", "🦀", "https://www.rust-lang.org"),
            ("Docs.rs", "📚", "https://docs.rs"),
            ("Crates.io", "📦", "https://crates.io"),
            ("Wikipedia", "📖", "https://en.wikipedia.org"),
            ("Hacker News", "📰", "https://news.ycombinator.com"),
            ("YouTube", "▶", "https://www.youtube.com"),
            ("Gmail", "✉", "https://mail.google.com"),
            ("Maps", "🗺", "https://www.openstreetmap.org"),
            ("Weather", "☁", "https://wttr.in"),
        ]
        .into_iter()
        .map(|(name, icon, href)| Tile::new(name, icon, href))
        .collect();

        let search_engines = vec![
            SearchEngine {
                name: Some("DuckDuckGo".into()),
                icon: "duckduckgo.png".into(),
                url: "https://duckduckgo.com/?q=".into(),
            },
            SearchEngine {
                name: Some("Google".into()),
                icon: "google.png".into(),
                url: "https://www.google.com/search?q=".into(),
            },
            SearchEngine {
                name: Some("Wikipedia".into()),
                icon: "wikipedia.png".into(),
                url: "https://en.wikipedia.org/w/index.php?search=".into(),
            },
        ];

        Catalog {
            tiles,
            search_engines,
        }
    }
}

/// Single-shot catalog load running on a worker thread.
///
/// Yields exactly one outcome, a catalog or a failure, and is spent once
/// that outcome has been taken.
pub struct PendingCatalog {
    path: PathBuf,
    receiver: Option<Receiver<Result<Catalog, CatalogError>>>,
}

impl PendingCatalog {
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name("catalog-load".into())
            .spawn(move || {
                let _ = sender.send(Catalog::read(&worker_path));
            });
        if let Err(err) = spawned {
            // The sender was dropped with the closure, so `poll` reports
            // the load as interrupted.
            log::error!("Unable to start catalog loader: {err}");
        }
        Self {
            path,
            receiver: Some(receiver),
        }
    }

    /// An already-settled load, used when the outcome is known up front.
    pub fn settled(path: PathBuf, outcome: Result<Catalog, CatalogError>) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let _ = sender.send(outcome);
        Self {
            path,
            receiver: Some(receiver),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking. Returns the outcome the first time it is available and
    /// `None` before and after that.
    pub fn poll(&mut self) -> Option<Result<Catalog, CatalogError>> {
        let outcome = match self.receiver.as_ref()?.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(CatalogError::Interrupted),
        };
        self.receiver = None;
        Some(outcome)
    }
}

pub fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    (!host.is_empty()).then_some(host)
}

fn filename_to_label(name: &str) -> String {
    name.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn parses_src_href_layout() {
        let data = r#"{
            "tiles": [
                { "name": "Google", "src": "google.png", "href": "https://google.com" },
                { "name": "Gmail", "src": "gmail.png", "href": "https://mail.google.com" }
            ],
            "searchEngines": [
                { "src": "duck-duck-go.png", "href": "https://duckduckgo.com/?q=" }
            ]
        }"#;
        let catalog = Catalog::parse(data, Path::new("data.json")).unwrap();
        assert_eq!(catalog.tiles.len(), 2);
        assert_eq!(catalog.tiles[1].destination, "https://mail.google.com");
        assert_eq!(catalog.tiles[0].icon, "google.png");
        assert_eq!(catalog.search_engines[0].label(), "Duck Duck Go");
    }

    #[test]
    fn parses_long_field_names() {
        let data = r#"{
            "tiles": [{ "name": "Docs", "icon": "📚", "destination": "https://docs.rs" }],
            "search_engines": [{ "name": "Kagi", "url": "https://kagi.com/search?q=" }]
        }"#;
        let catalog = Catalog::parse(data, Path::new("data.json")).unwrap();
        assert_eq!(catalog.tiles[0], Tile::new("Docs", "📚", "https://docs.rs"));
        assert_eq!(catalog.search_engines[0].label(), "Kagi");
    }

    #[test]
    fn malformed_catalog_reports_path() {
        let err = Catalog::parse("{ \"tiles\": [", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn engine_label_falls_back_to_host() {
        let engine = SearchEngine {
            name: None,
            icon: String::new(),
            url: "https://www.bing.com/search?q=".into(),
        };
        assert_eq!(engine.label(), "bing.com");
    }

    #[test]
    fn search_url_encodes_query() {
        let engine = &Catalog::default_data().search_engines[0];
        assert_eq!(
            engine.search_url("rust & tui"),
            "https://duckduckgo.com/?q=rust%20%26%20tui"
        );
    }

    #[test]
    fn settled_load_is_consumed_once() {
        let mut pending = PendingCatalog::settled("data.json".into(), Ok(Catalog::default_data()));
        assert!(matches!(pending.poll(), Some(Ok(_))));
        assert!(pending.poll().is_none());
    }

    #[test]
    fn spawned_load_delivers_failure_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pending = PendingCatalog::spawn(dir.path().join("missing.json"));
        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = loop {
            if let Some(outcome) = pending.poll() {
                break outcome;
            }
            assert!(Instant::now() < deadline, "catalog loader never answered");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(matches!(outcome, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn default_catalog_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        assert!(Catalog::write_default_if_missing(&path).unwrap());
        assert!(!Catalog::write_default_if_missing(&path).unwrap());
        assert_eq!(Catalog::read(&path).unwrap(), Catalog::default_data());
    }
}
