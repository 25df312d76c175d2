// src/metadata.rs
//! Movie metadata loading and merging.
//!
//! The run plan comes from per-genre CSV files: each file's stem is the genre
//! name and each row plans one movie. The same title commonly appears in
//! several genre files; its metadata is merged into a single record with the
//! genre set unioned and the run length taken from the first non-empty
//! source. An optional master details CSV adds pass-through fields
//! (directors, cast, urls) that the engines never consume.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::InputError;

/// Placeholder for unknown run lengths and release years.
pub const FIELD_UNKNOWN: &str = "N/A";

/// One row of a per-genre CSV. The files carry more columns (ratings,
/// review URLs); only these three matter here.
#[derive(Debug, Clone, Deserialize)]
struct GenreRow {
    name: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    run_length: String,
}

/// One row of the master details CSV.
#[derive(Debug, Clone, Deserialize)]
struct DetailsRow {
    title: String,
    #[serde(default)]
    directors: String,
    #[serde(default)]
    cast: String,
    #[serde(default)]
    image_urls: String,
    #[serde(default)]
    trailer_url: String,
    #[serde(default)]
    where_to_watch_urls: String,
}

/// A movie planned for processing, as listed in a genre file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMovie {
    pub title: String,
    pub year: Option<i32>,
}

/// A genre CSV and the movies it lists, in file order.
#[derive(Debug, Clone)]
pub struct GenreFile {
    /// Genre name: the file stem.
    pub name: String,
    /// File name with extension; used as the checkpoint key.
    pub file_name: String,
    pub rows: Vec<PlannedMovie>,
}

/// Merged metadata for one title.
#[derive(Debug, Clone)]
pub struct MovieMeta {
    pub genres: BTreeSet<String>,
    pub run_length: String,
    pub year: Option<i32>,
    pub directors: String,
    pub cast: String,
    pub image_urls: Vec<String>,
    pub trailer_url: String,
    pub watch_urls: Vec<String>,
}

impl Default for MovieMeta {
    fn default() -> Self {
        Self {
            genres: BTreeSet::new(),
            run_length: FIELD_UNKNOWN.to_string(),
            year: None,
            directors: String::new(),
            cast: String::new(),
            image_urls: Vec::new(),
            trailer_url: String::new(),
            watch_urls: Vec::new(),
        }
    }
}

impl MovieMeta {
    /// Sorted, `"; "`-joined genre label for the output row.
    pub fn genre_label(&self) -> String {
        self.genres
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Release year for the output row, `"N/A"` when unknown.
    pub fn release_year_label(&self) -> String {
        match self.year {
            Some(year) => year.to_string(),
            None => FIELD_UNKNOWN.to_string(),
        }
    }
}

/// All planned movies plus their merged metadata.
#[derive(Debug, Clone)]
pub struct MovieCatalog {
    /// Genre files in sorted file-name order; rows in file order.
    pub plan: Vec<GenreFile>,
    meta: HashMap<String, MovieMeta>,
}

impl MovieCatalog {
    /// Load genre files (required) and the details file (optional).
    pub fn load(genre_dir: &Path, details_file: Option<&Path>) -> Result<Self, InputError> {
        let mut files = list_genre_files(genre_dir)?;
        if files.is_empty() {
            return Err(InputError::EmptyPlan {
                dir: genre_dir.to_path_buf(),
            });
        }
        files.sort();

        let mut plan = Vec::new();
        let mut meta: HashMap<String, MovieMeta> = HashMap::new();
        for path in &files {
            let genre_file = load_genre_file(path, &mut meta)?;
            debug!(
                genre = genre_file.name,
                movies = genre_file.rows.len(),
                "genre file loaded"
            );
            plan.push(genre_file);
        }

        if let Some(details) = details_file {
            match merge_details(&mut meta, details) {
                Ok(rows) => info!(rows, path = %details.display(), "movie details merged"),
                Err(e) => warn!(error = %e, "movie details skipped"),
            }
        }

        info!(
            genre_files = plan.len(),
            movies = meta.len(),
            "movie catalog loaded"
        );
        Ok(Self { plan, meta })
    }

    pub fn meta(&self, title: &str) -> Option<&MovieMeta> {
        self.meta.get(title)
    }

    /// Count of planned rows across all genre files (duplicates included).
    pub fn planned_rows(&self) -> usize {
        self.plan.iter().map(|f| f.rows.len()).sum()
    }

    /// Count of distinct titles.
    pub fn movie_count(&self) -> usize {
        self.meta.len()
    }
}

fn list_genre_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    Ok(files)
}

fn load_genre_file(
    path: &Path,
    meta: &mut HashMap<String, MovieMeta>,
) -> Result<GenreFile, InputError> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| InputError::from_csv(path, e))?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<GenreRow>() {
        let record = record.map_err(|e| InputError::from_csv(path, e))?;
        let title = record.name.trim().to_string();
        if title.is_empty() {
            continue;
        }
        let year = record.year.trim().parse::<i32>().ok();

        let entry = meta.entry(title.clone()).or_default();
        entry.genres.insert(name.clone());
        if entry.run_length == FIELD_UNKNOWN && !record.run_length.trim().is_empty() {
            entry.run_length = record.run_length.trim().to_string();
        }
        if entry.year.is_none() {
            entry.year = year;
        }

        rows.push(PlannedMovie { title, year });
    }

    Ok(GenreFile {
        name,
        file_name,
        rows,
    })
}

fn merge_details(
    meta: &mut HashMap<String, MovieMeta>,
    path: &Path,
) -> Result<usize, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| InputError::from_csv(path, e))?;

    let mut rows = 0usize;
    for record in reader.deserialize::<DetailsRow>() {
        let record = record.map_err(|e| InputError::from_csv(path, e))?;
        let title = record.title.trim().to_string();
        if title.is_empty() {
            continue;
        }
        let entry = meta.entry(title).or_default();
        entry.directors = record.directors;
        entry.cast = record.cast;
        entry.image_urls = split_list(&record.image_urls, "; ");
        entry.trailer_url = record.trailer_url;
        entry.watch_urls = split_list(&record.where_to_watch_urls, ", ");
        rows += 1;
    }
    Ok(rows)
}

fn split_list(s: &str, sep: &str) -> Vec<String> {
    s.split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
