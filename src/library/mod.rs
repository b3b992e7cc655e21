//! Book list and manifest loading.
//!
//! The library is a JSON array of [`Book`] entries. Each book points at a
//! manifest holding its title and ordered page references. Relative paths in
//! the library resolve against the library file's directory; relative page
//! references resolve against the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

/// Shown in place of the listing when the library cannot be loaded.
pub const LIBRARY_UNAVAILABLE: &str = "Books are unavailable right now.";
/// Viewer title when no book id was given.
pub const BOOK_NOT_FOUND: &str = "Book not found";
/// Viewer title when the book or its manifest cannot be loaded.
pub const BOOK_UNAVAILABLE: &str = "Book unavailable";
/// Title used when a manifest has none.
pub const UNTITLED: &str = "Untitled";

/// One entry of the library list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Book {
    pub id: String,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(alias = "manifestPath", alias = "manifest_path")]
    pub manifest: String,
    #[serde(default, alias = "coverUrl", alias = "cover_url")]
    pub cover: String,
}

fn untitled() -> String {
    UNTITLED.to_string()
}

/// Title and pages of one book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub title: String,
    pub pages: Vec<String>,
    /// Directory page references resolve against.
    pub base_dir: PathBuf,
}

impl Manifest {
    /// Decode a manifest document.
    ///
    /// A missing or empty title becomes [`UNTITLED`]. A `pages` value that
    /// is not an array yields no pages, and non-string entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for invalid JSON and
    /// [`LoadError::MalformedManifest`] when the document is not an object.
    pub fn from_json(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text).map_err(|err| LoadError::Parse {
            what: "manifest",
            message: err.to_string(),
        })?;
        let Value::Object(map) = value else {
            return Err(LoadError::MalformedManifest);
        };
        let title = map
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
            .to_string();
        let pages = match map.get("pages") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            title,
            pages,
            base_dir: base_dir.into(),
        })
    }

    /// Resolve a page reference to a filesystem path.
    pub fn page_path(&self, page: &str) -> PathBuf {
        resolve_path(&self.base_dir, page)
    }
}

/// Coarse failure classes shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkOrParseFailure,
    BookNotFound,
    EmptyOrMalformedManifest,
}

/// Failures loading the library or a manifest. All are terminal for the
/// view that triggered them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
    #[error("invalid {what} data: {message}")]
    Parse { what: &'static str, message: String },
    #[error("library data is not a list of books")]
    InvalidLibrary,
    #[error("no book requested")]
    MissingBookId,
    #[error("book not found: {0}")]
    BookNotFound(String),
    #[error("manifest is not an object")]
    MalformedManifest,
}

impl LoadError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreadable { .. } | Self::Parse { .. } | Self::InvalidLibrary => {
                ErrorKind::NetworkOrParseFailure
            }
            Self::MissingBookId | Self::BookNotFound(_) => ErrorKind::BookNotFound,
            Self::MalformedManifest => ErrorKind::EmptyOrMalformedManifest,
        }
    }

    /// Title the viewer shows for this failure.
    pub const fn viewer_title(&self) -> &'static str {
        match self {
            Self::MissingBookId => BOOK_NOT_FOUND,
            _ => BOOK_UNAVAILABLE,
        }
    }
}

/// The loaded book list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub books: Vec<Book>,
    /// Directory manifest and cover paths resolve against.
    pub base_dir: PathBuf,
}

impl Library {
    /// Decode a library document.
    ///
    /// Entries without a usable id or manifest are skipped with a warning so
    /// the rest of the library still lists. A missing title becomes
    /// [`UNTITLED`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for invalid JSON and
    /// [`LoadError::InvalidLibrary`] when the document is not an array.
    pub fn from_json(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text).map_err(|err| LoadError::Parse {
            what: "library",
            message: err.to_string(),
        })?;
        let Value::Array(entries) = value else {
            return Err(LoadError::InvalidLibrary);
        };
        let books = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Book>(entry) {
                Ok(book) => Some(book),
                Err(err) => {
                    tracing::warn!(index, "skipping library entry: {err}");
                    None
                }
            })
            .collect();
        Ok(Self {
            books,
            base_dir: base_dir.into(),
        })
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn manifest_path(&self, book: &Book) -> PathBuf {
        resolve_path(&self.base_dir, &book.manifest)
    }

    /// Cover path, `None` when the book has no cover.
    pub fn cover_path(&self, book: &Book) -> Option<PathBuf> {
        (!book.cover.trim().is_empty()).then(|| resolve_path(&self.base_dir, &book.cover))
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|err| LoadError::Unreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Resolve `reference` against `base`, leaving absolute paths alone.
pub fn resolve_path(base: &Path, reference: &str) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load the library file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a list of books.
pub fn load_library(path: &Path) -> Result<Library, LoadError> {
    let text = read(path)?;
    let library = Library::from_json(&text, parent_dir(path))?;
    tracing::debug!(path = %path.display(), books = library.books.len(), "library loaded");
    Ok(library)
}

/// Load a manifest file.
///
/// # Errors
///
/// Fails when the file cannot be read, is not JSON, or is not an object.
pub fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    let text = read(path)?;
    let manifest = Manifest::from_json(&text, parent_dir(path))?;
    tracing::debug!(
        path = %path.display(),
        pages = manifest.pages.len(),
        "manifest loaded"
    );
    Ok(manifest)
}

/// A book together with its decoded manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBook {
    pub book: Book,
    pub manifest: Manifest,
    /// Where the manifest was read from, for live reload.
    pub manifest_path: PathBuf,
}

/// Look up `book_id` in the library at `library_path` and load its manifest.
///
/// # Errors
///
/// Fails with [`LoadError::MissingBookId`] for an empty id,
/// [`LoadError::BookNotFound`] when the id is not listed, or any library or
/// manifest load error.
pub fn load_book(library_path: &Path, book_id: &str) -> Result<LoadedBook, LoadError> {
    if book_id.trim().is_empty() {
        return Err(LoadError::MissingBookId);
    }
    let library = load_library(library_path)?;
    let book = library
        .find(book_id)
        .cloned()
        .ok_or_else(|| LoadError::BookNotFound(book_id.to_string()))?;
    let manifest_path = library.manifest_path(&book);
    let manifest = load_manifest(&manifest_path)?;
    Ok(LoadedBook {
        book,
        manifest,
        manifest_path,
    })
}

#[cfg(test)]
mod tests;
