//! Cover page markers.

use std::collections::BTreeSet;

/// Markers used when no `--cover` flags are given.
pub const DEFAULT_COVER_MARKERS: &[&str] = &["cover", "front-cover", "back-cover"];

/// Set of filename markers identifying pages that never share a spread.
///
/// A page reference matches when its file name or file stem equals one of
/// the markers, ignoring ASCII case. Query strings and fragments are
/// stripped first so `covers/back.jpg?v=2` has the stem `back`.
///
/// ```
/// use folio::viewer::CoverSet;
///
/// let covers = CoverSet::new(["cover", "back"]);
/// assert!(covers.is_cover("pages/Cover.png"));
/// assert!(covers.is_cover("pages/back.jpg?v=2"));
/// assert!(!covers.is_cover("pages/003.jpg"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverSet {
    markers: BTreeSet<String>,
}

impl Default for CoverSet {
    fn default() -> Self {
        Self::new(DEFAULT_COVER_MARKERS.iter().copied())
    }
}

impl CoverSet {
    /// Build a cover set from markers. Blank markers are ignored.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// A cover set that marks nothing.
    pub const fn empty() -> Self {
        Self {
            markers: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    /// Whether `page` is cover-marked.
    pub fn is_cover(&self, page: &str) -> bool {
        if self.markers.is_empty() {
            return false;
        }
        let name = file_name(page).to_ascii_lowercase();
        if name.is_empty() {
            return false;
        }
        if self.markers.contains(&name) {
            return true;
        }
        let stem = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
        self.markers.contains(stem)
    }

    /// Whether the page at `index` exists and is cover-marked.
    pub fn is_cover_at(&self, pages: &[String], index: usize) -> bool {
        pages.get(index).is_some_and(|page| self.is_cover(page))
    }
}

fn file_name(page: &str) -> &str {
    let end = page.find(['?', '#']).unwrap_or(page.len());
    let path = page[..end].trim_end_matches(['/', '\\']);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
