use std::path::PathBuf;

use tempfile::tempdir;

use super::*;

const LIBRARY: &str = r#"[
  {"id": "moon", "title": "Moon Atlas", "cover": "moon/cover.jpg", "manifest": "moon/manifest.json"},
  {"id": "sea", "title": "Sea Charts", "coverUrl": "sea/cover.jpg", "manifestPath": "sea/manifest.json"}
]"#;

#[test]
fn test_library_parses_books_and_aliases() {
    let library = Library::from_json(LIBRARY, "/data").unwrap();
    assert_eq!(library.books.len(), 2);
    assert_eq!(library.books[1].manifest, "sea/manifest.json");
    assert_eq!(library.books[1].cover, "sea/cover.jpg");
    assert_eq!(
        library.manifest_path(&library.books[0]),
        PathBuf::from("/data/moon/manifest.json")
    );
}

#[test]
fn test_library_non_list_payload_is_invalid() {
    let err = Library::from_json(r#"{"books": []}"#, ".").unwrap_err();
    assert_eq!(err, LoadError::InvalidLibrary);
    assert_eq!(err.kind(), ErrorKind::NetworkOrParseFailure);
}

#[test]
fn test_library_bad_json_is_parse_error() {
    let err = Library::from_json("[{", ".").unwrap_err();
    assert!(matches!(err, LoadError::Parse { what: "library", .. }));
}

#[test]
fn test_library_skips_malformed_entries_and_keeps_the_rest() {
    let text = r#"[
      {"id": "a", "title": "A"},
      {"id": 7, "title": "Numbered", "manifest": "n.json"},
      "not an object",
      {"id": "b", "manifest": "b/manifest.json"},
      {"id": "c", "title": "C", "manifest": "c/manifest.json"}
    ]"#;
    let library = Library::from_json(text, "/d").unwrap();
    let ids: Vec<&str> = library.books.iter().map(|book| book.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(library.books[0].title, UNTITLED);
}

#[test]
fn test_library_with_only_malformed_entries_is_empty_not_unavailable() {
    let library = Library::from_json(r#"[{"title": "No id"}]"#, ".").unwrap();
    assert!(library.books.is_empty());
}

#[test]
fn test_cover_path_is_none_for_blank_cover() {
    let library =
        Library::from_json(r#"[{"id": "a", "title": "A", "manifest": "a.json"}]"#, "/d").unwrap();
    assert!(library.cover_path(&library.books[0]).is_none());
}

#[test]
fn test_manifest_defaults_title_and_keeps_order() {
    let manifest = Manifest::from_json(r#"{"pages": ["b.jpg", "a.jpg"]}"#, "/m").unwrap();
    assert_eq!(manifest.title, UNTITLED);
    assert_eq!(manifest.pages, vec!["b.jpg", "a.jpg"]);
    assert_eq!(manifest.page_path("a.jpg"), PathBuf::from("/m/a.jpg"));
}

#[test]
fn test_manifest_non_list_pages_degrade_to_empty() {
    let manifest = Manifest::from_json(r#"{"title": "T", "pages": "nope"}"#, ".").unwrap();
    assert_eq!(manifest.title, "T");
    assert!(manifest.pages.is_empty());
}

#[test]
fn test_manifest_drops_non_string_pages() {
    let manifest = Manifest::from_json(r#"{"title": "T", "pages": ["a.jpg", 3, null]}"#, ".")
        .unwrap();
    assert_eq!(manifest.pages, vec!["a.jpg"]);
}

#[test]
fn test_manifest_that_is_not_an_object_is_malformed() {
    let err = Manifest::from_json("[1, 2]", ".").unwrap_err();
    assert_eq!(err, LoadError::MalformedManifest);
    assert_eq!(err.kind(), ErrorKind::EmptyOrMalformedManifest);
    assert_eq!(err.viewer_title(), BOOK_UNAVAILABLE);
}

#[test]
fn test_absolute_page_references_are_kept() {
    let manifest = Manifest::from_json(r#"{"pages": []}"#, "/m").unwrap();
    let abs = if cfg!(windows) { r"C:\pages\1.jpg" } else { "/pages/1.jpg" };
    assert_eq!(manifest.page_path(abs), PathBuf::from(abs));
}

#[test]
fn test_load_book_reads_library_and_manifest_from_disk() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("moon")).unwrap();
    std::fs::write(dir.path().join("books.json"), LIBRARY).unwrap();
    std::fs::write(
        dir.path().join("moon/manifest.json"),
        r#"{"title": "Moon Atlas", "pages": ["001.jpg", "002.jpg"]}"#,
    )
    .unwrap();

    let loaded = load_book(&dir.path().join("books.json"), "moon").unwrap();
    assert_eq!(loaded.book.title, "Moon Atlas");
    assert_eq!(loaded.manifest.pages.len(), 2);
    assert_eq!(loaded.manifest.base_dir, dir.path().join("moon"));
    assert_eq!(loaded.manifest_path, dir.path().join("moon/manifest.json"));
}

#[test]
fn test_load_book_unknown_id_is_not_found() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("books.json"), LIBRARY).unwrap();
    let err = load_book(&dir.path().join("books.json"), "comet").unwrap_err();
    assert_eq!(err, LoadError::BookNotFound("comet".to_string()));
    assert_eq!(err.kind(), ErrorKind::BookNotFound);
    assert_eq!(err.viewer_title(), BOOK_UNAVAILABLE);
}

#[test]
fn test_load_book_without_id_reports_not_found_title() {
    let err = load_book(std::path::Path::new("books.json"), "  ").unwrap_err();
    assert_eq!(err, LoadError::MissingBookId);
    assert_eq!(err.viewer_title(), BOOK_NOT_FOUND);
}

#[test]
fn test_load_book_missing_manifest_is_unreadable() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("books.json"), LIBRARY).unwrap();
    let err = load_book(&dir.path().join("books.json"), "sea").unwrap_err();
    assert!(matches!(err, LoadError::Unreadable { .. }));
}

#[test]
fn test_load_library_missing_file_is_unreadable() {
    let dir = tempdir().unwrap();
    let err = load_library(&dir.path().join("missing.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkOrParseFailure);
}
