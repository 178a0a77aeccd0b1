use std::fs;
use std::path::Path;

use docweave::pipeline::{parse, ParseOptions};
use docweave::project::ProjectManager;

fn write_project(root: &Path) {
    fs::write(
        root.join("01_intro.md"),
        concat!(
            "---\n",
            "title: \"Introduction\"\n",
            "category: guide\n",
            "tags: [\"intro\"]\n",
            "author: Ada\n",
            "---\n",
            "# Introduction\n",
            "\n",
            "Welcome to the project. See [setup](./02_setup.md).\n",
        ),
    )
    .unwrap();

    fs::write(
        root.join("02_setup.md"),
        concat!(
            "---\n",
            "title: \"Setup\"\n",
            "category: guide\n",
            "tags: [\"intro\", \"install\"]\n",
            "author: Ada\n",
            "---\n",
            "# Setup\n",
            "\n",
            "```sh\ncargo install docweave\n```\n",
            "\n",
            "| Step | Command |\n",
            "| --- | --- |\n",
            "| build | cargo build |\n",
        ),
    )
    .unwrap();

    fs::write(
        root.join("03_reference.md"),
        concat!(
            "---\n",
            "title: \"API Reference\"\n",
            "category: reference\n",
            "tags: [\"api\"]\n",
            "author: Grace\n",
            "---\n",
            "# Reference\n",
            "\n",
            "External docs live at [docs](https://example.com/docs).\n",
        ),
    )
    .unwrap();

    // Invalid UTF-8 makes this file unreadable as text
    fs::write(root.join("zz_corrupt.md"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
}

#[test]
fn test_parse_all_files_counts_and_index_totals() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let mut manager = ProjectManager::new(dir.path());
    let summary = manager.parse_all_files().unwrap();

    assert_eq!(summary.success, 3);
    assert_eq!(summary.failed, 1);

    // Index totals reflect only the three succeeded documents
    let index = manager.statistics();
    assert_eq!(index.document_count, 3);
    assert!(index.total_words > 0);
    assert_eq!(index.statistics.category_count.get("guide"), Some(&2));
    assert_eq!(index.statistics.category_count.get("reference"), Some(&1));
    assert_eq!(index.statistics.tag_count.get("intro"), Some(&2));
    assert_eq!(index.statistics.author_count.get("Ada"), Some(&2));
    assert_eq!(index.statistics.author_count.get("Grace"), Some(&1));
}

#[test]
fn test_search_and_category_queries() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let mut manager = ProjectManager::new(dir.path());
    manager.parse_all_files().unwrap();

    let results = manager.search_documents("setup");
    assert!(!results.is_empty());
    assert_eq!(results[0].title, "Setup");

    let guides = manager.documents_by_category("guide");
    assert_eq!(guides.len(), 2);
    assert!(manager.documents_by_category("missing").is_empty());
}

#[test]
fn test_initialize_project_writes_config() {
    let dir = tempfile::tempdir().unwrap();

    let mut manager = ProjectManager::new(dir.path());
    let config = manager.initialize_project("Handbook", "Ada").unwrap();

    assert_eq!(config.name, "Handbook");
    assert!(dir.path().join("docweave.toml").exists());

    // A fresh manager over the same root picks the config up
    let manager = ProjectManager::new(dir.path());
    assert_eq!(manager.config().unwrap().name, "Handbook");
}

#[test]
fn test_rendered_html_for_project_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let mut manager = ProjectManager::new(dir.path());
    manager.parse_all_files().unwrap();

    let setup = manager
        .documents()
        .find(|(path, _)| path.to_str() == Some("02_setup.md"))
        .map(|(_, doc)| doc)
        .unwrap();

    assert!(setup.html.contains("<h1>"));
    assert!(setup.html.contains("<table>"));
    assert_eq!(setup.metadata.tables.len(), 1);
    assert_eq!(setup.metadata.code_blocks.len(), 1);
}

#[test]
fn test_export_index_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let mut manager = ProjectManager::new(dir.path());
    manager.parse_all_files().unwrap();

    let json = manager.export_index_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["documentCount"], 3);
    assert!(value["structure"].as_array().unwrap().len() == 3);
    assert!(value["statistics"]["tagCount"].is_object());
}

#[test]
fn test_parse_is_stateless_across_invocations() {
    let options = ParseOptions::default();
    let raw = "---\ntitle: T\n---\n# Same Input\n";

    let first = parse(raw, &options);
    let second = parse(raw, &options);

    assert_eq!(
        first.document().unwrap().metadata,
        second.document().unwrap().metadata
    );
}
