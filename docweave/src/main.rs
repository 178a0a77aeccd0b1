//! docweave - markdown documentation tool
//!
//! A CLI for parsing markdown document projects: frontmatter, structural
//! metadata, HTML rendering, and project-wide statistics and search.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use docweave::pipeline::ParseOptions;
use docweave::project::ProjectManager;

/// Main entry point for the docweave CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { name, author, path } => {
            handle_init_command(&name, &author, path)?;
        }

        Commands::Build {
            input,
            output,
            no_html,
            no_metadata,
            no_diagrams,
            no_links,
            base_path,
            verbose,
        } => {
            let options = ParseOptions {
                include_html: !no_html,
                extract_metadata: !no_metadata,
                process_diagrams: !no_diagrams,
                resolve_links: !no_links,
                base_path,
            };
            handle_build_command(input, output, options, verbose)?;
        }

        Commands::Stats { input, json } => {
            handle_stats_command(input, json)?;
        }

        Commands::Search { input, query } => {
            handle_search_command(input, &query)?;
        }

        Commands::Category { input, name } => {
            handle_category_command(input, &name)?;
        }
    }

    Ok(())
}

/// Handle the init command
fn handle_init_command(name: &str, author: &str, path: Option<std::path::PathBuf>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| std::path::PathBuf::from("."));

    if !target_path.exists() {
        std::fs::create_dir_all(&target_path)
            .with_context(|| format!("Failed to create directory {}", target_path.display()))?;
    }

    let mut manager = ProjectManager::new(&target_path);
    let config = manager
        .initialize_project(name, author)
        .with_context(|| format!("Failed to initialize project in {}", target_path.display()))?;

    println!("Initialized project '{}' for {}", config.name, config.author);
    println!("\nNext steps:");
    println!("  1. Add markdown files under {}", target_path.display());
    println!("  2. Run 'docweave build' to render them to HTML");
    println!("  3. Run 'docweave stats' to see the project index");

    Ok(())
}

/// Handle the build command
fn handle_build_command(
    input: std::path::PathBuf,
    output: std::path::PathBuf,
    options: ParseOptions,
    verbose: bool,
) -> Result<()> {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let include_html = options.include_html;

    println!("Building documentation...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    // Stage 1: Parse all project documents
    println!("\n[Stage 1/2] Parsing documents...");
    let mut manager = ProjectManager::with_options(&input, options);
    let summary = manager
        .parse_all_files()
        .with_context(|| format!("Failed to parse project at {}", input.display()))?;

    println!(
        "✓ Parsed {} documents ({} failed)",
        summary.success, summary.failed
    );
    for (path, error) in manager.failures() {
        println!("  ! {}: {}", path.display(), error);
    }

    if verbose {
        let index = manager.statistics();
        println!("  - {} words", index.total_words);
        println!("  - {} categories", index.statistics.category_count.len());
        println!("  - {} tags", index.statistics.tag_count.len());
    }

    // Stage 2: Write rendered HTML
    if include_html {
        println!("\n[Stage 2/2] Writing HTML...");
        let mut written = 0;
        for (path, document) in manager.documents() {
            let out_path = output.join(path).with_extension("html");
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            std::fs::write(&out_path, &document.html)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            written += 1;
        }
        println!("✓ Wrote {} HTML files", written);
    } else {
        println!("\n[Stage 2/2] Skipping HTML output");
    }

    println!("\n✓ Build completed successfully!");

    Ok(())
}

/// Handle the stats command
fn handle_stats_command(input: std::path::PathBuf, json: bool) -> Result<()> {
    let mut manager = ProjectManager::new(&input);
    manager
        .parse_all_files()
        .with_context(|| format!("Failed to parse project at {}", input.display()))?;

    if json {
        let index = manager
            .export_index_json()
            .context("Failed to serialize project index")?;
        println!("{}", index);
        return Ok(());
    }

    let index = manager.statistics();
    println!("Documents: {}", index.document_count);
    println!("Total words: {}", index.total_words);

    if !index.statistics.category_count.is_empty() {
        println!("\nCategories:");
        for (category, count) in &index.statistics.category_count {
            println!("  {} ({})", category, count);
        }
    }

    if !index.statistics.tag_count.is_empty() {
        println!("\nTags:");
        for (tag, count) in &index.statistics.tag_count {
            println!("  {} ({})", tag, count);
        }
    }

    if !index.statistics.author_count.is_empty() {
        println!("\nAuthors:");
        for (author, count) in &index.statistics.author_count {
            println!("  {} ({})", author, count);
        }
    }

    Ok(())
}

/// Handle the search command
fn handle_search_command(input: std::path::PathBuf, query: &str) -> Result<()> {
    let mut manager = ProjectManager::new(&input);
    manager
        .parse_all_files()
        .with_context(|| format!("Failed to parse project at {}", input.display()))?;

    let results = manager.search_documents(query);
    if results.is_empty() {
        println!("No documents match '{}'", query);
        return Ok(());
    }

    println!("{} documents match '{}':\n", results.len(), query);
    for info in results {
        print_document_info(&info);
    }

    Ok(())
}

/// Handle the category command
fn handle_category_command(input: std::path::PathBuf, name: &str) -> Result<()> {
    let mut manager = ProjectManager::new(&input);
    manager
        .parse_all_files()
        .with_context(|| format!("Failed to parse project at {}", input.display()))?;

    let results = manager.documents_by_category(name);
    if results.is_empty() {
        println!("No documents in category '{}'", name);
        return Ok(());
    }

    println!("{} documents in category '{}':\n", results.len(), name);
    for info in results {
        print_document_info(&info);
    }

    Ok(())
}

/// Print a one-line summary for a document
fn print_document_info(info: &docweave::project::DocumentInfo) {
    println!(
        "  {} - {} ({} words, {} min read)",
        info.path, info.title, info.word_count, info.reading_time
    );
}
