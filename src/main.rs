//! Folio - A terminal viewer for image books.
//!
//! # Usage
//!
//! ```bash
//! folio data/books.json
//! folio --book moon --double data/books.json
//! folio --magnify --cover plate data/books.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use folio::app::App;
use folio::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use folio::logging;
use folio::viewer::responsive::DEFAULT_NARROW_WIDTH;
use folio::viewer::{CoverSet, ResponsivePolicy};

/// A terminal viewer for image books
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    /// Library file listing the books
    #[arg(value_name = "LIBRARY", default_value = "data/books.json")]
    library: PathBuf,

    /// Open this book id directly instead of the library
    #[arg(long, value_name = "ID")]
    book: Option<String>,

    /// Start books in double-page mode
    #[arg(long)]
    double: bool,

    /// Start with the magnifier enabled
    #[arg(long)]
    magnify: bool,

    /// Terminal width (columns) at or below which double-page mode is disabled
    #[arg(long, value_name = "COLUMNS")]
    narrow_width: Option<u16>,

    /// Page file name marking a cover page (repeatable; replaces the defaults)
    #[arg(long, value_name = "NAME")]
    cover: Vec<String>,

    /// Watch the open manifest for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Disable page images (show placeholders only)
    #[arg(long)]
    no_images: bool,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render/image debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("FOLIO_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = logging::init(render_debug_log_path.as_deref(), effective.perf) {
        eprintln!("[warn] {err:#}");
    }

    let covers = if effective.covers.is_empty() {
        CoverSet::default()
    } else {
        CoverSet::new(&effective.covers)
    };
    let policy = ResponsivePolicy::new(effective.narrow_width.unwrap_or(DEFAULT_NARROW_WIDTH));
    tracing::debug!(
        library = %cli.library.display(),
        narrow_width = policy.max_width(),
        "starting"
    );

    // Run the application
    let mut app = App::new(cli.library)
        .with_initial_book(cli.book)
        .with_covers(covers)
        .with_policy(policy)
        .with_double_page(effective.double)
        .with_magnifier(effective.magnify)
        .with_watch(effective.watch)
        .with_force_half_cell(effective.force_half_cell)
        .with_images_enabled(!effective.no_images)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
