//! Command-line front end.
//!
//! Each invocation is one session: files given on the command line are
//! uploaded first, then the requested action runs against them. Flash
//! messages go to stderr, the rendered panel to stdout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::api::{GrimoireApi, HttpApi};
use crate::config::load_settings;
use crate::models::{DocumentId, StagedFile};
use crate::services::{BatchOutcome, NoProgress, ProgressSink, SearchState, SortOption};
use crate::session::{Severity, UploadStatus};
use crate::ui::{templates, Controller};

#[derive(Parser)]
#[command(name = "grimoire", version, about = "Upload, process and search Grimoire documents")]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "GRIMOIRE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Wrap the output in a standalone HTML page
    #[arg(long, global = true)]
    page: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Load `.env` into the process environment, then parse arguments, so
    /// `env`-backed flags see values from the file. Real environment
    /// variables and flags still win.
    fn load<I, T>(env_file: Option<&Path>, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        // A missing `.env` is fine.
        let _ = match env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(drop),
        };
        Self::try_parse_from(args)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Upload files, one request per file
    Upload {
        files: Vec<PathBuf>,
        /// Send every file in a single multipart request
        #[arg(long)]
        batch: bool,
    },
    /// Upload files and extract the text of one of them
    Extract {
        files: Vec<PathBuf>,
        /// Document id to act on (defaults to the first upload)
        #[arg(long)]
        select: Option<i64>,
    },
    /// Upload files and summarize one of them
    Summarize {
        files: Vec<PathBuf>,
        #[arg(long)]
        select: Option<i64>,
    },
    /// Semantic search over uploaded documents
    Search { query: String },
    /// Faceted search through the search connector
    Find(FindArgs),
    /// Autocomplete suggestions for a partial query
    Suggest { query: String },
    /// Keyword lookup
    Lookup { query: String },
    /// List files stored on the server
    Files,
}

#[derive(Args)]
struct FindArgs {
    #[arg(default_value = "")]
    query: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
    sort: SortArg,
    /// Facet filter as field=value (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

impl FindArgs {
    /// Search state for this invocation, starting from `base`. Repeated
    /// filters on one field merge into a single filter.
    fn into_state(self, base: &SearchState) -> SearchState {
        let mut state = base.clone();
        state.search_term = self.query;
        state.current = self.page.max(1);
        if let Some(per_page) = self.per_page.filter(|n| *n > 0) {
            state.results_per_page = per_page;
        }
        state.sort_list = self.sort.option().sort_list();
        for (field, value) in &self.filters {
            state.add_filter_value(field, value);
        }
        state
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    TitleAsc,
    TitleDesc,
    Newest,
    Oldest,
}

impl SortArg {
    fn option(self) -> SortOption {
        let index = match self {
            SortArg::Relevance => 0,
            SortArg::TitleAsc => 1,
            SortArg::TitleDesc => 2,
            SortArg::Newest => 3,
            SortArg::Oldest => 4,
        };
        SortOption::defaults().swap_remove(index)
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() && !value.is_empty() => {
            Ok((field.to_string(), value.to_string()))
        }
        _ => Err(format!("expected field=value, got {:?}", raw)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "grimoire=warn",
        1 => "grimoire=info",
        _ => "grimoire=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Per-file spinners for uploads.
struct SpinnerProgress {
    _multi: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl SpinnerProgress {
    fn new(files: &[StagedFile]) -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template("{spinner} {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bars = files
            .iter()
            .map(|f| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_prefix(f.name.clone());
                bar
            })
            .collect();
        Self {
            _multi: multi,
            bars,
        }
    }
}

impl ProgressSink for SpinnerProgress {
    fn started(&self, index: usize, _name: &str) {
        if let Some(bar) = self.bars.get(index) {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn finished(&self, index: usize, _name: &str, status: UploadStatus) {
        if let Some(bar) = self.bars.get(index) {
            let msg = match status {
                UploadStatus::Uploaded => style("✓ Uploaded").green().to_string(),
                UploadStatus::Failed => style("✗ Error").red().to_string(),
                UploadStatus::Pending => return,
            };
            bar.finish_with_message(msg);
        }
    }
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<StagedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = StagedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

/// Parse arguments and run one command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::load(None, std::env::args_os()).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);

    let mut settings = load_settings().await;
    if let Some(base_url) = cli.base_url.as_deref() {
        settings.base_url = base_url.trim_end_matches('/').to_string();
    }

    let api = HttpApi::new(&settings)?;
    tracing::debug!("Using backend {}", api.base_url());
    let mut controller = Controller::new(api, settings);
    execute(&mut controller, cli.command).await?;

    for flash in controller.session().flashes.messages().iter().rev() {
        let line = match flash.severity {
            Severity::Success => style(&flash.message).green(),
            Severity::Error => style(&flash.message).red(),
            Severity::Info => style(&flash.message).cyan(),
        };
        eprintln!("{}", line);
    }

    let panel = controller.render_panel();
    if cli.page {
        println!("{}", templates::base_template("Results", &panel));
    } else {
        println!("{}", panel);
    }

    let failed = controller
        .session()
        .flashes
        .messages()
        .iter()
        .any(|m| m.severity == Severity::Error);
    if failed {
        bail!("command finished with errors");
    }
    Ok(())
}

async fn execute<A: GrimoireApi>(
    controller: &mut Controller<A>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Upload { files, batch } => {
            let files = read_files(&files).await?;
            if batch {
                controller.stage_files(files);
                if let BatchOutcome::Uploaded { .. } = controller.submit_staged().await {
                    tracing::info!("Batch accepted");
                }
            } else {
                let progress = SpinnerProgress::new(&files);
                controller.upload_files(&files, &progress).await;
            }
        }
        Command::Extract { files, select } => {
            upload_and_select(controller, &files, select).await?;
            controller.extract_text().await;
        }
        Command::Summarize { files, select } => {
            upload_and_select(controller, &files, select).await?;
            controller.summarize().await;
        }
        Command::Search { query } => {
            controller.semantic_search(&query).await;
        }
        Command::Find(args) => {
            let state = args.into_state(controller.search_state());
            let page = controller
                .connector()
                .on_search(&state, controller.query_config())
                .await;
            eprintln!("{} result(s), {} page(s)", page.total_results, page.total_pages);
            controller.set_search_state(state);
            controller.show_search_page(page);
        }
        Command::Suggest { query } => {
            let suggestions = controller.autocomplete(&query).await;
            for result in &suggestions.autocompleted_results {
                if let Some(name) = result.raw_str("fileName") {
                    eprintln!("{}", name);
                }
            }
        }
        Command::Lookup { query } => {
            controller.quick_search(&query).await;
        }
        Command::Files => {
            controller.load_files().await;
        }
    }
    Ok(())
}

async fn upload_and_select<A: GrimoireApi>(
    controller: &mut Controller<A>,
    paths: &[PathBuf],
    select: Option<i64>,
) -> anyhow::Result<()> {
    let files = read_files(paths).await?;
    controller.upload_files(&files, &NoProgress).await;
    if let Some(id) = select {
        if !controller.select_document(DocumentId(id)) {
            bail!("Document {} was not uploaded in this session", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("fileType=pdf"),
            Ok(("fileType".to_string(), "pdf".to_string()))
        );
        assert!(parse_filter("fileType").is_err());
        assert!(parse_filter("=pdf").is_err());
    }

    #[test]
    fn test_sort_arg_maps_to_option() {
        assert_eq!(SortArg::Relevance.option().name, "Relevance");
        assert_eq!(SortArg::Oldest.option().name, "Date (Oldest)");
    }

    #[test]
    fn test_cli_parses_find() {
        let cli = Cli::try_parse_from([
            "grimoire", "find", "budget", "--page", "2", "--sort", "newest", "--filter",
            "fileType=pdf",
        ])
        .unwrap();
        match cli.command {
            Command::Find(args) => {
                assert_eq!(args.query, "budget");
                assert_eq!(args.page, 2);
                assert_eq!(args.filters.len(), 1);
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn test_find_merges_repeated_filters() {
        let cli = Cli::try_parse_from([
            "grimoire", "find", "budget", "--per-page", "5", "--filter", "fileType=pdf",
            "--filter", "fileType=docx", "--filter", "category=legal",
        ])
        .unwrap();
        let Command::Find(args) = cli.command else {
            panic!("expected find");
        };

        let state = args.into_state(&SearchState::default());
        assert_eq!(state.search_term, "budget");
        assert_eq!(state.results_per_page, 5);
        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.filters[0].field, "fileType");
        assert_eq!(state.filters[0].values, vec!["pdf", "docx"]);
    }

    #[test]
    fn test_env_file_feeds_env_backed_flags() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "GRIMOIRE_BASE_URL=http://127.0.0.1:9/from-dotenv\n").unwrap();

        let cli = Cli::load(Some(env_file.as_path()), ["grimoire", "files"]).unwrap();
        assert_eq!(
            cli.base_url.as_deref(),
            Some("http://127.0.0.1:9/from-dotenv")
        );

        // Flags still override the file.
        let cli = Cli::load(
            Some(env_file.as_path()),
            ["grimoire", "--base-url", "http://flag.local", "files"],
        )
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://flag.local"));
    }
}
