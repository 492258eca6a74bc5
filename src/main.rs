//! styledown - render markdown as styled text.
//!
//! # Usage
//!
//! ```bash
//! styledown README.md
//! styledown --format runs README.md
//! styledown --watch --theme dark README.md
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use styledown::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use styledown::highlight::HighlightTheme;
use styledown::output::{OutputFormat, to_json, write_ansi, write_runs};
use styledown::parser::MarkdownParser;
use styledown::perf;
use styledown::watcher::FileWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL: Duration = Duration::from_millis(250);

/// Render markdown as styled text
#[derive(Parser, Debug)]
#[command(name = "styledown", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Do not turn bare URLs and email addresses into links
    #[arg(long)]
    no_autolink: bool,

    /// Do not color fenced code by language
    #[arg(long)]
    no_highlight: bool,

    /// Syntax highlight theme for fenced code
    #[arg(long, value_enum)]
    theme: Option<HighlightTheme>,

    /// Base font size in points
    #[arg(long, value_name = "POINTS")]
    font_size: Option<f32>,

    /// Link color as #rrggbb
    #[arg(long, value_name = "COLOR")]
    link_color: Option<String>,

    /// Re-render whenever the file changes
    #[arg(short, long)]
    watch: bool,

    /// Print pipeline timings to stderr
    #[arg(long)]
    perf: bool,

    /// Write one line per pipeline event to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            no_autolink: self.no_autolink,
            perf: self.perf,
            no_highlight: self.no_highlight,
            theme: self.theme,
            format: self.format,
            font_size: self.font_size,
            link_color: self.link_color.clone(),
            debug_log: self.debug_log.clone(),
        }
    }
}

fn render(parser: &MarkdownParser, path: &Path, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let markdown =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = parser.parse(&markdown)?;
    match format {
        OutputFormat::Ansi => {
            write_ansi(out, &text, parser.font_color())?;
            writeln!(out)?;
        }
        OutputFormat::Json => writeln!(out, "{}", to_json(&text)?)?,
        OutputFormat::Runs => write_runs(out, &text)?,
    }
    out.flush()?;
    Ok(())
}

fn watch(parser: &MarkdownParser, path: &Path, format: OutputFormat) -> Result<()> {
    let mut watcher = FileWatcher::new(path, WATCH_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", path.display()))?;
    let mut stdout = io::stdout().lock();
    loop {
        if format == OutputFormat::Ansi {
            queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        if let Err(err) = render(parser, watcher.target_path(), format, &mut stdout) {
            // Keep watching; the next save may fix it.
            eprintln!("[warn] {err:#}");
        }
        while !watcher
            .wait_for_change(WATCH_POLL)
            .context("File watcher stopped")?
        {}
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

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
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("STYLEDOWN_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let config = effective.to_parser_config().context("Invalid configuration")?;
    let parser = MarkdownParser::new(config);
    let format = effective.format.unwrap_or_default();

    if effective.watch {
        watch(&parser, &cli.file, format)
    } else {
        render(&parser, &cli.file, format, &mut io::stdout().lock())
    }
}
