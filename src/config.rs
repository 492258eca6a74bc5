//! Saved defaults for the `styledown` command.
//!
//! A config file holds command-line flags, one or more per line, with `#`
//! comments. The global file lives in the platform config directory and a
//! `.styledownrc` in the working directory overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::highlight::HighlightTheme;
use crate::output::OutputFormat;
use crate::parser::ParserConfig;
use crate::rules::CodeStyle;
use crate::text::Color;

const APP_DIR: &str = "styledown";
const LOCAL_FILE: &str = ".styledownrc";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_autolink: bool,
    pub perf: bool,
    pub no_highlight: bool,
    pub theme: Option<HighlightTheme>,
    pub format: Option<OutputFormat>,
    pub font_size: Option<f32>,
    /// Kept as written; checked when building a `ParserConfig`.
    pub link_color: Option<String>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches add up, values from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_autolink: self.no_autolink || other.no_autolink,
            perf: self.perf || other.perf,
            no_highlight: self.no_highlight || other.no_highlight,
            theme: other.theme.or(self.theme),
            format: other.format.or(self.format),
            font_size: other.font_size.or(self.font_size),
            link_color: other.link_color.clone().or_else(|| self.link_color.clone()),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// Parser settings described by these flags.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidColor`] for a malformed link color.
    pub fn to_parser_config(&self) -> crate::Result<ParserConfig> {
        let defaults = ParserConfig::default();
        let link_color = match &self.link_color {
            Some(color) => color.parse::<Color>()?,
            None => defaults.link_color,
        };
        let font = match self.font_size {
            Some(size) => defaults.font.clone().with_size(size),
            None => defaults.font.clone(),
        };
        let code = CodeStyle {
            syntax_highlighting: !self.no_highlight,
            theme: self.theme.unwrap_or(defaults.code.theme),
            ..defaults.code.clone()
        };
        Ok(ParserConfig {
            font,
            link_color,
            code,
            automatic_link_detection: !self.no_autolink,
            ..defaults
        })
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Read flags from `path`; a missing file yields no flags.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# styledown defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_autolink {
        lines.push("--no-autolink".to_string());
    }
    if flags.no_highlight {
        lines.push("--no-highlight".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme_name(theme)));
    }
    if let Some(format) = flags.format {
        lines.push(format!("--format {}", format.name()));
    }
    if let Some(size) = flags.font_size {
        lines.push(format!("--font-size {size}"));
    }
    if let Some(color) = &flags.link_color {
        lines.push(format!("--link-color {color}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of `tokens`, accepting `--flag value` and
/// `--flag=value`. Unknown tokens and unparseable values are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let mut value = || match inline {
            Some(value) => Some(value.to_string()),
            None => {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };
        match name {
            "--watch" | "-w" => flags.watch = true,
            "--no-autolink" => flags.no_autolink = true,
            "--no-highlight" => flags.no_highlight = true,
            "--perf" => flags.perf = true,
            "--theme" => flags.theme = value().as_deref().and_then(parse_theme),
            "--format" => flags.format = value().as_deref().and_then(OutputFormat::from_name),
            "--font-size" => flags.font_size = value().and_then(|v| v.parse().ok()),
            "--link-color" => flags.link_color = value(),
            "--debug-log" => flags.debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<HighlightTheme> {
    match s {
        "light" => Some(HighlightTheme::Light),
        "dark" => Some(HighlightTheme::Dark),
        _ => None,
    }
}

const fn theme_name(theme: HighlightTheme) -> &'static str {
    match theme {
        HighlightTheme::Light => "light",
        HighlightTheme::Dark => "dark",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "styledown",
            "--watch",
            "--no-autolink",
            "--theme",
            "dark",
            "--format=json",
            "--font-size",
            "14.5",
            "--debug-log=pipeline.log",
            "README.md",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.no_autolink);
        assert_eq!(flags.theme, Some(HighlightTheme::Dark));
        assert_eq!(flags.format, Some(OutputFormat::Json));
        assert_eq!(flags.font_size, Some(14.5));
        assert_eq!(flags.debug_log, Some(PathBuf::from("pipeline.log")));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_bad_values() {
        let flags = parse_flag_tokens(&tokens(&["--theme", "sepia", "--font-size=big"]));
        assert_eq!(flags.theme, None);
        assert_eq!(flags.font_size, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(HighlightTheme::Light),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            theme: Some(HighlightTheme::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.perf);
        assert_eq!(merged.theme, Some(HighlightTheme::Dark));
    }

    #[test]
    fn test_to_parser_config_applies_flags() {
        let flags = ConfigFlags {
            no_autolink: true,
            font_size: Some(16.0),
            link_color: Some("#ff0000".to_string()),
            theme: Some(HighlightTheme::Dark),
            ..ConfigFlags::default()
        };
        let config = flags.to_parser_config().unwrap();
        assert!(!config.automatic_link_detection);
        assert_eq!(config.font.size, 16.0);
        assert_eq!(config.link_color, Color::rgb(255, 0, 0));
        assert_eq!(config.code.theme, HighlightTheme::Dark);
        assert!(config.code.syntax_highlighting);
    }

    #[test]
    fn test_to_parser_config_rejects_bad_color() {
        let flags = ConfigFlags {
            link_color: Some("blue".to_string()),
            ..ConfigFlags::default()
        };
        let err = flags.to_parser_config().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidColor(ref s) if s == "blue"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(LOCAL_FILE);
        let flags = ConfigFlags {
            watch: true,
            no_autolink: true,
            perf: true,
            no_highlight: true,
            theme: Some(HighlightTheme::Dark),
            format: Some(OutputFormat::Runs),
            font_size: Some(12.5),
            link_color: Some("#112233".to_string()),
            debug_log: Some(PathBuf::from("pipeline.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
