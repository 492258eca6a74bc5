use std::path::PathBuf;

use styledown::config::{ConfigFlags, load_config_flags, parse_flag_tokens, save_config_flags};
use styledown::highlight::HighlightTheme;
use styledown::output::OutputFormat;
use styledown::parser::MarkdownParser;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".styledownrc");
    let content = r"
# comment
--watch

--theme light
   
--debug-log=pipeline.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.theme, Some(HighlightTheme::Light));
    assert_eq!(flags.debug_log, Some(PathBuf::from("pipeline.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".styledownrc");
    let content = "--watch\n--theme light --format runs\n--debug-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_flags = ConfigFlags {
        theme: Some(HighlightTheme::Dark),
        no_autolink: true,
        ..ConfigFlags::default()
    };

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.no_autolink, "cli flags should be applied");
    assert_eq!(effective.theme, Some(HighlightTheme::Dark), "cli should override theme");
    assert_eq!(effective.format, Some(OutputFormat::Runs));
    assert_eq!(
        effective.debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_local_file_overrides_global_file() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("global").join("config");
    let local = dir.path().join(".styledownrc");
    save_config_flags(
        &global,
        &ConfigFlags {
            font_size: Some(12.0),
            link_color: Some("#000080".to_string()),
            ..ConfigFlags::default()
        },
    )
    .unwrap();
    std::fs::write(&local, "--font-size=18\n").unwrap();

    let effective = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(effective.font_size, Some(18.0));
    assert_eq!(effective.link_color.as_deref(), Some("#000080"));
}

#[test]
fn test_no_autolink_flag_reaches_parser() {
    let flags = parse_flag_tokens(&["--no-autolink".to_string()]);
    let parser = MarkdownParser::new(flags.to_parser_config().unwrap());
    assert!(!parser.automatic_link_detection());
    let text = parser.parse("https://example.com").unwrap();
    assert!(text.attributes_at(0).unwrap().link.is_none());
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        no_highlight: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.no_highlight);
    assert!(merged.perf);
}
