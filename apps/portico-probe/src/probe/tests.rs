use super::Cli;
use super::Command;
use super::ProbeSettings;
use super::execute;
use clap::Parser;
use std::fs;
use std::path::Path;

const SETTINGS: &str = r##"
open_internally = ["my.ovoenergy.com"]
toolbar_color = "#0A9828"

[platform]
default_handler = "org.mozilla.firefox"
schemes = ["mailto"]

[[platform.handlers]]
package = "org.mozilla.firefox"
trusted_surface = true

[[platform.handlers]]
package = "com.android.chrome"
trusted_surface = true

[[platform.handlers]]
package = "com.example.bills"
specialized = true

[[platform.cookies]]
domain = "ovoenergy.com"
name = "session"
value = "abc"
"##;

fn settings() -> ProbeSettings {
    match ProbeSettings::from_toml_str(SETTINGS) {
        Ok(settings) => settings,
        Err(error) => panic!("{error}"),
    }
}

fn run_command(command: &Command, settings: &ProbeSettings) -> String {
    let mut out = Vec::new();
    if let Err(error) = execute(command, settings, &mut out) {
        panic!("{error}");
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn settings_with_downloads(dir: &Path) -> ProbeSettings {
    let mut settings = settings();
    settings.platform.download_dirs = vec![dir.to_path_buf()];
    settings
}

#[test]
fn cli_accepts_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "portico-probe",
        "classify",
        "https://example.com/",
        "mailto:a@example.com",
        "--config",
        "host.toml",
        "-v",
    ]);
    let cli = match cli {
        Ok(cli) => cli,
        Err(error) => panic!("{error}"),
    };

    assert!(cli.verbose);
    assert_eq!(cli.config.as_deref(), Some(Path::new("host.toml")));
    assert_eq!(
        cli.command,
        Command::Classify {
            urls: vec![
                "https://example.com/".to_owned(),
                "mailto:a@example.com".to_owned()
            ]
        }
    );
}

#[test]
fn classify_requires_a_url() {
    assert!(Cli::try_parse_from(["portico-probe", "classify"]).is_err());
}

#[test]
fn settings_read_host_and_platform_tables() {
    let settings = settings();
    assert_eq!(settings.host.open_internally, vec!["my.ovoenergy.com".to_owned()]);
    assert_eq!(settings.platform.registry.handlers.len(), 3);
    assert_eq!(settings.platform.cookies.len(), 1);
    assert!(settings.platform.download_dirs.is_empty());
}

#[test]
fn missing_config_file_is_reported() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("{error}"),
    };
    let result = ProbeSettings::load(Some(&dir.path().join("absent.toml")));
    assert_eq!(result.err().map(|error| error.code), Some("config.read_failed"));
    assert_eq!(ProbeSettings::load(None), Ok(ProbeSettings::default()));
}

#[test]
fn classify_reports_each_outcome() {
    let output = run_command(
        &Command::Classify {
            urls: vec![
                "https://my.ovoenergy.com/bills".to_owned(),
                "https://www.ovoenergy.com/help".to_owned(),
                "mailto:help@example.com".to_owned(),
                "tel:+441234567890".to_owned(),
                "not a url".to_owned(),
            ],
        },
        &settings(),
    );

    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "https://my.ovoenergy.com/bills\tin-place");
    // A specialized registration disables the platform default, so the stable channel wins.
    assert_eq!(
        lines[1],
        "https://www.ovoenergy.com/help\ttrusted-surface com.android.chrome"
    );
    assert_eq!(lines[2], "mailto:help@example.com\tplatform-handoff");
    assert_eq!(
        lines[3],
        "tel:+441234567890\thandoff-failed surface.handler_not_found"
    );
    assert!(lines[4].starts_with("not a url\tblocked ("));
}

#[test]
fn resolve_names_rule() {
    let output = run_command(&Command::Resolve, &settings());
    assert_eq!(output, "com.android.chrome\tstable-channel\n");

    let output = run_command(&Command::Resolve, &ProbeSettings::default());
    assert_eq!(output, "none\tunavailable\n");
}

#[test]
fn download_writes_single_placeholder() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("{error}"),
    };
    let settings = settings_with_downloads(dir.path());
    let command = Command::Download {
        url: "https://my.ovoenergy.com/bills/1234".to_owned(),
        mime: "application/pdf".to_owned(),
        user_agent: "PorticoProbe".to_owned(),
        disposition: String::new(),
    };

    let first = run_command(&command, &settings);
    let second = run_command(&command, &settings);
    assert_eq!(first, second);
    assert!(first.trim_end().ends_with("OVO_1234.pdf"));

    let entries = fs::read_dir(dir.path())
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or_default();
    assert_eq!(entries, 1);
}

#[test]
fn download_without_destination_fails() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("{error}"),
    };
    let blocked = dir.path().join("blocked");
    assert!(fs::write(&blocked, b"file, not a directory").is_ok());
    let settings = settings_with_downloads(&blocked);

    let mut out = Vec::new();
    let result = execute(
        &Command::Download {
            url: "https://example.com/a".to_owned(),
            mime: String::new(),
            user_agent: String::new(),
            disposition: String::new(),
        },
        &settings,
        &mut out,
    );
    assert_eq!(
        result.err().map(|error| error.code),
        Some("download.no_destination")
    );
    assert!(out.is_empty());
}
