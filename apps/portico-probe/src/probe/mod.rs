//! Command-line driver that runs the web content host against a simulated platform.

mod platform;
#[cfg(test)]
mod tests;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use platform::PlatformConfig;
use platform::SimulatedPlatform;
use pt_core::HostError;
use pt_core::HostResult;
use pt_host::HostConfig;
use pt_host::NavigationOutcome;
use pt_host::WebContentHost;
use pt_surface::ApplicationId;
use pt_surface::ExternalSurfaceResolver;
use serde::Deserialize;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "portico-probe",
    version,
    about = "Run Portico's navigation and download handling against a simulated platform"
)]
pub struct Cli {
    /// TOML file with host settings and an optional `[platform]` table.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Classify each URL and perform the resulting handoff.
    Classify {
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },
    /// Print the trusted-surface application and the rule that picked it.
    Resolve,
    /// Enqueue a download as the engine would report it.
    Download {
        url: String,
        #[arg(long, default_value = "")]
        mime: String,
        #[arg(long, default_value = "")]
        user_agent: String,
        #[arg(long, default_value = "")]
        disposition: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct PlatformSection {
    #[serde(default)]
    platform: PlatformConfig,
}

/// Host settings plus the simulated platform, both read from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSettings {
    pub host: HostConfig,
    pub platform: PlatformConfig,
}

impl ProbeSettings {
    pub fn load(path: Option<&Path>) -> HostResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let body = fs::read_to_string(path).map_err(|error| {
            HostError::new(
                "config.read_failed",
                format!("failed to read {}: {error}", path.display()),
            )
        })?;
        Self::from_toml_str(&body)
    }

    pub fn from_toml_str(body: &str) -> HostResult<Self> {
        let host = HostConfig::from_toml_str(body)?;
        let section: PlatformSection = toml::from_str(body).map_err(|error| {
            HostError::new(
                "config.parse_failed",
                format!("failed to parse [platform]: {error}"),
            )
        })?;

        Ok(Self {
            host,
            platform: section.platform,
        })
    }
}

pub fn run(cli: &Cli) -> HostResult<()> {
    let settings = ProbeSettings::load(cli.config.as_deref())?;
    let stdout = io::stdout();
    execute(&cli.command, &settings, &mut stdout.lock())
}

fn execute(command: &Command, settings: &ProbeSettings, out: &mut dyn Write) -> HostResult<()> {
    let platform = SimulatedPlatform::new(settings.platform.clone());

    match command {
        Command::Classify { urls } => {
            let host = WebContentHost::with_config(platform.services(), &settings.host)?;
            for url in urls {
                let outcome = host.intercept(url);
                write_line(out, &format!("{url}\t{}", describe(&outcome)))?;
            }
        }
        Command::Resolve => {
            let selection = ExternalSurfaceResolver::new(platform.registry()).select();
            let application = selection.application().map_or("none", ApplicationId::as_str);
            write_line(out, &format!("{application}\t{}", selection.rule()))?;
        }
        Command::Download {
            url,
            mime,
            user_agent,
            disposition,
        } => {
            let host = WebContentHost::with_config(platform.services(), &settings.host)?;
            let job = host
                .on_download_requested(url, user_agent, disposition, mime)
                .map_err(HostError::from)?;
            write_line(out, &job.destination().display().to_string())?;
        }
    }

    Ok(())
}

fn describe(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::InPlace => "in-place".to_owned(),
        NavigationOutcome::TrustedSurface { application } => {
            format!("trusted-surface {application}")
        }
        NavigationOutcome::PlatformHandoff => "platform-handoff".to_owned(),
        NavigationOutcome::HandoffFailed { error } => format!("handoff-failed {}", error.code()),
        NavigationOutcome::Blocked { reason } => format!("blocked ({reason})"),
    }
}

fn write_line(out: &mut dyn Write, line: &str) -> HostResult<()> {
    writeln!(out, "{line}")
        .map_err(|error| HostError::new("probe.output_failed", error.to_string()))
}
