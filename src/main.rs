use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;

use auto_release::domain::PushEvent;
use auto_release::host::Git2Host;
use auto_release::settings::{self, Settings};
use auto_release::status::ConsoleReporter;
use auto_release::{telemetry, ReleaseEngine};

/// Exit code for a handled event that ended in a reported failure
const EXIT_RELEASE_FAILED: i32 = 1;
/// Exit code when the event could not be handled at all
const EXIT_SETUP_FAILED: i32 = 2;

#[derive(clap::Parser)]
#[command(
    name = "auto-release",
    version,
    about = "Release or propagate a version from [release:<version>] commands in pushed commits"
)]
struct Args {
    #[arg(short, long, help = "Push event payload (JSON), or '-' for stdin")]
    event: String,

    #[arg(short, long, default_value = ".", help = "Path to the git repository")]
    repo: String,

    #[arg(short, long, help = "Custom settings file path")]
    settings: Option<String>,

    #[arg(long, help = "Override the command prefix")]
    prefix: Option<String>,

    #[arg(long, help = "Emit logs as JSON")]
    json_logs: bool,
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_RELEASE_FAILED),
        Err(e) => {
            auto_release::ui::display_error("auto-release", &format!("{:#}", e));
            std::process::exit(EXIT_SETUP_FAILED);
        }
    }
}

/// Handle one event; `Ok(false)` when the release itself failed
fn run(args: Args) -> Result<bool> {
    let mut settings = settings::load_settings(args.settings.as_deref())
        .context("Failed to load settings")?;
    apply_overrides(&mut settings, &args);
    telemetry::init_tracing(&settings.logging);

    let payload = read_payload(&args.event)?;
    let event = PushEvent::from_json(&payload)
        .with_context(|| format!("Failed to decode push event from '{}'", args.event))?;

    let host = Git2Host::open(&args.repo)
        .with_context(|| format!("Failed to open repository at '{}'", args.repo))?
        .with_committer(settings.committer.clone());
    let engine = ReleaseEngine::from_settings(&settings).context("Invalid settings")?;

    let mut reporter = ConsoleReporter;
    let outcome = engine.handle_push(&event, &host, &mut reporter);
    tracing::debug!(?outcome, "push handled");

    Ok(outcome.is_success())
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(prefix) = &args.prefix {
        settings.command_prefix = prefix.clone();
    }
    if args.json_logs {
        settings.logging.json = true;
    }
}

fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("Failed to read push event from stdin")?;
        Ok(payload)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read push event '{}'", source))
    }
}
