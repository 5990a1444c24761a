//! Entry point for the perftop TUI. Parses args, resolves settings and runs the App.

use std::env;

use perftop::app::App;
use perftop::cli::parse_args;
use perftop::client::MetricsClient;
use perftop::config::{load_profiles, persist_change, resolve, EnvOverrides, ProfileChange};
use perftop::logging;
use perftop::sync::SyncController;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let mut profiles = load_profiles();
    let resolved = resolve(&args, &profiles, &EnvOverrides::from_env())?;
    if let Err(e) = persist_change(&mut profiles, &resolved.change) {
        eprintln!("warning: could not save profile: {e}");
    }
    if let ProfileChange::NotSaved(name) = &resolved.change {
        eprintln!("Profile '{name}' differs from the arguments; pass --save to overwrite it.");
    }
    let settings = resolved.settings;

    if args.dry_run {
        println!("base_url={}", settings.base_url);
        println!("timeout_secs={}", settings.timeout.as_secs());
        println!("window_hours={}", settings.window_hours);
        println!("refresh_secs={}", settings.refresh_period.as_secs());
        println!("auto_refresh={}", settings.auto_refresh);
        return Ok(());
    }

    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {e:#}");
    }
    info!(base_url = %settings.base_url, "starting dashboard");

    let client = MetricsClient::new(&settings.base_url, settings.timeout)?;
    let controller = SyncController::new(client, settings.sync_options());
    let mut app = App::new(controller, &settings);
    let res = app.run().await;
    if let Err(e) = &res {
        warn!(error = %e, "dashboard exited with error");
    }
    res
}
