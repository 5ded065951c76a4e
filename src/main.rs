use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;

use trainlog::api::HttpTrainingApi;
use trainlog::auth::{resolve_auth, KeychainTokenStore, StaticTokenProvider, DEFAULT_KEYCHAIN_SERVICE};
use trainlog::config::{Config, ENV_TOKEN};
use trainlog::session::ExerciseEdit;
use trainlog::terminal::{render_changes, render_exercises, TerminalUi};
use trainlog::timer::{elapsed_seconds, format_elapsed};
use trainlog::{ActiveSessionView, SubmitOutcome, ViewState};

/// track and finish in-progress training sessions
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// config file (default: <config dir>/trainlog/config.toml)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// base URL of the training API
    #[clap(long, global = true)]
    api_url: Option<String>,

    /// API token (falls back to TRAINLOG_TOKEN, then the keychain)
    #[clap(long, global = true)]
    token: Option<String>,

    /// id of the signed-in user
    #[clap(long, global = true)]
    user_id: Option<i64>,

    /// title to show instead of the session's own
    #[clap(long, global = true)]
    title: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// show planned exercises and elapsed time of a session
    Show { session_id: i64 },

    /// print the elapsed time every second until Ctrl-C
    Watch { session_id: i64 },

    /// submit the session's changes and mark it finished
    Finalize {
        session_id: i64,

        /// change one field, e.g. --set 12:repetitions=15 (repeatable)
        #[clap(long = "set", value_name = "ID:FIELD=VALUE")]
        edits: Vec<ExerciseEdit>,

        /// print the change-set without submitting it
        #[clap(long)]
        dry_run: bool,
    },

    /// store the --token value in the keychain (and --user-id in the config)
    Login,

    /// remove the stored API token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => path,
        None => bail!("No config directory on this platform; pass --config"),
    };
    let mut config = Config::load(&config_path)?.with_env_overrides()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(id) = cli.user_id {
        config.user_id = Some(id);
    }
    trainlog::init_tracing(&config.log_filter);

    let store = KeychainTokenStore::new(DEFAULT_KEYCHAIN_SERVICE);

    match cli.command {
        Command::Login => {
            let Some(api_token) = cli.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
            else {
                bail!("login needs --token");
            };
            store.set(api_token)?;
            if let Some(id) = cli.user_id {
                let mut saved = Config::load(&config_path)?;
                saved.user_id = Some(id);
                saved.save(&config_path)?;
            }
            println!("Token stored");
            Ok(())
        }
        Command::Logout => {
            store.delete()?;
            println!("Token removed");
            Ok(())
        }
        Command::Show { session_id } => {
            let (mut view, _ui) = open_view(&cli, &config, &store, session_id)?;
            ensure_ready(&mut view, session_id).await?;

            println!("{}", view.title());
            let elapsed = view
                .session()
                .and_then(|s| s.started_at)
                .map(|start| format_elapsed(elapsed_seconds(start, Utc::now())))
                .unwrap_or_else(|| format_elapsed(0));
            println!("Elapsed: {}", elapsed);
            print!("{}", render_exercises(view.form().working()));
            Ok(())
        }
        Command::Watch { session_id } => {
            let (mut view, _ui) = open_view(&cli, &config, &store, session_id)?;
            ensure_ready(&mut view, session_id).await?;

            let title = view.title();
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = &mut ctrl_c => break,
                    _ = ticker.tick() => {
                        print!("\r{}  {}", title, view.elapsed_display());
                        let _ = std::io::stdout().flush();
                    }
                }
            }
            println!();
            view.teardown();
            Ok(())
        }
        Command::Finalize {
            session_id,
            ref edits,
            dry_run,
        } => {
            let (mut view, _ui) = open_view(&cli, &config, &store, session_id)?;
            ensure_ready(&mut view, session_id).await?;

            for edit in edits {
                view.apply(edit.clone())?;
            }
            println!("{}", view.title());
            print!("{}", render_changes(&view.form().payload()));
            if dry_run {
                return Ok(());
            }

            match view.submit().await {
                SubmitOutcome::Finished(_) => Ok(()),
                SubmitOutcome::Invalid(err) => Err(err.into()),
                SubmitOutcome::Rejected(err) => Err(err.into()),
                SubmitOutcome::Ignored => bail!("Session {} is not ready to be submitted", session_id),
            }
        }
    }
}

fn open_view(
    cli: &Cli,
    config: &Config,
    store: &KeychainTokenStore,
    session_id: i64,
) -> Result<(ActiveSessionView, Arc<TerminalUi>)> {
    let explicit = cli.token.clone().or_else(|| std::env::var(ENV_TOKEN).ok());
    let stored = if explicit.is_some() {
        None
    } else {
        store.get().unwrap_or_else(|e| {
            warn!("Keychain unavailable: {}", e);
            None
        })
    };
    let auth = resolve_auth(explicit, stored, config.user_id)?;

    let api = HttpTrainingApi::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )
    .with_context(|| format!("Invalid API base URL '{}'", config.api_base_url))?;

    let ui = TerminalUi::new(&config.sessions_route);
    let view = ActiveSessionView::new(
        session_id,
        Arc::new(api),
        Arc::new(StaticTokenProvider::new(Some(auth))),
        ui.context(),
    )
    .with_title(cli.title.clone())
    .with_catalog_page_size(config.catalog_page_size);

    Ok((view, ui))
}

async fn ensure_ready(view: &mut ActiveSessionView, session_id: i64) -> Result<()> {
    if view.load().await != &ViewState::Ready {
        bail!("Session {} could not be opened", session_id);
    }
    Ok(())
}
