use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use category_banner::banner::{
    AffordanceKind, AffordanceStatus, BannerController, BannerEvent, BannerRuntime,
};
use category_banner::config::Config;
use category_banner::discourse::{Credentials, DiscourseClient};
use category_banner::ports::{ContextProvider, SubscriptionTransport};
use category_banner::ui::{self, banner_lines, describe_state, Page, TerminalRenderer};

/// Upper bound on waiting for background work in `--once` mode.
const ONCE_TIMEOUT: Duration = Duration::from_secs(90);

/// Get the config directory path (~/.config/category-banner/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("category-banner"))
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ActivateArg {
    Subscribe,
    Watch,
}

impl From<ActivateArg> for AffordanceKind {
    fn from(arg: ActivateArg) -> Self {
        match arg {
            ActivateArg::Subscribe => AffordanceKind::Subscribe,
            ActivateArg::Watch => AffordanceKind::WatchAll,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "category-banner",
    about = "Offer one-click category subscriptions on Discourse topic pages"
)]
struct Args {
    /// Topic URLs or paths (e.g. /t/welcome/42)
    #[arg(required = true, value_name = "TOPIC")]
    topics: Vec<String>,

    /// Config file (default: ~/.config/category-banner/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Evaluate the first topic, print the banner and exit
    #[arg(long)]
    once: bool,

    /// With --once, click an affordance and print the outcome
    #[arg(long, value_enum, requires = "once")]
    activate: Option<ActivateArg>,

    /// Write logs to FILE (RUST_LOG controls the level)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>, once: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        // Logs on stderr would corrupt the full-screen page.
        None if !once => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

fn credentials(config: &Config) -> Option<Credentials> {
    match (config.discourse.api_username.clone(), config.api_key()) {
        (Some(username), Some(api_key)) => Some(Credentials { username, api_key }),
        (None, None) => None,
        (Some(_), None) => {
            tracing::warn!("discourse.api_username set without an API key, browsing anonymously");
            None
        }
        (None, Some(_)) => {
            tracing::warn!("API key set without discourse.api_username, browsing anonymously");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.once)?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    if config.programs.is_empty() {
        tracing::warn!("No categories configured under [programs]; no banner will be shown");
    }

    let base_url = config
        .discourse
        .base_url
        .as_deref()
        .context("discourse.base_url is not set in the config file")?;
    let client = Arc::new(
        DiscourseClient::new(base_url, credentials(&config))
            .context("Failed to create forum client")?,
    );

    let (event_tx, mut event_rx) = mpsc::channel::<BannerEvent>(32);
    let controller = BannerController::new(config.program_config(), TerminalRenderer::new())
        .with_dismiss_after(config.dismiss_after());
    let provider: Arc<dyn ContextProvider> = client.clone();
    let transport: Arc<dyn SubscriptionTransport> = client;
    let mut runtime = BannerRuntime::new(controller, provider, transport, event_tx)
        .with_evaluation_delay(config.evaluation_delay());

    runtime
        .load_session()
        .await
        .context("Failed to load forum session")?;

    if args.once {
        let first = args.topics.first().cloned().unwrap_or_default();
        return run_once(&mut runtime, &mut event_rx, &first, args.activate.map(Into::into)).await;
    }

    let mut page = Page::new(args.topics);
    ui::run(&mut runtime, &mut page, event_rx).await?;
    Ok(())
}

/// Feed banner events back into the runtime until `done` holds.
async fn pump(
    runtime: &mut BannerRuntime<TerminalRenderer>,
    event_rx: &mut mpsc::Receiver<BannerEvent>,
    done: impl Fn(&BannerRuntime<TerminalRenderer>) -> bool,
) -> Result<()> {
    while !done(runtime) {
        let event = tokio::time::timeout(ONCE_TIMEOUT, event_rx.recv())
            .await
            .context("Timed out waiting for the forum")?
            .context("Banner event channel closed")?;
        runtime.handle_event(event);
    }
    Ok(())
}

fn print_banner(runtime: &BannerRuntime<TerminalRenderer>) {
    match runtime.controller().renderer().container() {
        Some(banner) => {
            for line in banner_lines(banner) {
                println!("{}", line);
            }
        }
        None => println!("{}", describe_state(runtime.state())),
    }
}

async fn run_once(
    runtime: &mut BannerRuntime<TerminalRenderer>,
    event_rx: &mut mpsc::Receiver<BannerEvent>,
    url: &str,
    activate: Option<AffordanceKind>,
) -> Result<()> {
    runtime.page_changed(url);
    pump(runtime, event_rx, |rt| rt.is_settled()).await?;
    print_banner(runtime);

    let Some(kind) = activate else {
        return Ok(());
    };
    if !runtime.activate(kind) {
        anyhow::bail!("\"{}\" is not offered on this page", kind.button());
    }
    pump(runtime, event_rx, |rt| {
        !rt.state()
            .banner()
            .and_then(|b| b.affordance(kind))
            .is_some_and(|a| a.status == AffordanceStatus::Pending)
    })
    .await?;
    println!();
    print_banner(runtime);
    Ok(())
}
