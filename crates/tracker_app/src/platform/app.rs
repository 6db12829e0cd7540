use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval_at, Instant};
use tracker_core::{update, AppState, ItemId, Msg};
use tracker_engine::{
    select_backend, recompute_badge, BackgroundMessage, BadgeTrigger, ItemStore, Poller,
    ReqwestTrackingClient, StoreEvent, TrackingClient,
};
use tracker_logging::{level_from_name, tracker_info, tracker_warn};
use uuid::Uuid;

use super::cli::{self, CliAction, Command};
use super::config::AppConfig;
use super::effects::{now_ms, EffectRunner};
use super::logging;
use super::render::{self, ConsoleBadge};

/// How often `watch` redraws so relative times stay current.
const REDRAW_PERIOD: Duration = Duration::from_secs(60);

pub fn run_app() -> Result<()> {
    let cli = match cli::parse_cli_flags(std::env::args().skip(1))? {
        CliAction::Help => {
            cli::print_cli_help();
            return Ok(());
        }
        CliAction::Run(cli) => cli,
    };

    let config = AppConfig::load(cli.config_path.as_deref())?;
    logging::initialize(config.log_destination, level_from_name(&config.log_level));
    tracker_info!(
        "parcel-tracker {:?}, backend {}",
        cli.command,
        config.backend_base_url
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run_command(config, cli.command))
}

async fn run_command(config: AppConfig, command: Command) -> Result<()> {
    let backend = select_backend(config.data_dir.as_deref(), &config.local_store_path);
    let store = Arc::new(ItemStore::new(backend, config.storage_key()?));
    tracker_info!("Item store: {}", store.describe());

    let client =
        ReqwestTrackingClient::new(config.client_settings()).context("failed to build HTTP client")?;
    let mut shell = Shell::new(store.clone(), Arc::new(client));

    match command {
        Command::List => {}
        Command::Add { code, label } => {
            shell.dispatch(Msg::CodeInputChanged(code));
            shell.dispatch(Msg::LabelInputChanged(label.unwrap_or_default()));
            shell.submit();
        }
        Command::Edit { id, code, label } => {
            shell.require(&id)?;
            shell.dispatch(Msg::EditStarted(id));
            if let Some(code) = code {
                shell.dispatch(Msg::CodeInputChanged(code));
            }
            if let Some(label) = label {
                shell.dispatch(Msg::LabelInputChanged(label));
            }
            shell.submit();
        }
        Command::Delete { id } => {
            shell.require(&id)?;
            shell.dispatch(Msg::DeleteClicked(id));
        }
        Command::Refresh { id: Some(id) } => {
            shell.require(&id)?;
            shell.dispatch(Msg::RefreshItemClicked(id));
        }
        Command::Refresh { id: None } => shell.refresh_all(),
        Command::Badge => {
            recompute_badge(&store, &ConsoleBadge, BadgeTrigger::Startup);
            return Ok(());
        }
        Command::Watch => {
            let poller = Poller::new(store, Arc::new(ConsoleBadge), config.poll_period())
                .with_change_check(config.change_check_period());
            return watch(shell, poller).await;
        }
    }

    shell.settle().await;
    shell.print();
    shell.ensure_saved()
}

async fn watch(mut shell: Shell, poller: Poller) -> Result<()> {
    let period = poller.period();
    let mut store_events = shell.store.subscribe();
    let mut signals = poller.subscribe();
    let poller_task = poller.spawn();

    let mut redraw = interval_at(Instant::now() + REDRAW_PERIOD, REDRAW_PERIOD);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    shell.print();
    println!(
        "Refreshing every {} minute(s). Press Ctrl-C to stop.",
        period.as_secs() / 60
    );

    loop {
        tokio::select! {
            Some(msg) = shell.runner.next_msg(), if !shell.runner.is_idle() => shell.receive(msg),
            signal = signals.recv() => match signal {
                Ok(BackgroundMessage::RefreshAll) => {
                    tracker_info!("REFRESH_ALL received");
                    shell.refresh_all();
                }
                Err(RecvError::Lagged(missed)) => {
                    tracker_warn!("Missed {} refresh signal(s)", missed);
                }
                Err(RecvError::Closed) => break,
            },
            event = store_events.recv() => match event {
                Ok(StoreEvent::ExternalChange) | Err(RecvError::Lagged(_)) => shell.reload(),
                Ok(StoreEvent::Changed) => {}
                Err(RecvError::Closed) => break,
            },
            _ = redraw.tick() => shell.dispatch(Msg::Tick),
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    tracker_warn!("Ctrl-C handler failed: {}", err);
                }
                break;
            }
        }

        if shell.state.consume_dirty() {
            shell.print();
        }
    }

    poller_task.abort();
    tracker_info!("watch stopped");
    Ok(())
}

/// Owns the state machine and feeds effect results back into it.
struct Shell {
    state: AppState,
    store: Arc<ItemStore>,
    runner: EffectRunner,
}

impl Shell {
    fn new(store: Arc<ItemStore>, client: Arc<dyn TrackingClient>) -> Self {
        let mut shell = Self {
            state: AppState::new(),
            runner: EffectRunner::new(store.clone(), client),
            store,
        };
        shell.reload();
        shell
    }

    fn reload(&mut self) {
        let items = self.store.load_tracked();
        self.dispatch(Msg::ItemsLoaded(items));
    }

    /// Reloads when the persisted list moved on since this process last
    /// saw it, so the next write does not drop another process's changes.
    fn sync_external(&mut self) {
        match self.store.check_external() {
            Ok(true) => self.reload(),
            Ok(false) => {}
            Err(err) => tracker_warn!("Could not check {} for changes: {}", self.store.describe(), err),
        }
    }

    /// Lookup results are applied to the current persisted list.
    fn receive(&mut self, msg: Msg) {
        if matches!(msg, Msg::SingleFetched { .. } | Msg::BulkFetched { .. }) {
            self.sync_external();
        }
        self.dispatch(msg);
    }

    fn refresh_all(&mut self) {
        self.sync_external();
        self.dispatch(Msg::RefreshAllRequested);
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn submit(&mut self) {
        self.dispatch(Msg::FormSubmitted {
            new_id: ItemId::new(Uuid::new_v4().to_string()),
            now_ms: now_ms(),
        });
    }

    /// Runs until no effect is in flight.
    async fn settle(&mut self) {
        while let Some(msg) = self.runner.next_msg().await {
            self.receive(msg);
        }
    }

    fn ensure_saved(&self) -> Result<()> {
        match self.state.view().persist_error {
            Some(err) => bail!("changes were not saved: {err}"),
            None => Ok(()),
        }
    }

    fn require(&self, id: &ItemId) -> Result<()> {
        if self.state.item(id).is_none() {
            bail!("No tracked item with id '{id}'. Run `parcel-tracker list` to see ids.");
        }
        Ok(())
    }

    fn print(&mut self) {
        self.state.consume_dirty();
        print!("{}", render::render_list(&self.state.view(), now_ms()));
    }
}
