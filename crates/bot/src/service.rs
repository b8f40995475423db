//! Bot service lifecycle.
//!
//! The service owns the Telegram client and the router, long-polls for
//! updates and hands each interaction to its own task so a slow upload never
//! blocks browsing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::chat::{ChatClient, ChatError};
use crate::config::Config;
use crate::router::BotRouter;
use crate::telegram::{TelegramClient, Update};

/// Initial delay before retrying a failed poll (100ms).
const INITIAL_BACKOFF_MS: u64 = 100;

/// Maximum delay between poll retries (30 seconds).
const MAX_BACKOFF_MS: u64 = 30_000;

/// Backoff multiplier for exponential backoff.
const BACKOFF_MULTIPLIER: u64 = 2;

/// Service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Initial state, not started.
    Stopped,
    /// Checking the token and publishing commands.
    Starting,
    /// Polling for updates.
    Running,
    /// Shutting down gracefully.
    ShuttingDown,
}

/// Something that yields batches of updates.
pub trait UpdateSource: Send + Sync + 'static {
    /// Fetch updates with ids at or above `offset`, waiting for some to arrive.
    fn fetch(&self, offset: i64) -> impl Future<Output = Result<Vec<Update>, ChatError>> + Send;
}

impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: i64) -> Result<Vec<Update>, ChatError> {
        self.get_updates(offset).await
    }
}

/// Exponential backoff between failed polls.
#[derive(Debug)]
struct Backoff {
    current_ms: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            current_ms: INITIAL_BACKOFF_MS,
        }
    }

    /// Delay to wait now; the next one is longer.
    fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_ms);
        self.current_ms = (self.current_ms * BACKOFF_MULTIPLIER).min(MAX_BACKOFF_MS);
        delay
    }

    fn reset(&mut self) {
        self.current_ms = INITIAL_BACKOFF_MS;
    }
}

/// Poll `source` until `shutdown` fires, dispatching each interaction on
/// its own task.
pub async fn run_polling<S, C>(
    source: Arc<S>,
    router: Arc<BotRouter<C>>,
    shutdown: CancellationToken,
) where
    S: UpdateSource,
    C: ChatClient + 'static,
{
    let mut offset = 0i64;
    let mut backoff = Backoff::new();

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Poll loop received shutdown signal");
                break;
            }
            result = source.fetch(offset) => result,
        };

        let delay = match result {
            Ok(updates) => {
                backoff.reset();
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(inbound) = update.into_inbound() else {
                        continue;
                    };

                    debug!(?inbound, "Dispatching interaction");
                    let router = Arc::clone(&router);
                    tokio::spawn(async move {
                        router.handle(inbound).await;
                    });
                }
                continue;
            }
            Err(ChatError::RateLimited(secs)) => {
                warn!(retry_after = secs, "Rate limited while polling");
                Duration::from_secs(secs)
            }
            Err(e) => {
                let delay = backoff.next_delay();
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "Polling failed, retrying");
                delay
            }
        };

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Poll loop received shutdown signal");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// The running bot.
pub struct BotService {
    config: Config,
    client: Arc<TelegramClient>,
    router: Arc<BotRouter<TelegramClient>>,
    state: Arc<RwLock<ServiceState>>,
    shutdown_token: CancellationToken,
    poll_task: Option<JoinHandle<()>>,
}

impl BotService {
    /// Creates the service from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        let client = Arc::new(
            TelegramClient::new(&config.telegram).context("Failed to create Telegram client")?,
        );
        let router = Arc::new(BotRouter::from_config(Arc::clone(&client), &config));

        Ok(Self {
            config,
            client,
            router,
            state: Arc::new(RwLock::new(ServiceState::Stopped)),
            shutdown_token: CancellationToken::new(),
            poll_task: None,
        })
    }

    /// Returns the current state.
    pub async fn state(&self) -> ServiceState {
        *self.state.read().await
    }

    /// Verifies the token, publishes the command menu and starts polling.
    pub async fn start(&mut self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != ServiceState::Stopped {
                anyhow::bail!("Service is already running");
            }
            *state = ServiceState::Starting;
        }

        info!("Starting bot service...");

        let me = match self.client.get_me().await {
            Ok(me) => me,
            Err(e) => {
                *self.state.write().await = ServiceState::Stopped;
                return Err(e).context("Failed to verify bot token");
            }
        };
        info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            id = me.id,
            "Connected to Telegram"
        );

        if let Err(e) = self.client.set_my_commands().await {
            warn!(error = %e, "Failed to publish command menu");
        }

        let client = Arc::clone(&self.client);
        let router = Arc::clone(&self.router);
        let shutdown = self.shutdown_token.clone();
        self.poll_task = Some(tokio::spawn(async move {
            run_polling(client, router, shutdown).await;
        }));

        *self.state.write().await = ServiceState::Running;
        info!(
            poll_timeout_secs = self.config.telegram.poll_timeout_secs,
            "Bot service started"
        );
        Ok(())
    }

    /// Stops polling. Interactions already in flight finish on their own.
    pub async fn stop(&mut self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state == ServiceState::Stopped {
                return Ok(());
            }
            if *state == ServiceState::ShuttingDown {
                anyhow::bail!("Service is already shutting down");
            }
            *state = ServiceState::ShuttingDown;
        }

        info!("Stopping bot service...");
        self.shutdown_token.cancel();

        if let Some(task) = self.poll_task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Poll task ended abnormally");
            }
        }

        *self.state.write().await = ServiceState::Stopped;
        info!("Bot service stopped");
        Ok(())
    }
}
