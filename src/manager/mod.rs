//! Schema lifecycle management
//!
//! The `SchemaManager` owns the current [`Schema`] snapshot, drives the
//! fetch-and-replace cycle against the four upstream sources, and keeps the
//! snapshot fresh on a fixed schedule. Lifecycle notifications go out as a
//! tagged union over a broadcast channel.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, SchemaError};
use crate::fetch::{SchemaFetcher, SteamFetcher};
use crate::schema::{RawSchema, Schema, SchemaItem, SchemaSection, SchemaSnapshot};

/// Refresh period used when none is configured.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Configuration for a [`SchemaManager`].
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Steam Web API key. Required for refreshing; a manager seeded with an
    /// externally stored snapshot can serve lookups without one.
    pub api_key: Option<String>,

    /// How often to refresh the schema. `None` disables scheduling
    /// entirely; only explicit `refresh()` calls touch the snapshot then.
    pub update_interval: Option<Duration>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            update_interval: Some(DEFAULT_UPDATE_INTERVAL),
        }
    }
}

/// Lifecycle notifications emitted by a [`SchemaManager`].
#[derive(Debug, Clone)]
pub enum SchemaEvent {
    /// First successful initialization completed.
    Ready,

    /// A refresh (scheduled or manual) or a flagged seed installed a new
    /// snapshot.
    Updated(Arc<Schema>),

    /// A scheduled refresh failed; the scheduler keeps running.
    RefreshFailed(Arc<SchemaError>),
}

struct ManagerInner {
    api_key: Option<String>,
    fetcher: Box<dyn SchemaFetcher>,
    schema: RwLock<Option<Arc<Schema>>>,
    events: broadcast::Sender<SchemaEvent>,
    /// One refresh logically in flight at a time: manual callers wait
    /// their turn, scheduled ticks skip when the gate is held.
    refresh_gate: tokio::sync::Mutex<()>,
}

/// Owns the current schema snapshot and keeps it fresh.
pub struct SchemaManager {
    inner: Arc<ManagerInner>,
    update_interval: Option<Duration>,
    ready: bool,
    updater: Option<JoinHandle<()>>,
}

impl SchemaManager {
    /// Creates a manager backed by the default Steam Web API fetcher.
    pub fn new(options: ManagerOptions) -> Result<Self> {
        let fetcher = SteamFetcher::new()?;
        Ok(Self::with_fetcher(options, Box::new(fetcher)))
    }

    /// Creates a manager with a custom fetch collaborator.
    pub fn with_fetcher(options: ManagerOptions, fetcher: Box<dyn SchemaFetcher>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(ManagerInner {
                api_key: options.api_key,
                fetcher,
                schema: RwLock::new(None),
                events,
                refresh_gate: tokio::sync::Mutex::new(()),
            }),
            update_interval: options.update_interval,
            ready: false,
            updater: None,
        }
    }

    /// Subscribes to lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SchemaEvent> {
        self.inner.events.subscribe()
    }

    /// The current snapshot, if one has been installed.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.inner.current_schema()
    }

    /// Whether initialization has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Initializes the manager. A no-op once ready.
    ///
    /// If a snapshot is already present (seeded) and is not yet due for a
    /// refresh, the mandatory fetch is skipped and the scheduler is armed
    /// directly; otherwise a refresh runs to completion first, and any
    /// error aborts initialization.
    pub async fn init(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }

        // A disabled interval also lands here: nothing is ever "due".
        let seeded_and_fresh =
            self.inner.current_schema().is_some() && self.update_wait() != Some(Duration::ZERO);

        if !seeded_and_fresh {
            self.inner.refresh(true).await?;
        }

        self.start_updater();
        self.ready = true;
        let _ = self.inner.events.send(SchemaEvent::Ready);

        Ok(())
    }

    /// Fetches the four upstream sources and installs a new snapshot.
    ///
    /// Errors are returned to the caller directly; an `Updated` event is
    /// emitted on success. Waits for any in-flight refresh to finish first.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.refresh(true).await
    }

    /// Installs an externally produced snapshot.
    ///
    /// Post-bootstrap (a snapshot already present, or `from_update` set),
    /// the candidate must carry a semver version whose major matches this
    /// crate's, or it is silently discarded. Returns whether the snapshot
    /// was installed. With `from_update` set, an install emits `Updated`.
    pub fn set_schema(&self, snapshot: SchemaSnapshot, from_update: bool) -> bool {
        self.inner
            .install(Schema::from_snapshot(snapshot), from_update)
            .is_some()
    }

    /// Cancels the scheduler. Lookups and manual refreshes keep working.
    pub fn stop(&mut self) {
        if let Some(updater) = self.updater.take() {
            updater.abort();
        }
    }

    /// Time until the current snapshot is due for a refresh, floored at
    /// zero. `None` when scheduling is disabled; zero when no snapshot is
    /// installed yet.
    fn update_wait(&self) -> Option<Duration> {
        let interval = self.update_interval?;
        let Some(schema) = self.inner.current_schema() else {
            return Some(Duration::ZERO);
        };

        let age = Utc::now()
            .signed_duration_since(schema.time())
            .to_std()
            .unwrap_or_default();
        Some(interval.saturating_sub(age))
    }

    /// Arms the scheduler: one-shot sleep until the snapshot is due, then a
    /// fixed-period loop. Any previously armed task is canceled first so
    /// re-initialization never stacks refresh loops.
    fn start_updater(&mut self) {
        self.stop();

        let Some(interval) = self.update_interval else {
            debug!("schema updates disabled; scheduler not armed");
            return;
        };
        let wait = self.update_wait().unwrap_or(Duration::ZERO);

        let inner = Arc::clone(&self.inner);
        self.updater = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            inner.scheduled_refresh().await;

            let mut ticker = tokio::time::interval(interval);
            // The first tick of a fresh interval completes immediately;
            // consume it so the next one lands a full period out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                inner.scheduled_refresh().await;
            }
        }));
    }
}

impl Drop for SchemaManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ManagerInner {
    fn current_schema(&self) -> Option<Arc<Schema>> {
        self.schema
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Fetches the four sources concurrently and installs the result.
    /// Fail-fast: a single failing fetch aborts the attempt without
    /// touching the current snapshot.
    async fn refresh(&self, from_update: bool) -> Result<()> {
        let _guard = self.refresh_gate.lock().await;
        self.refresh_locked(from_update).await
    }

    /// Scheduled-tick entry point: skips when a refresh is already in
    /// flight, reports failures as events, never panics the timer task.
    async fn scheduled_refresh(&self) {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            debug!("schema refresh already in flight; skipping scheduled tick");
            return;
        };

        if let Err(err) = self.refresh_locked(true).await {
            warn!("scheduled schema refresh failed: {err}");
            let _ = self.events.send(SchemaEvent::RefreshFailed(Arc::new(err)));
        }
    }

    async fn refresh_locked(&self, from_update: bool) -> Result<()> {
        let api_key = self.api_key.as_deref().ok_or(SchemaError::MissingApiKey)?;

        let (overview, items, paintkits, items_game) = tokio::try_join!(
            self.fetcher.fetch_overview(api_key),
            self.fetch_all_items(api_key),
            self.fetcher.fetch_paintkits(),
            self.fetcher.fetch_items_game(),
        )?;

        let raw = RawSchema {
            schema: SchemaSection {
                overview,
                items,
                paintkits,
            },
            items_game,
        };

        info!(
            "Fetched schema: {} items, {} attributes, {} paintkits",
            raw.schema.items.len(),
            raw.schema.overview.attributes.len(),
            raw.schema.paintkits.len()
        );

        self.install(Schema::new(raw), from_update);
        Ok(())
    }

    /// Follows the `next` cursor until the source stops returning one,
    /// concatenating pages in order. Duplicate defindexes across pages are
    /// the source's responsibility and are kept as-is.
    async fn fetch_all_items(&self, api_key: &str) -> Result<Vec<SchemaItem>> {
        let mut items = Vec::new();
        let mut cursor = Some(0);

        while let Some(start) = cursor {
            let page = self.fetcher.fetch_items_page(api_key, start).await?;
            items.extend(page.items);
            cursor = page.next;
        }

        Ok(items)
    }

    /// Atomically replaces the current snapshot, subject to the version
    /// gate. Returns the installed schema, or `None` on a silent discard.
    fn install(&self, schema: Schema, from_update: bool) -> Option<Arc<Schema>> {
        let mut slot = self
            .schema
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // The gate applies once a snapshot exists or the candidate comes
        // from an update; only the very first manual seed bypasses it.
        if slot.is_some() || from_update {
            let compatible = schema
                .version()
                .and_then(|version| semver::Version::parse(version).ok())
                .is_some_and(|version| version.major == own_major());
            if !compatible {
                debug!(
                    "Discarding schema snapshot with incompatible version {:?}",
                    schema.version()
                );
                return None;
            }
        }

        let schema = Arc::new(schema);
        *slot = Some(Arc::clone(&schema));
        drop(slot);

        if from_update {
            let _ = self.events.send(SchemaEvent::Updated(Arc::clone(&schema)));
        }

        Some(schema)
    }
}

fn own_major() -> u64 {
    semver::Version::parse(env!("CARGO_PKG_VERSION"))
        .map(|version| version.major)
        .unwrap_or(0)
}
