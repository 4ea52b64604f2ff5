//! Aggregating list loader.
//!
//! A load cycle for one [`ListSource`] runs in three stages:
//!
//! ```text
//! probe {base}/_list.json ──ok──► GET {base}/_list.json ──array──► clear slot
//!        │                              │                             │
//!   on_failure(code)            on_failure(code | 400)     GET {base}/{name}.json × N
//!                                                                     │
//!                                                     JoinContext (last completion)
//!                                                                     │
//!                                                   sort ► publish ► on_success()
//! ```
//!
//! Only the probe and the manifest can fail a load. A level document that
//! fails to download or lacks `id`/`name` is dropped from the list and the
//! load still succeeds. Exactly one of `on_success` / `on_failure` runs per
//! load, unless a newer load of the same source supersedes it, in which case
//! neither runs.
//!
//! # Example
//!
//! ```ignore
//! let handle = loader.load_tsl(
//!     || println!("TSL ready"),
//!     |code| eprintln!("TSL failed with {}", code),
//! );
//! ```

mod join;
mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cache::ListCache;
use crate::config::DemonlistConfig;
use crate::error::{LoadError, LoadResult, NO_RESPONSE_CODE};
use crate::http::{HttpClient, HttpRequest};
use crate::probe::{probe, ProbeMode};
use crate::types::{ListItem, ListSource};

use join::JoinContext;
use registry::TaskRegistry;

/// Manifest file name under a list's base URL.
pub const MANIFEST_FILE: &str = "_list.json";

/// URL of the manifest for `base_url`.
pub fn manifest_url(base_url: &str) -> String {
    format!("{}/{}", base_url, MANIFEST_FILE)
}

/// URL of the detail document for the level called `name`.
///
/// The name is percent-encoded as a single path segment, so `/`, `?` and `#`
/// stay part of the file name.
pub fn entry_url(base_url: &str, name: &str) -> String {
    format!("{}/{}.json", base_url, urlencoding::encode(name))
}

/// The fields a level document must carry. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct EntryDocument {
    id: i64,
    name: String,
}

/// Handle to a load cycle started by [`DemonlistLoader`].
///
/// Dropping the handle does not cancel the load.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    source: ListSource,
    registry: Arc<TaskRegistry>,
}

impl LoadHandle {
    /// The source this load publishes into.
    pub fn source(&self) -> ListSource {
        self.source
    }

    /// Returns true once a newer load of the same source superseded this one.
    pub fn is_abandoned(&self) -> bool {
        self.registry.is_abandoned()
    }

    /// Returns true once this load has stopped running, either after calling
    /// a callback or after noticing it was superseded.
    pub fn is_finished(&self) -> bool {
        self.registry.is_finished()
    }

    /// Number of request tasks spawned so far, including finished ones.
    pub fn spawned_tasks(&self) -> usize {
        self.registry.spawned()
    }
}

/// Registries of the loads that have not reported yet, one per source.
type InFlight = Arc<Mutex<HashMap<ListSource, Arc<TaskRegistry>>>>;

/// Loads demonlists into a shared [`ListCache`].
pub struct DemonlistLoader {
    client: Arc<dyn HttpClient>,
    cache: Arc<ListCache>,
    config: DemonlistConfig,
    runtime: Handle,
    in_flight: InFlight,
}

impl DemonlistLoader {
    /// Creates a loader driven by the current Tokio runtime.
    pub fn new(
        client: Arc<dyn HttpClient>,
        cache: Arc<ListCache>,
        config: DemonlistConfig,
    ) -> LoadResult<Self> {
        let runtime = Handle::try_current().map_err(|_| LoadError::NoRuntime)?;
        Ok(Self::with_runtime(client, cache, config, runtime))
    }

    /// Creates a loader that spawns its requests on `runtime`.
    pub fn with_runtime(
        client: Arc<dyn HttpClient>,
        cache: Arc<ListCache>,
        config: DemonlistConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            client,
            cache,
            config,
            runtime,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The cache this loader publishes into.
    pub fn cache(&self) -> &Arc<ListCache> {
        &self.cache
    }

    pub fn config(&self) -> &DemonlistConfig {
        &self.config
    }

    /// Loads the TSL list from its configured host.
    pub fn load_tsl<S, F>(&self, on_success: S, on_failure: F) -> LoadHandle
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(u16) + Send + 'static,
    {
        self.load(ListSource::Tsl, on_success, on_failure)
    }

    /// Loads the TSL+ list from its configured host.
    pub fn load_tsl_plus<S, F>(&self, on_success: S, on_failure: F) -> LoadHandle
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(u16) + Send + 'static,
    {
        self.load(ListSource::TslPlus, on_success, on_failure)
    }

    /// Loads `source` from its configured host.
    pub fn load<S, F>(&self, source: ListSource, on_success: S, on_failure: F) -> LoadHandle
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(u16) + Send + 'static,
    {
        let base_url = self.config.base_url(source).to_string();
        self.load_from(base_url, source, on_success, on_failure)
    }

    /// Loads the list hosted at `base_url` into the slot for `source`.
    ///
    /// Returns immediately; the callbacks run later on a runtime worker.
    /// `on_failure` receives the failing HTTP status, 400 for a manifest that
    /// is not a JSON array, or 0 when no response arrived.
    pub fn load_from<S, F>(
        &self,
        base_url: impl Into<String>,
        source: ListSource,
        on_success: S,
        on_failure: F,
    ) -> LoadHandle
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(u16) + Send + 'static,
    {
        self.spawn_load(base_url.into(), source, on_success, move |error: LoadError| {
            on_failure(error.code())
        })
    }

    /// Loads `source` and waits for the outcome.
    pub async fn load_async(&self, source: ListSource) -> LoadResult<()> {
        let (tx, rx) = oneshot::channel::<LoadResult<()>>();
        let on_success_tx = Arc::new(Mutex::new(Some(tx)));
        let on_failure_tx = Arc::clone(&on_success_tx);

        let base_url = self.config.base_url(source).to_string();
        self.spawn_load(
            base_url,
            source,
            move || {
                if let Some(tx) = on_success_tx.lock().take() {
                    let _ = tx.send(Ok(()));
                }
            },
            move |error| {
                if let Some(tx) = on_failure_tx.lock().take() {
                    let _ = tx.send(Err(error));
                }
            },
        );

        // Both senders are dropped without sending only when superseded.
        rx.await
            .unwrap_or(Err(LoadError::Abandoned { list: source }))
    }

    fn spawn_load<S, F>(
        &self,
        base_url: String,
        source: ListSource,
        on_success: S,
        on_failure: F,
    ) -> LoadHandle
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(LoadError) + Send + 'static,
    {
        let registry = Arc::new(TaskRegistry::new());
        let previous = self
            .in_flight
            .lock()
            .insert(source, Arc::clone(&registry));
        if let Some(previous) = previous {
            if !previous.is_abandoned() {
                let aborted = previous.abandon();
                debug!(source = %source, aborted, "superseding previous load");
            }
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(source = %source, base_url = %base_url, "loading list");

        let run = LoadRun {
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            registry: Arc::clone(&registry),
            in_flight: Arc::clone(&self.in_flight),
            base_url,
            source,
            probe_mode: self.config.probe_mode,
        };
        let task = self.runtime.spawn(run.execute(on_success, on_failure));
        registry.register(task.abort_handle());

        LoadHandle { source, registry }
    }
}

/// Everything one load cycle needs, moved into its top-level task.
struct LoadRun {
    client: Arc<dyn HttpClient>,
    cache: Arc<ListCache>,
    registry: Arc<TaskRegistry>,
    in_flight: InFlight,
    base_url: String,
    source: ListSource,
    probe_mode: ProbeMode,
}

/// Releases the task handles of a load that has reported, and forgets it
/// unless a newer load already took its place.
fn retire(in_flight: &InFlight, source: ListSource, registry: &Arc<TaskRegistry>) {
    registry.release();
    let mut loads = in_flight.lock();
    if loads
        .get(&source)
        .is_some_and(|current| Arc::ptr_eq(current, registry))
    {
        loads.remove(&source);
    }
}

impl LoadRun {
    async fn execute<S, F>(self, on_success: S, on_failure: F)
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(LoadError) + Send + 'static,
    {
        let list_url = manifest_url(&self.base_url);

        let outcome = probe(self.client.as_ref(), &list_url, self.probe_mode).await;
        if !outcome.ok {
            return self.fail(
                on_failure,
                LoadError::ProbeFailed {
                    url: list_url,
                    code: outcome.code,
                },
            );
        }

        let entries = match self.fetch_manifest(&list_url).await {
            Ok(entries) => entries,
            Err(e) => return self.fail(on_failure, e),
        };

        if self.registry.is_abandoned() {
            return self.retire();
        }
        self.cache.begin_reload(self.source);

        if entries.is_empty() {
            self.cache.publish(self.source, Vec::new());
            info!(source = %self.source, "manifest has no entries, list is empty");
            self.retire();
            on_success();
            return;
        }

        let requested = entries.len();
        debug!(source = %self.source, requested, "fetching level documents");

        let context = {
            let cache = Arc::clone(&self.cache);
            let registry = Arc::clone(&self.registry);
            let in_flight = Arc::clone(&self.in_flight);
            let source = self.source;
            JoinContext::new(requested, move |items: Vec<ListItem>| {
                retire(&in_flight, source, &registry);
                if registry.is_abandoned() {
                    debug!(source = %source, "discarding results of superseded load");
                    return;
                }
                info!(
                    source = %source,
                    items = items.len(),
                    dropped = requested - items.len(),
                    "list published"
                );
                cache.publish(source, items);
                on_success();
            })
        };

        for (index, name) in entries {
            let client = Arc::clone(&self.client);
            let context = Arc::clone(&context);
            let url = entry_url(&self.base_url, &name);
            let task = tokio::spawn(async move {
                let item = fetch_entry(client.as_ref(), &url, index).await;
                if !context.complete(item) {
                    debug!(url = %url, remaining = context.remaining(), "level document done");
                }
            });
            self.registry.register(task.abort_handle());
        }
    }

    async fn fetch_manifest(&self, url: &str) -> LoadResult<Vec<(usize, String)>> {
        let response = self
            .client
            .send(HttpRequest::get(url))
            .await
            .map_err(|e| {
                debug!(url, error = %e, "manifest request failed without a response");
                LoadError::ManifestFailed {
                    url: url.to_string(),
                    code: NO_RESPONSE_CODE,
                }
            })?;

        if !response.is_success() {
            return Err(LoadError::ManifestFailed {
                url: url.to_string(),
                code: response.status,
            });
        }

        parse_manifest(&response.body).map_err(|reason| LoadError::MalformedManifest {
            url: url.to_string(),
            reason,
        })
    }

    fn retire(&self) {
        retire(&self.in_flight, self.source, &self.registry);
    }

    fn fail<F>(&self, on_failure: F, error: LoadError)
    where
        F: FnOnce(LoadError),
    {
        self.retire();
        if self.registry.is_abandoned() {
            return;
        }
        warn!(source = %self.source, code = error.code(), error = %error, "list load failed");
        on_failure(error);
    }
}

/// Extracts `(index, name)` for every string element of a manifest array.
///
/// Non-string elements are skipped but still occupy their index, so the
/// positions of later entries are unaffected.
fn parse_manifest(body: &[u8]) -> Result<Vec<(usize, String)>, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let Value::Array(elements) = value else {
        return Err("expected a JSON array of level names".to_string());
    };

    Ok(elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match element {
            Value::String(name) => Some((index, name)),
            _ => None,
        })
        .collect())
}

/// Downloads one level document. Any failure yields `None`.
async fn fetch_entry(client: &dyn HttpClient, url: &str, index: usize) -> Option<ListItem> {
    let response = match client.send(HttpRequest::get(url)).await {
        Ok(response) => response,
        Err(e) => {
            debug!(url, error = %e, "dropping level, request failed");
            return None;
        }
    };

    if !response.is_success() {
        debug!(url, status = response.status, "dropping level, bad status");
        return None;
    }

    let document: EntryDocument = match serde_json::from_slice(&response.body) {
        Ok(document) => document,
        Err(e) => {
            debug!(url, error = %e, "dropping level, unusable document");
            return None;
        }
    };

    let position = u32::try_from(index + 1).ok()?;
    Some(ListItem {
        id: document.id,
        name: document.name,
        position,
    })
}
