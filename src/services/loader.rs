// Series -> seasons -> episodes loader used by the series detail view
//
// A load fetches the series and its seasons concurrently, then every season's
// episodes concurrently, and commits the whole tree at once. Results from a
// load that was superseded (new root, scan event, unmount) are dropped.

use futures::future::try_join_all;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiError, Catalog};
use crate::error::ClientError;
use crate::models::{CollectionNode, Episode, Season, Series, SeriesId};

use super::broadcast::Subscription;
use super::context::ClientContext;
use super::state::{Generation, LoadState, StateCell};

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonNode {
    pub season: Season,
    /// In service order
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTree {
    pub series: Series,
    /// In service order
    pub seasons: Vec<SeasonNode>,
}

impl SeriesTree {
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

/// Fetch the full tree for one series. Ordering follows the service, never
/// request completion order.
pub async fn fetch_series_tree(
    catalog: &dyn Catalog,
    series_id: SeriesId,
) -> Result<SeriesTree, ClientError> {
    let (series, seasons) = tokio::try_join!(
        catalog.get_series(series_id),
        catalog.list_seasons(series_id)
    )?;

    tracing::debug!(
        "Series {} has {} seasons, fetching episodes",
        series_id,
        seasons.len()
    );

    let episodes = try_join_all(seasons.iter().map(|season| catalog.list_episodes(season.id)))
        .await?;

    let seasons = seasons
        .into_iter()
        .zip(episodes)
        .map(|(season, episodes)| SeasonNode { season, episodes })
        .collect::<Vec<_>>();

    check_tree(series_id, &seasons)?;

    Ok(SeriesTree { series, seasons })
}

fn check_tree(series_id: SeriesId, seasons: &[SeasonNode]) -> Result<(), ClientError> {
    for node in seasons {
        let season_id = node.season.id();
        if let Some(owner) = node.season.parent_id() {
            if owner != series_id {
                return Err(ClientError::Inconsistent(format!(
                    "season {} belongs to series {}, not {}",
                    season_id, owner, series_id
                )));
            }
        }
        if let Some(stray) = node
            .episodes
            .iter()
            .find(|e| e.parent_id() != Some(season_id))
        {
            return Err(ClientError::Inconsistent(format!(
                "episode {} belongs to season {}, not {}",
                stray.id, stray.season_id, season_id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Deadline for one whole load; `None` waits as long as the requests do
    pub timeout: Option<Duration>,
}

struct LoaderInner {
    catalog: Arc<dyn Catalog>,
    cell: StateCell<SeriesTree>,
    root: Mutex<Option<SeriesId>>,
    options: LoaderOptions,
    runtime: Handle,
}

impl LoaderInner {
    fn root(&self) -> MutexGuard<'_, Option<SeriesId>> {
        self.root.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reload(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let root = (*self.root())?;
        if self.cell.is_revoked() {
            return None;
        }

        let generation = self.cell.begin();
        let inner = Arc::clone(self);
        Some(
            self.runtime
                .spawn(async move { inner.run(root, generation).await }),
        )
    }

    async fn run(&self, series_id: SeriesId, generation: Generation) {
        let load = fetch_series_tree(self.catalog.as_ref(), series_id);

        let result = match self.options.timeout {
            Some(after) => match tokio::time::timeout(after, load).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout {
                    what: format!("loading series {}", series_id),
                    after,
                }
                .into()),
            },
            None => load.await,
        };

        let state = match result {
            Ok(tree) if tree.seasons.is_empty() => LoadState::Empty,
            Ok(tree) => {
                tracing::debug!(
                    "Loaded series {}: {} seasons, {} episodes",
                    series_id,
                    tree.seasons.len(),
                    tree.episode_count()
                );
                LoadState::Ready(tree)
            }
            Err(e) => {
                tracing::warn!("Failed to load series {}: {}", series_id, e);
                LoadState::Failed(e.to_string())
            }
        };

        self.cell.commit(generation, state);
    }
}

/// Hierarchical loader bound to one mounted view.
///
/// Re-runs whenever the root changes or a scan completes. Dropping it is the
/// unmount: the scan subscription goes away and in-flight loads can no longer
/// commit.
pub struct CollectionLoader {
    inner: Arc<LoaderInner>,
    _scan_subscription: Subscription,
}

impl CollectionLoader {
    /// Mount a loader. Must be called from within a tokio runtime.
    pub fn mount(ctx: &ClientContext, options: LoaderOptions) -> Self {
        let inner = Arc::new(LoaderInner {
            catalog: Arc::clone(&ctx.catalog),
            cell: StateCell::new(),
            root: Mutex::new(None),
            options,
            runtime: Handle::current(),
        });

        let weak = Arc::downgrade(&inner);
        let subscription = ctx.scan_events.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                tracing::debug!("Scan finished, reloading series tree");
                inner.reload();
            }
        });

        Self {
            inner,
            _scan_subscription: subscription,
        }
    }

    /// Point the loader at a series. A different root resets the view to
    /// `Pending` and starts a new load; the same root is a no-op.
    pub fn set_root(&self, series_id: SeriesId) -> Option<JoinHandle<()>> {
        {
            let mut root = self.inner.root();
            if *root == Some(series_id) {
                return None;
            }
            *root = Some(series_id);
        }
        self.inner.reload()
    }

    /// Re-run the load for the current root (retry after a failure)
    pub fn reload(&self) -> Option<JoinHandle<()>> {
        self.inner.reload()
    }

    pub fn root(&self) -> Option<SeriesId> {
        *self.inner.root()
    }

    pub fn state(&self) -> LoadState<SeriesTree> {
        self.inner.cell.current()
    }

    pub fn watch(&self) -> watch::Receiver<LoadState<SeriesTree>> {
        self.inner.cell.subscribe()
    }
}

impl Drop for CollectionLoader {
    fn drop(&mut self) {
        self.inner.cell.revoke();
    }
}
