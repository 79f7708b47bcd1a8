// Movies and series listing views
//
// A listing picks the first library of its type, fetches that library's items,
// reloads on every finished scan and owns the enrich action while mounted.

use futures::future::BoxFuture;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiError, Catalog, ImageKind};
use crate::models::{Library, LibraryType, Movie, Series};

use super::actions::{enrich_action, HandlerGuard};
use super::broadcast::Subscription;
use super::context::ClientContext;
use super::state::{Generation, LoadState, StateCell};

/// Catalog entry shown as a poster in a listing
pub trait ListingItem: Clone + Send + Sync + 'static {
    const LIBRARY_TYPE: LibraryType;
    /// Page heading, also the plural noun in messages
    const HEADING: &'static str;
    const IMAGE_KIND: ImageKind;

    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn has_poster(&self) -> bool;

    fn fetch<'a>(
        catalog: &'a dyn Catalog,
        library: &Library,
    ) -> BoxFuture<'a, Result<Vec<Self>, ApiError>>;

    fn enrich(catalog: &dyn Catalog, id: i64) -> BoxFuture<'_, Result<(), ApiError>>;
}

impl ListingItem for Movie {
    const LIBRARY_TYPE: LibraryType = LibraryType::Movies;
    const HEADING: &'static str = "Movies";
    const IMAGE_KIND: ImageKind = ImageKind::Movie;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn has_poster(&self) -> bool {
        self.has_poster
    }

    fn fetch<'a>(
        catalog: &'a dyn Catalog,
        library: &Library,
    ) -> BoxFuture<'a, Result<Vec<Self>, ApiError>> {
        catalog.list_movies(library.id)
    }

    fn enrich(catalog: &dyn Catalog, id: i64) -> BoxFuture<'_, Result<(), ApiError>> {
        catalog.enrich_movie(id)
    }
}

impl ListingItem for Series {
    const LIBRARY_TYPE: LibraryType = LibraryType::Series;
    const HEADING: &'static str = "Series";
    const IMAGE_KIND: ImageKind = ImageKind::Series;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn has_poster(&self) -> bool {
        self.has_poster
    }

    // The service lists series across all series libraries
    fn fetch<'a>(
        catalog: &'a dyn Catalog,
        _library: &Library,
    ) -> BoxFuture<'a, Result<Vec<Self>, ApiError>> {
        catalog.list_series()
    }

    fn enrich(catalog: &dyn Catalog, id: i64) -> BoxFuture<'_, Result<(), ApiError>> {
        catalog.enrich_series(id)
    }
}

/// Settled content of a listing. Zero items is `LoadState::Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    /// No library of this type is configured
    NoLibrary,
    Items { library: Library, items: Vec<T> },
}

pub type MoviesListing = ListingView<Movie>;
pub type SeriesListing = ListingView<Series>;

struct ListingInner<T: ListingItem> {
    catalog: Arc<dyn Catalog>,
    cell: StateCell<Listing<T>>,
    runtime: Handle,
}

impl<T: ListingItem> ListingInner<T> {
    fn reload(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.cell.is_revoked() {
            return None;
        }
        let generation = self.cell.begin();
        let inner = Arc::clone(self);
        Some(self.runtime.spawn(async move { inner.run(generation).await }))
    }

    async fn run(&self, generation: Generation) {
        let state = match self.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Failed to load {} listing: {}", T::LIBRARY_TYPE.as_str(), e);
                LoadState::Failed(e.to_string())
            }
        };
        self.cell.commit(generation, state);
    }

    async fn load(&self) -> Result<LoadState<Listing<T>>, ApiError> {
        let libraries = self.catalog.list_libraries().await?;
        let Some(library) = libraries
            .into_iter()
            .find(|l| l.library_type == T::LIBRARY_TYPE)
        else {
            return Ok(LoadState::Ready(Listing::NoLibrary));
        };

        let items = T::fetch(self.catalog.as_ref(), &library).await?;
        tracing::debug!(
            "Library '{}' lists {} {}",
            library.name,
            items.len(),
            T::LIBRARY_TYPE.as_str()
        );

        if items.is_empty() {
            Ok(LoadState::Empty)
        } else {
            Ok(LoadState::Ready(Listing::Items { library, items }))
        }
    }

    /// Enrich every item currently listed, one at a time. Failures are logged
    /// and skipped. The listing reloads afterwards so new artwork shows up.
    async fn enrich_all(self: &Arc<Self>) -> Result<(), ApiError> {
        let items = match self.cell.current() {
            LoadState::Ready(Listing::Items { items, .. }) => items,
            _ => {
                tracing::debug!("Nothing listed, skipping enrich");
                return Ok(());
            }
        };

        let mut enriched = 0;
        for item in &items {
            match T::enrich(self.catalog.as_ref(), item.id()).await {
                Ok(()) => enriched += 1,
                Err(e) => tracing::warn!("Failed to enrich '{}': {}", item.title(), e),
            }
        }

        tracing::info!(
            "Enriched {}/{} {}",
            enriched,
            items.len(),
            T::LIBRARY_TYPE.as_str()
        );

        if enriched > 0 {
            self.reload();
        }
        Ok(())
    }
}

/// Mounted listing. Dropping it unmounts: the scan subscription and the
/// enrich handler are released and pending loads stop committing.
pub struct ListingView<T: ListingItem> {
    inner: Arc<ListingInner<T>>,
    _scan_subscription: Subscription,
    _enrich_handler: HandlerGuard,
}

impl<T: ListingItem> ListingView<T> {
    /// Mount and start the initial load. Must be called from within a tokio
    /// runtime.
    pub fn mount(ctx: &ClientContext) -> Self {
        let inner = Arc::new(ListingInner {
            catalog: Arc::clone(&ctx.catalog),
            cell: StateCell::new(),
            runtime: Handle::current(),
        });

        let weak = Arc::downgrade(&inner);
        let scan_subscription = ctx.scan_events.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reload();
            }
        });

        let weak: Weak<ListingInner<T>> = Arc::downgrade(&inner);
        let enrich_handler = ctx.enrich_actions.acquire(enrich_action(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.enrich_all().await,
                    None => Ok(()),
                }
            }
        }));

        inner.reload();

        Self {
            inner,
            _scan_subscription: scan_subscription,
            _enrich_handler: enrich_handler,
        }
    }

    pub fn reload(&self) -> Option<JoinHandle<()>> {
        self.inner.reload()
    }

    pub fn state(&self) -> LoadState<Listing<T>> {
        self.inner.cell.current()
    }

    pub fn watch(&self) -> watch::Receiver<LoadState<Listing<T>>> {
        self.inner.cell.subscribe()
    }
}

impl<T: ListingItem> Drop for ListingView<T> {
    fn drop(&mut self) {
        self.inner.cell.revoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::state::settled;
    use crate::services::test_helpers::*;
    use std::time::Duration;

    fn movie_catalog() -> Arc<FakeCatalog> {
        let catalog = FakeCatalog::new().with_libraries(vec![
            library(1, "Shows", LibraryType::Series),
            library(2, "Films", LibraryType::Movies),
        ]);
        catalog
            .movies
            .lock()
            .unwrap()
            .insert(2, vec![movie(10, 2, "Heat"), movie(11, 2, "Ronin")]);
        Arc::new(catalog)
    }

    async fn settle<T: ListingItem>(view: &ListingView<T>) -> LoadState<Listing<T>> {
        let mut rx = view.watch();
        settled(&mut rx).await.unwrap()
    }

    #[tokio::test]
    async fn test_movies_listing_uses_movie_library() {
        let catalog = movie_catalog();
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);

        match settle(&view).await {
            LoadState::Ready(Listing::Items { library, items }) => {
                assert_eq!(library.id, 2);
                let titles: Vec<_> = items.iter().map(|m| m.title.as_str()).collect();
                assert_eq!(titles, vec!["Heat", "Ronin"]);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(catalog.call_count("/movies?library_id=2"), 1);
    }

    #[tokio::test]
    async fn test_no_library_and_empty_library() {
        let catalog = Arc::new(
            FakeCatalog::new().with_libraries(vec![library(2, "Films", LibraryType::Movies)]),
        );
        let ctx = context(&catalog);

        let series = SeriesListing::mount(&ctx);
        assert_eq!(settle(&series).await, LoadState::Ready(Listing::NoLibrary));
        drop(series);

        let movies = MoviesListing::mount(&ctx);
        assert_eq!(settle(&movies).await, LoadState::Empty);
    }

    #[tokio::test]
    async fn test_load_error_is_scoped_to_view() {
        let catalog = movie_catalog();
        catalog.fail("/movies?library_id=2");
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);

        assert!(matches!(settle(&view).await, LoadState::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_event_shows_pending_then_reloads() {
        let catalog = movie_catalog();
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);
        settle(&view).await;

        catalog
            .movies
            .lock()
            .unwrap()
            .get_mut(&2)
            .unwrap()
            .push(movie(12, 2, "Thief"));
        catalog.delay("/libraries", Duration::from_millis(20));

        ctx.scan_events.publish();
        assert!(view.state().is_pending());

        match settle(&view).await {
            LoadState::Ready(Listing::Items { items, .. }) => assert_eq!(items.len(), 3),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_during_initial_load_keeps_latest() {
        let catalog = movie_catalog();
        catalog.delay("/movies?library_id=2", Duration::from_millis(100));
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);

        // Second load starts while the first is in flight
        tokio::time::sleep(Duration::from_millis(10)).await;
        catalog.movies.lock().unwrap().insert(2, vec![movie(20, 2, "Collateral")]);
        ctx.scan_events.publish();

        tokio::time::sleep(Duration::from_millis(500)).await;
        match view.state() {
            LoadState::Ready(Listing::Items { items, .. }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, 20);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_toolbar_enrich_runs_listing_action() {
        let catalog = movie_catalog();
        catalog.fail("/movies/10/enrich");
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);
        settle(&view).await;

        assert!(ctx.enrich_actions.trigger().await.unwrap());

        // One failure does not stop the rest
        assert_eq!(catalog.call_count("/movies/10/enrich"), 1);
        assert_eq!(catalog.call_count("/movies/11/enrich"), 1);
    }

    #[tokio::test]
    async fn test_series_listing_enriches_series() {
        let catalog = Arc::new(
            FakeCatalog::new().with_libraries(vec![library(1, "Shows", LibraryType::Series)]),
        );
        catalog.add_series(series(4, "Dark"), vec![]);
        let ctx = context(&catalog);
        let view = SeriesListing::mount(&ctx);
        settle(&view).await;

        ctx.enrich_actions.trigger().await.unwrap();
        assert_eq!(catalog.call_count("/series/4/enrich"), 1);
    }

    #[tokio::test]
    async fn test_unmount_releases_handler_and_subscription() {
        let catalog = movie_catalog();
        let ctx = context(&catalog);
        let view = MoviesListing::mount(&ctx);
        assert!(ctx.enrich_actions.is_registered());
        assert_eq!(ctx.scan_events.listener_count(), 1);

        drop(view);
        assert!(!ctx.enrich_actions.is_registered());
        assert_eq!(ctx.scan_events.listener_count(), 0);
        assert!(!ctx.enrich_actions.trigger().await.unwrap());
    }

    #[tokio::test]
    async fn test_switching_views_moves_handler() {
        let catalog = Arc::new(FakeCatalog::new().with_libraries(vec![
            library(1, "Shows", LibraryType::Series),
            library(2, "Films", LibraryType::Movies),
        ]));
        catalog.movies.lock().unwrap().insert(2, vec![movie(10, 2, "Heat")]);
        catalog.add_series(series(4, "Dark"), vec![]);
        let ctx = context(&catalog);

        let movies = MoviesListing::mount(&ctx);
        settle(&movies).await;
        let series_view = SeriesListing::mount(&ctx);
        settle(&series_view).await;
        // Old view unmounts after the new one registered
        drop(movies);

        ctx.enrich_actions.trigger().await.unwrap();
        assert_eq!(catalog.call_count("/series/4/enrich"), 1);
        assert_eq!(catalog.call_count("/movies/10/enrich"), 0);
    }
}
