// One-shot boot decision: where to send the user before any data is shown

use crate::api::Catalog;
use crate::error::ClientError;
use crate::models::{CreateLibraryRequest, Library, LibraryType};
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Setup,
    MoviesListing,
    SeriesListing,
}

impl Destination {
    pub fn route(&self) -> Route {
        match self {
            Destination::Setup => Route::Setup,
            Destination::MoviesListing => Route::Movies,
            Destination::SeriesListing => Route::Series,
        }
    }
}

/// Setup when there are no libraries, movies when any library holds movies,
/// series otherwise.
pub fn decide(libraries: &[Library]) -> Destination {
    if libraries.is_empty() {
        Destination::Setup
    } else if libraries
        .iter()
        .any(|l| l.library_type == LibraryType::Movies)
    {
        Destination::MoviesListing
    } else {
        Destination::SeriesListing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Loading,
    Decided(Destination),
}

/// Redirect that fires once per mount. After the decision it never
/// re-evaluates.
#[derive(Debug)]
pub struct BootRouter {
    state: BootState,
}

impl BootRouter {
    pub fn new() -> Self {
        Self {
            state: BootState::Loading,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    /// Fetch libraries and decide. Any fetch failure lands on Setup so the
    /// user is never left on a blank screen.
    pub async fn run(&mut self, catalog: &dyn Catalog) -> Destination {
        if let BootState::Decided(destination) = self.state {
            return destination;
        }

        let destination = match catalog.list_libraries().await {
            Ok(libraries) => decide(&libraries),
            Err(e) => {
                tracing::warn!("Failed to fetch libraries during boot, falling back to setup: {}", e);
                Destination::Setup
            }
        };

        tracing::info!("Boot decided: {}", destination.route());
        self.state = BootState::Decided(destination);
        destination
    }
}

impl Default for BootRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a library from the setup screen, then boot again from scratch so
/// the new library decides the start page.
pub async fn setup(
    catalog: &dyn Catalog,
    request: &CreateLibraryRequest,
) -> Result<(Library, Destination), ClientError> {
    let library = catalog.create_library(request).await?;
    tracing::info!(
        "Created {} library '{}' at {}",
        library.library_type.as_str(),
        library.name,
        request.path
    );

    let destination = BootRouter::new().run(catalog).await;
    Ok((library, destination))
}
