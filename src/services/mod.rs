// Services module - client-side coordination layer

pub mod actions;
pub mod boot;
pub mod broadcast;
pub mod context;
pub mod details;
pub mod listing;
pub mod loader;
pub mod playable;
pub mod scan;
pub mod state;

#[cfg(test)]
pub mod test_helpers;

pub use actions::{enrich_action, EnrichAction, EnrichActions, HandlerGuard};
pub use boot::{setup, BootRouter, Destination};
pub use broadcast::{ScanEvents, Subscription};
pub use context::{ClientContext, ClientOptions};
pub use details::{EpisodeDetail, MovieDetail};
pub use listing::{Listing, MoviesListing, SeriesListing};
pub use loader::{CollectionLoader, LoaderOptions, SeriesTree};
pub use playable::{playback_notice, resolve_playable, PlayableOwner};
pub use scan::{ScanActions, ScanReport};
pub use state::{settled, LoadState};
