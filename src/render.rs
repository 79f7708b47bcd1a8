// Plain-text rendering of resolved view state for the terminal client

use std::fmt::Write;

use crate::api::{image_url, ImageVariant};
use crate::models::CollectionNode;
use crate::services::details::{EpisodeDetail, MovieDetail};
use crate::services::listing::{Listing, ListingItem};
use crate::services::loader::SeriesTree;
use crate::services::state::LoadState;

const LOADING: &str = "Loading…";

pub fn listing<T: ListingItem>(state: &LoadState<Listing<T>>, base_url: &str) -> String {
    let mut out = format!("{}\n", T::HEADING);
    let noun = T::HEADING.to_lowercase();

    match state {
        LoadState::Pending => out.push_str(LOADING),
        LoadState::Failed(reason) => {
            let _ = write!(out, "Failed to load {}: {}", noun, reason);
        }
        LoadState::Ready(Listing::NoLibrary) => {
            let _ = write!(out, "No {} libraries configured.", noun);
        }
        LoadState::Empty => {
            let _ = write!(
                out,
                "No {} found. Run a scan to populate this library.",
                noun
            );
        }
        LoadState::Ready(Listing::Items { library, items }) => {
            let _ = writeln!(out, "Library: {}", library.name);
            for item in items {
                let _ = write!(out, "\n  [{}] {}", item.id(), item.title());
                if item.has_poster() {
                    let poster = image_url(base_url, T::IMAGE_KIND, item.id(), ImageVariant::Poster);
                    let _ = write!(out, "  {}", poster);
                }
            }
        }
    }
    out
}

pub fn series_tree(state: &LoadState<SeriesTree>) -> String {
    match state {
        LoadState::Pending => LOADING.to_string(),
        LoadState::Failed(reason) => format!("Failed to load series: {}", reason),
        LoadState::Empty => "No seasons found.".to_string(),
        LoadState::Ready(tree) => {
            let mut out = tree.series.title.clone();
            if let Some(overview) = &tree.series.overview {
                let _ = write!(out, "\n{}", overview);
            }
            for node in &tree.seasons {
                let _ = write!(out, "\n\n{}", node.season.display_title());
                for episode in &node.episodes {
                    let _ = write!(
                        out,
                        "\n  [{}] Ep {} – {}",
                        episode.id,
                        episode.ordinal(),
                        episode.display_title()
                    );
                    if let Some(day) = episode.aired_on() {
                        let _ = write!(out, " ({})", day);
                    }
                }
            }
            out
        }
    }
}

pub fn movie_detail(detail: &MovieDetail, base_url: &str) -> String {
    let movie = &detail.movie;
    let mut out = movie.title.clone();
    if let Some(original) = detail.original_title() {
        let _ = write!(out, "\n({})", original);
    }
    // The service sends 0 for an unknown year
    if let Some(year) = movie.year.filter(|year| *year > 0) {
        let _ = write!(out, "\n{}", year);
    }
    if let Some(overview) = &movie.overview {
        let _ = write!(out, "\n\n{}", overview);
    }
    if let Some(poster) = detail.poster_url(base_url) {
        let _ = write!(out, "\n\nPoster: {}", poster);
    }
    if let Some(backdrop) = detail.backdrop_url(base_url) {
        let _ = write!(out, "\nBackdrop: {}", backdrop);
    }
    let _ = write!(out, "\n\nBack: {}", detail.back_route());
    out
}

pub fn episode_detail(detail: &EpisodeDetail, base_url: &str) -> String {
    let mut out = format!("{}\n\n{}\n{}", detail.header_title(), detail.title(), detail.subtitle());
    if let Some(day) = detail.episode.aired_on() {
        let _ = write!(out, "\nAired {}", day);
    }
    let overview = detail
        .episode
        .overview
        .as_deref()
        .filter(|o| !o.is_empty())
        .unwrap_or("No summary available.");
    let _ = write!(out, "\n\n{}", overview);
    if let Some(backdrop) = detail.backdrop_url(base_url) {
        let _ = write!(out, "\n\nBackdrop: {}", backdrop);
    }
    let _ = write!(out, "\n\nBack: {}", detail.back_route());
    out
}
