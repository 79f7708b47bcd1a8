// Resolve a movie or episode to the file the player should stream

use crate::api::Catalog;
use crate::error::ClientError;
use crate::models::{EpisodeId, FileId, MediaFile, MovieId};

/// Logical media unit that owns files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayableOwner {
    Movie(MovieId),
    Episode(EpisodeId),
}

impl PlayableOwner {
    fn noun(&self) -> &'static str {
        match self {
            PlayableOwner::Movie(_) => "movie",
            PlayableOwner::Episode(_) => "episode",
        }
    }
}

/// First file, in service order, that is not missing on disk.
///
/// Deliberately not a quality ranking: ties are broken by position only.
pub fn select_playable(files: &[MediaFile]) -> Option<&MediaFile> {
    files.iter().find(|f| !f.is_missing)
}

pub async fn resolve_playable(
    catalog: &dyn Catalog,
    owner: PlayableOwner,
) -> Result<FileId, ClientError> {
    let files = match owner {
        PlayableOwner::Movie(id) => catalog.list_movie_files(id).await?,
        PlayableOwner::Episode(id) => catalog.list_episode_files(id).await?,
    };

    match select_playable(&files) {
        Some(file) => {
            tracing::debug!(
                "Resolved {:?} to file {} ({} candidates)",
                owner,
                file.id,
                files.len()
            );
            Ok(file.id)
        }
        None => {
            tracing::info!(
                "No playable file for {:?}: {} candidates, all missing",
                owner,
                files.len()
            );
            Err(ClientError::NoPlayableFile)
        }
    }
}

/// User-facing, dismissable message for a failed resolve. The caller stays
/// on the current view.
pub fn playback_notice(owner: PlayableOwner, error: &ClientError) -> String {
    match error {
        ClientError::NoPlayableFile => {
            format!("No playable file found for this {}", owner.noun())
        }
        _ => format!("Failed to load {} media", owner.noun()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_helpers::*;

    #[test]
    fn test_select_first_present_file() {
        let files = vec![media_file(3, true), media_file(7, false), media_file(9, false)];
        assert_eq!(select_playable(&files).map(|f| f.id), Some(7));
    }

    #[test]
    fn test_select_none() {
        assert!(select_playable(&[]).is_none());
        assert!(select_playable(&[media_file(1, true), media_file(2, true)]).is_none());
    }

    #[tokio::test]
    async fn test_resolve_episode() {
        let catalog = FakeCatalog::new();
        catalog
            .episode_files
            .lock()
            .unwrap()
            .insert(5, vec![media_file(3, true), media_file(7, false), media_file(9, false)]);

        let file = resolve_playable(&catalog, PlayableOwner::Episode(5)).await.unwrap();
        assert_eq!(file, 7);
    }

    #[tokio::test]
    async fn test_resolve_movie_without_files() {
        let catalog = FakeCatalog::new();
        let owner = PlayableOwner::Movie(4);

        let err = resolve_playable(&catalog, owner).await.unwrap_err();
        assert!(matches!(err, ClientError::NoPlayableFile));
        assert_eq!(
            playback_notice(owner, &err),
            "No playable file found for this movie"
        );
    }

    #[tokio::test]
    async fn test_resolve_request_failure() {
        let catalog = FakeCatalog::new();
        catalog.fail("/episodes/5/files");
        let owner = PlayableOwner::Episode(5);

        let err = resolve_playable(&catalog, owner).await.unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));
        assert_eq!(playback_notice(owner, &err), "Failed to load episode media");
    }
}
