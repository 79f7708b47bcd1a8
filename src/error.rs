// View-level failures. None of these are fatal to the process.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A request against the catalog service failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The file list was empty or every file is missing on disk
    #[error("no playable file found")]
    NoPlayableFile,

    /// A detail view was opened without the navigation state it needs
    #[error("missing {0} context")]
    MissingContext(&'static str),

    /// The service returned a hierarchy that contradicts itself
    #[error("inconsistent catalog data: {0}")]
    Inconsistent(String),
}
