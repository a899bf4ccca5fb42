use thiserror::Error;

/// Failures on the parsing surfaces of the grid (templates, restore info).
///
/// Layout itself never fails; these are reported at the API boundary, logged
/// and replaced by a fallback.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("empty grid template")]
    EmptyTemplate,

    #[error("invalid track `{token}` in grid template `{template}`")]
    InvalidTrack { template: String, token: String },

    #[error("malformed repeat() in grid template `{0}`")]
    MalformedRepeat(String),

    #[error("restore info `{0}` is not an item index")]
    InvalidRestoreInfo(String),
}
