/*

    Errors surfaced by the editor session.

    Only `NoModel` and the rename failures are meant to be shown
    to the user as blocking notices. Degenerate geometry never
    produces an error, it just yields fewer (or zero) accepted cells.

    @date: Nov, 2025
*/

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Please load a model first.")]
    NoModel,

    #[error("Invalid hitbox name '{0}'")]
    InvalidName(String),

    #[error("A hitbox named '{0}' already exists")]
    DuplicateName(String),

    #[error("No hitbox is selected")]
    NoSelection,

    #[error("Unknown hitbox id {0}")]
    UnknownHitbox(u64),

    #[error("Quality must be a positive integer, got {0}")]
    InvalidQuality(usize),

    #[error("An auto-generation pass is already running for this model")]
    Busy,

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn load(details: impl Into<String>) -> Self {
        Self::Load(details.into())
    }

    /// Whether the UI host should present this as a blocking notice.
    pub fn is_user_notice(&self) -> bool {
        matches!(self, Self::NoModel | Self::InvalidName(_) | Self::DuplicateName(_) | Self::NoSelection)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(format!("{}", EditorError::NoModel).contains("load a model"));
        assert!(format!("{}", EditorError::DuplicateName("auto_0".into())).contains("auto_0"));
        assert!(format!("{}", EditorError::load("bad face")).contains("bad face"));
    }

    #[test]
    fn test_user_notices() {
        assert!(EditorError::NoModel.is_user_notice());
        assert!(EditorError::InvalidName(String::new()).is_user_notice());
        assert!(!EditorError::Busy.is_user_notice());
    }
}
