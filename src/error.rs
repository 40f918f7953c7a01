use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Another create/edit/delete has not been confirmed yet.
    #[error("another change is still being saved ({0})")]
    MutationInFlight(&'static str),
}

impl AppError {
    /// Short text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(StoreError::NotFound(_)) => {
                "That diary no longer exists.".to_string()
            }
            AppError::Store(StoreError::Duplicate(_)) => {
                "That diary was already saved.".to_string()
            }
            AppError::Store(_) => "Could not access the diary file.".to_string(),
            AppError::MutationInFlight(_) => "Please wait, still saving.".to_string(),
        }
    }
}
