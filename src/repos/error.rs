/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - store の失敗のうち意味を持つもの (duplicate) だけを区別する
 */
use thiserror::Error;

use crate::services::store::StoreError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("not found")]
    NotFound,
    #[error("duplicate")]
    Duplicate,
    #[error("store error: {0}")]
    Store(StoreError),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn from_store(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => RepoError::Duplicate,
            other => RepoError::Store(other),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(e: StoreError) -> Self {
        RepoError::from_store(e)
    }
}
