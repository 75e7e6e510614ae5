//! bcrypt hashing, run off the async executor.

use tokio::task;

/// Work factor for new hashes.
pub const BCRYPT_COST: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] task::JoinError),
}

pub async fn hash_password(plain: String) -> Result<String, PasswordError> {
    let hash = task::spawn_blocking(move || bcrypt::hash(plain, BCRYPT_COST)).await??;
    Ok(hash)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    let matches = task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false)).await?;
    Ok(matches)
}
