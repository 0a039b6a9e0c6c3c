use std::sync::OnceLock;

use rand::{distributions::Alphanumeric, Rng};

use crate::error::TimetableError;

pub fn generate_random_passcode() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

pub async fn hash_passcode(passcode: &str) -> Result<String, TimetableError> {
    let passcode = passcode.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(passcode, bcrypt::DEFAULT_COST))
        .await
        .map_err(|err| TimetableError::Internal(err.to_string()))?
        .map_err(|err| TimetableError::Internal(err.to_string()))
}

pub async fn verify_passcode(passcode: &str, hash: &str) -> Result<bool, TimetableError> {
    let passcode = passcode.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(passcode, &hash))
        .await
        .map_err(|err| TimetableError::Internal(err.to_string()))?
        .map_err(|err| TimetableError::Internal(err.to_string()))
}

/// A real bcrypt hash at the default cost, verified against when the account
/// does not exist so that lookups for unknown accounts cost the same.
pub async fn dummy_hash() -> Result<&'static str, TimetableError> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_passcode(&generate_random_passcode()).await?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}
