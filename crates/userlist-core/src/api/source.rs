use async_trait::async_trait;

use crate::models::User;

use super::FetchError;

/// Where the full user set comes from.
#[async_trait]
pub trait UserSource: Send + Sync + 'static {
    /// Fetch the whole collection in one request.
    async fn fetch_all(&self) -> Result<Vec<User>, FetchError>;
}
