use async_trait::async_trait;

use crate::domain::entities::record::QueryResult;
use crate::error::FetchError;

/// Implementations issue one request for a fully rendered query URL and
/// reconcile the response into a [`QueryResult`]. Dropping the returned
/// future must abandon the request.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<QueryResult, FetchError>;
}
