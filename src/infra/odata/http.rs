use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Url};

use crate::domain::entities::record::QueryResult;
use crate::error::FetchError;
use crate::infra::odata::response::ODataPage;
use crate::usecase::ports::source::PageSource;

/// [`PageSource`] over plain HTTP GET.
///
/// No timeout is configured on the client; the fetch orchestrator bounds
/// every request itself.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("dyntable/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FetchError::transport(format!("failed to create HTTP client: {err}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<QueryResult, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::transport(format!("invalid URL '{url}': {err}")))?;

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(format!("failed to read response body: {err}")))?;
        Ok(ODataPage::from_slice(&body)?.into_result())
    }
}
