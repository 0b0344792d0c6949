use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client};
use tracing::debug;

use crate::error::ApiError;

/// Where fragment markup comes from.
pub trait FragmentSource: Send + Sync + 'static {
    /// Fetch the raw body at `path`. Non-success statuses are errors.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ApiError>> + Send;
}

/// Fetches fragments over HTTP relative to a base URL.
///
/// Every call goes to the network; responses are never cached.
#[derive(Clone)]
pub struct HttpFragmentSource {
    client: Client,
    base_url: String,
}

impl HttpFragmentSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Share an existing connection pool.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl FragmentSource for HttpFragmentSource {
    async fn fetch(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "Fetching fragment");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/html")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(base: &str) -> HttpFragmentSource {
        HttpFragmentSource::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joins_single_slash() {
        assert_eq!(
            source("http://localhost:8090/").url("/web/component/header.html"),
            "http://localhost:8090/web/component/header.html"
        );
        assert_eq!(
            source("http://localhost:8090").url("web/a.html"),
            "http://localhost:8090/web/a.html"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/component/header.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<nav>home</nav>"))
            .mount(&server)
            .await;

        let body = source(&server.uri())
            .fetch("/web/component/header.html")
            .await
            .unwrap();
        assert_eq!(body, "<nav>home</nav>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = source(&server.uri()).fetch("/web/component/footer.html").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref body) if body == "boom"));
    }
}
