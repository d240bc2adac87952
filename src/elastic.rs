use crate::client::{CreateIndexResponse, SearchClient, TransportError};
use crate::envelope::LogEnvelope;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

/// Basic-auth credentials sent with every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

/// Elasticsearch / OpenSearch client using the REST API over HTTP.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct ElasticClient {
    client: Client,
    /// Base URL of the cluster, e.g. "http://localhost:9200".
    base_url: String,
    credentials: Option<Credentials>,
}

impl ElasticClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Reuse an existing `reqwest` client, e.g. one with custom TLS or
    /// timeout settings.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ElasticClient {
            client,
            base_url,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, index: &str, suffix: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, urlencoding::encode(index));
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(&urlencoding::encode(suffix));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.user, c.password.as_ref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(Box::new(e)))
    }
}

async fn status_error(resp: Response) -> TransportError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
    TransportError::Status { status, body }
}

#[async_trait]
impl SearchClient for ElasticClient {
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError> {
        let resp = self.send(self.client.head(self.url(index, None))).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(status_error(resp).await),
        }
    }

    async fn create_index(&self, index: &str) -> Result<CreateIndexResponse, TransportError> {
        let resp = self.send(self.client.put(self.url(index, None))).await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        resp.json::<CreateIndexResponse>()
            .await
            .map_err(|e| TransportError::Decode(Box::new(e)))
    }

    async fn index_document(
        &self,
        index: &str,
        doc_type: Option<&str>,
        document: &LogEnvelope,
    ) -> Result<(), TransportError> {
        let url = self.url(index, Some(doc_type.unwrap_or("_doc")));
        let resp = self.send(self.client.post(url).json(document)).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(status_error(resp).await)
        }
    }
}
