use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status line, declared length and the still-unread body of a response.
///
/// Dropping the value without draining `body` aborts the connection.
pub struct HttpResponse<E> {
    pub status: u16,
    /// Parsed `content-length` header, `None` when absent or invalid.
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

impl<E> std::fmt::Debug for HttpResponse<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Issues a plain GET with no custom headers and no body. Redirects are
/// whatever the implementation does on its own. A non-200 status is not an
/// error at this level; the caller inspects [`HttpResponse::status`].
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Scripted implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + 'static;

    /// Send a GET request and return as soon as the response head arrived.
    ///
    /// # Errors
    ///
    /// Connection, DNS or TLS failures, and anything else that prevents a
    /// response head from being read.
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;

    use futures_util::StreamExt;
    use thiserror::Error;

    use crate::core::parse_content_length;

    #[derive(Debug, Error)]
    pub enum ClientError {
        #[error("Failed to build client: {0}")]
        Build(#[from] reqwest::Error),
    }

    /// Transport settings for [`ReqwestClient`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ClientSettings {
        /// Skip TLS certificate validation. Off unless asked for.
        pub accept_invalid_certs: bool,
        pub user_agent: Option<String>,
    }

    impl ClientSettings {
        #[must_use]
        pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
            self.accept_invalid_certs = accept;
            self
        }

        #[must_use]
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = Some(user_agent.into());
            self
        }

        pub fn build(self) -> Result<ReqwestClient, ClientError> {
            let mut cb = reqwest::Client::builder();

            if self.accept_invalid_certs {
                tracing::warn!("TLS certificate validation is disabled for this client");
                cb = cb.danger_accept_invalid_certs(true);
            }

            let user_agent = self
                .user_agent
                .unwrap_or_else(|| concat!("haul/", env!("CARGO_PKG_VERSION")).to_string());
            cb = cb.user_agent(user_agent);

            Ok(ReqwestClient {
                client: cb.build()?,
            })
        }
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Client with certificate validation on and the default user agent.
        pub fn new() -> Result<Self, ClientError> {
            ClientSettings::default().build()
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(&self, url: &str) -> Result<HttpResponse<Self::Error>, Self::Error> {
            let response = self.client.get(url).send().await?;

            let status = response.status().as_u16();
            let content_length = response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_length);

            Ok(HttpResponse {
                status,
                content_length,
                body: response.bytes_stream().boxed(),
            })
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientError, ClientSettings, ReqwestClient};
