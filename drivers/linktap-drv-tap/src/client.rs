use crate::linktap::{Auth, Endpoint, Reply};
use linktap_api::{Error, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::future::Future;
use tokio::time::Duration;
use tracing::debug;

/// Delivers one request body to the service and returns the text of
/// the reply. Keeping HTTP behind this trait lets the rest of the
/// driver run against a scripted peer.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: String,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<String>> + Send;
}

// Maps a `reqwest` error into our error type. Only timeouts get their
// own value; everything else means the service couldn't be reached.

fn map_http_err(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::TimeoutError
    } else {
        Error::MissingPeer(format!("LinkTap service -- {}", e))
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        static APP_USER_AGENT: &str =
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

        // Build the client with our desired defaults. The timeout
        // covers the whole exchange so a stalled reply can't hold up
        // the next tick.

        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .use_rustls_tls()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::OperationError(format!(
                    "can't create connection -- {}",
                    e
                ))
            })?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn post(&self, url: String, body: Vec<u8>) -> Result<String> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(map_http_err)?;

        let status = resp.status();

        if !status.is_success() {
            return Err(Error::ProtocolError(format!("HTTP status {}", status)));
        }

        resp.text().await.map_err(map_http_err)
    }
}

// Every body sent to the service carries the account credentials
// next to the request's own fields.

#[derive(Serialize)]
struct Request<'a, B> {
    #[serde(flatten)]
    auth: &'a Auth,
    #[serde(flatten)]
    body: &'a B,
}

/// Sends requests to the LinkTap service on behalf of one account.
pub struct Client<T = HttpTransport> {
    transport: T,
    base: String,
    auth: Auth,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, base: String, auth: Auth) -> Self {
        Client {
            transport,
            base,
            auth,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one request and decodes the envelope of its reply. No
    /// retries are made; a failure is reported to the caller.
    pub async fn send<B>(&self, endpoint: Endpoint, body: &B) -> Result<Reply>
    where
        B: Serialize + Sync,
    {
        let url = format!("{}{}", self.base, endpoint.path());
        let body = serde_json::to_vec(&Request {
            auth: &self.auth,
            body,
        })
        .map_err(|e| {
            Error::ProtocolError(format!("can't encode request -- {}", e))
        })?;

        debug!("sending request to {}", endpoint);

        let text = self.transport.post(url, body).await?;

        debug!("{} replied : {}", endpoint, text.trim());
        Reply::decode(&text)
    }
}
