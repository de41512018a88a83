//! Single-shot HTTP liveness checks.
use crate::host::HostKey;
use async_trait::async_trait;
use log::debug;
use serde_derive::Serialize;
use std::{error::Error as StdError, fmt, io, time::Duration};
use thiserror::Error;
use tokio::time;

/// How one host answered its HTTP GET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The server answered with status 200.
    Accessible,
    /// The server answered with any other status code.
    HttpError(u16),
    /// No HTTP answer at all. Holds a short diagnostic.
    Unreachable(String),
}

impl ProbeOutcome {
    pub const fn is_accessible(&self) -> bool {
        matches!(self, Self::Accessible)
    }

    fn from_status(code: u16) -> Self {
        if code == 200 {
            Self::Accessible
        } else {
            Self::HttpError(code)
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accessible => f.write_str("accessible"),
            Self::HttpError(code) => write!(f, "HTTP {code}"),
            Self::Unreachable(reason) => write!(f, "unreachable ({reason})"),
        }
    }
}

/// Why a request never produced a status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    /// DNS, TLS and other failures while establishing the connection.
    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        let mut innermost: &dyn StdError = &err;
        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
                    io::ErrorKind::TimedOut => return Self::Timeout,
                    _ => {}
                }
            }
            innermost = cause;
            source = cause.source();
        }

        let reason = innermost.to_string();
        if err.is_connect() {
            Self::Connect(reason)
        } else {
            Self::Other(reason)
        }
    }
}

/// Issues GET requests and reports the response status.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn get(&self, url: &str) -> Result<u16, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<u16, TransportError> {
        let response = self.client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Sends one `GET http://{host}` and classifies the answer.
///
/// Never fails: transport problems become [`ProbeOutcome::Unreachable`].
pub async fn probe_host<T>(transport: &T, host: &HostKey, timeout: Duration) -> ProbeOutcome
where
    T: HttpTransport + ?Sized,
{
    let url = format!("http://{host}");

    let result = match time::timeout(timeout, transport.get(&url)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout),
    };

    let outcome = match result {
        Ok(code) => ProbeOutcome::from_status(code),
        Err(e) => ProbeOutcome::Unreachable(e.to_string()),
    };
    debug!("{url} -> {outcome}");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::normalize;
    use parameterized::parameterized;

    struct Canned(Result<u16, TransportError>);

    #[async_trait]
    impl HttpTransport for Canned {
        async fn get(&self, _url: &str) -> Result<u16, TransportError> {
            self.0.clone()
        }
    }

    struct Stalled;

    #[async_trait]
    impl HttpTransport for Stalled {
        async fn get(&self, _url: &str) -> Result<u16, TransportError> {
            time::sleep(Duration::from_secs(60)).await;
            Ok(200)
        }
    }

    struct EchoUrl(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl HttpTransport for EchoUrl {
        async fn get(&self, url: &str) -> Result<u16, TransportError> {
            self.0.lock().unwrap().push(url.to_owned());
            Ok(200)
        }
    }

    #[parameterized(code = { 200, 404, 500, 301, 204 })]
    fn status_classification(code: u16) {
        let outcome = ProbeOutcome::from_status(code);
        if code == 200 {
            assert_eq!(outcome, ProbeOutcome::Accessible);
        } else {
            assert_eq!(outcome, ProbeOutcome::HttpError(code));
        }
    }

    #[tokio::test]
    async fn not_found_is_http_error() {
        let outcome = probe_host(&Canned(Ok(404)), &normalize("x.test"), Duration::from_secs(5)).await;
        assert_eq!(outcome, ProbeOutcome::HttpError(404));
    }

    #[tokio::test]
    async fn refused_is_unreachable() {
        let transport = Canned(Err(TransportError::ConnectionRefused));
        let outcome = probe_host(&transport, &normalize("y.test"), Duration::from_secs(5)).await;
        assert_eq!(outcome, ProbeOutcome::Unreachable("connection refused".to_owned()));
    }

    #[tokio::test]
    async fn connect_failure_keeps_reason() {
        let transport = Canned(Err(TransportError::Connect(
            "failed to lookup address information".to_owned(),
        )));
        let outcome = probe_host(&transport, &normalize("nx.test"), Duration::from_secs(5)).await;
        assert_eq!(
            outcome,
            ProbeOutcome::Unreachable("failed to lookup address information".to_owned())
        );
    }

    #[tokio::test]
    async fn slow_transport_times_out() {
        let outcome = probe_host(&Stalled, &normalize("slow.test"), Duration::from_millis(50)).await;
        assert_eq!(outcome, ProbeOutcome::Unreachable("timed out".to_owned()));
    }

    #[tokio::test]
    async fn requests_plain_http_url() {
        let transport = EchoUrl(std::sync::Mutex::new(Vec::new()));
        probe_host(&transport, &normalize("https://a.b.com"), Duration::from_secs(5)).await;
        assert_eq!(*transport.0.lock().unwrap(), vec!["http://a.b.com".to_owned()]);
    }
}
