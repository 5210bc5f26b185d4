use std::fmt::Display;

use log::{debug, error, info, warn};
use reqwest::blocking::Client;

use crate::{config::ApiConfig, utils::preview};

/// Outcome of the single GET to the API
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum FetchResponse {
    /// Successful response with a non-empty body
    Body(String),
    /// Successful response without any content
    Empty,
    Timeout,
    ErrorTransport { msg: String },
    ErrorHttp { status: u16, msg: String },
    ErrorDecode { msg: String },
}

impl FetchResponse {
    /// The data to be stored, only present if the API returned something
    pub fn payload(&self) -> Option<&str> {
        match self {
            FetchResponse::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, FetchResponse::Body(_) | FetchResponse::Empty)
    }
}

impl Display for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchResponse::Body(body) => write!(f, "body: {}", preview(body)),
            FetchResponse::Empty => write!(f, "empty body"),
            FetchResponse::Timeout => write!(f, "timed out"),
            FetchResponse::ErrorTransport { msg } => write!(f, "transport error: {msg}"),
            FetchResponse::ErrorHttp { status, msg } => write!(f, "HTTP {status}: {msg}"),
            FetchResponse::ErrorDecode { msg } => write!(f, "decode error: {msg}"),
        }
    }
}

fn describe(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::from(e))
}

impl From<reqwest::Error> for FetchResponse {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchResponse::Timeout
        } else {
            FetchResponse::ErrorTransport { msg: describe(e) }
        }
    }
}

pub struct HttpFetcher<'a> {
    config: &'a ApiConfig,
}

impl<'a> HttpFetcher<'a> {
    pub fn new(config: &'a ApiConfig) -> Self {
        Self { config }
    }

    /// Performs exactly one GET, every failure is logged and folded into the response
    pub fn fetch(&self) -> FetchResponse {
        info!(
            "Fetching data from {} (timeout {})",
            self.config.url, self.config.timeout
        );
        let result = self.do_fetch();
        match &result {
            FetchResponse::Body(_) => info!("API fetch succeeded, {result}"),
            FetchResponse::Empty => warn!("API returned an empty body, nothing to store"),
            _ => error!("API fetch error: {result}"),
        }
        result
    }

    fn do_fetch(&self) -> FetchResponse {
        let client = match Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(std::time::Duration::from(self.config.timeout))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                return FetchResponse::ErrorTransport {
                    msg: format!("failed to build http client: {}", describe(e)),
                }
            }
        };

        let response = match client.get(&self.config.url).send() {
            Ok(response) => response,
            Err(e) => return e.into(),
        };

        let status = response.status();
        debug!("API responded with status {status}");
        if !status.is_success() {
            return FetchResponse::ErrorHttp {
                status: status.as_u16(),
                msg: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
        }

        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(e) => return e.into(),
        };
        if bytes.is_empty() {
            return FetchResponse::Empty;
        }

        match String::from_utf8(bytes.to_vec()) {
            Ok(body) => FetchResponse::Body(body),
            Err(e) => FetchResponse::ErrorDecode {
                msg: format!("body is not valid utf-8: {e}"),
            },
        }
    }
}
