use std::time::Duration;

use domov_common::source::SourceError;
use reqwest::Client;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn client() -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

pub(crate) fn to_source_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::TimedOut(REQUEST_TIMEOUT)
    } else if let Some(status) = e.status() {
        SourceError::Status(status.as_u16())
    } else if e.is_decode() {
        SourceError::Decode(e.to_string())
    } else {
        SourceError::Network(e.to_string())
    }
}
