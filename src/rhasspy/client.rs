//! Rhasspy HTTP Client
//!
//! Blocking client for the Rhasspy HTTP API built on `ureq`.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::{
    DeviceList, ProfileMeta, RecognitionService, RhasspyError, DOWNLOAD_PROFILE_PATH,
    INSTALLED_PROFILE_PATH, MICROPHONES_PATH, PROFILES_PATH, PROFILE_PATH, RESTART_PATH,
    SENTENCES_PATH, SLOTS_PATH, SPEAKERS_PATH, TRAIN_PATH,
};
use crate::engine::export::Grammar;
use crate::engine::slots::GlobalSlotTable;

/// Blocking Rhasspy API client
pub struct RhasspyApi {
    base_url: String,
    agent: ureq::Agent,
}

impl RhasspyApi {
    /// Create a client for the given base URL (e.g. `http://rhasspy:12101`)
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document
    pub fn get(&self, path: &str) -> Result<Value, RhasspyError> {
        let response = self
            .agent
            .get(&self.url(path))
            .call()
            .map_err(|e| self.map_error(path, e))?;

        response.into_json().map_err(|e| RhasspyError::Json {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// POST an optional JSON body, returning the response text
    pub fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<String, RhasspyError> {
        self.send_post(path, body, None)
    }

    /// POST with a bound on how long to wait for the response
    pub fn post_with_timeout<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> Result<String, RhasspyError> {
        self.send_post(path, body, Some(timeout))
    }

    fn send_post<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> Result<String, RhasspyError> {
        let mut request = self.agent.post(&self.url(path));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let result = match body {
            Some(body) => request
                .set("content-type", "application/json")
                .send_json(body),
            None => request.call(),
        };

        let response = result.map_err(|e| self.map_error(path, e))?;
        response.into_string().map_err(|e| {
            if is_timeout_io(&e) {
                RhasspyError::Timeout {
                    path: path.to_string(),
                }
            } else {
                RhasspyError::Transport {
                    url: self.url(path),
                    source: Box::new(e),
                }
            }
        })
    }

    fn map_error(&self, path: &str, err: ureq::Error) -> RhasspyError {
        match err {
            ureq::Error::Status(status, response) => RhasspyError::Status {
                path: path.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => {
                if is_timeout_transport(&transport) {
                    RhasspyError::Timeout {
                        path: path.to_string(),
                    }
                } else {
                    RhasspyError::Transport {
                        url: self.url(path),
                        source: Box::new(transport),
                    }
                }
            }
        }
    }

    fn device_list(&self, path: &str) -> Result<DeviceList, RhasspyError> {
        let value = self.get(path)?;
        serde_json::from_value(value).map_err(|e| RhasspyError::Json {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

fn is_timeout_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

fn is_timeout_transport(transport: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if is_timeout_io(io) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

impl RecognitionService for RhasspyApi {
    fn installed_profile(&self) -> Result<Value, RhasspyError> {
        self.get(INSTALLED_PROFILE_PATH)
    }

    fn install_profile(&self, profile: &Value) -> Result<(), RhasspyError> {
        self.post(PROFILE_PATH, Some(profile)).map(|_| ())
    }

    fn restart(&self) -> Result<(), RhasspyError> {
        self.post::<Value>(RESTART_PATH, None).map(|_| ())
    }

    fn profile_meta(&self) -> Result<ProfileMeta, RhasspyError> {
        let value = self.get(PROFILES_PATH)?;
        serde_json::from_value(value).map_err(|e| RhasspyError::Json {
            path: PROFILES_PATH.to_string(),
            message: e.to_string(),
        })
    }

    fn download_profile(&self) -> Result<(), RhasspyError> {
        self.post::<Value>(DOWNLOAD_PROFILE_PATH, None).map(|_| ())
    }

    fn microphones(&self) -> Result<DeviceList, RhasspyError> {
        self.device_list(MICROPHONES_PATH)
    }

    fn speakers(&self) -> Result<DeviceList, RhasspyError> {
        self.device_list(SPEAKERS_PATH)
    }

    fn replace_slots(&self, slots: &GlobalSlotTable) -> Result<(), RhasspyError> {
        self.post(SLOTS_PATH, Some(slots)).map(|_| ())
    }

    fn replace_sentences(&self, sentences_ini: &str) -> Result<(), RhasspyError> {
        let document = Grammar::document(sentences_ini);
        self.post(SENTENCES_PATH, Some(&document)).map(|_| ())
    }

    fn train(&self, timeout: Duration) -> Result<(), RhasspyError> {
        self.post_with_timeout::<Value>(TRAIN_PATH, None, timeout)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let api = RhasspyApi::new("http://localhost:12101/");
        assert_eq!(api.base_url(), "http://localhost:12101");
        assert_eq!(
            api.url(SLOTS_PATH),
            "http://localhost:12101/api/slots?overwriteAll=true"
        );
    }

    #[test]
    fn test_unreachable_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = RhasspyApi::new("http://127.0.0.1:9");
        let err = api.installed_profile().unwrap_err();
        assert!(matches!(err, RhasspyError::Transport { .. }));
        assert!(!err.is_rejection());
        assert!(std::error::Error::source(&err).is_some());
    }
}
