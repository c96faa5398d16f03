//! Graph API adapters

mod http;

pub use http::HttpGraphApi;

use async_trait::async_trait;
use ig_poster_domain::{GraphApi, GraphError};
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A request seen by [`StubGraphApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    /// Query parameters or form fields, minus `access_token`
    pub params: Vec<(String, String)>,
}

/// Offline Graph API that answers every request with plausible ids
///
/// Used for dry runs: the full create/publish sequence executes and is
/// recorded, but nothing leaves the machine.
pub struct StubGraphApi {
    counter: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubGraphApi {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            calls: Mutex::new(vec![]),
        }
    }

    /// Get all requests seen so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: &str, params: &[(&str, &str)]) {
        let params = params
            .iter()
            .filter(|(k, _)| *k != "access_token")
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            params,
        });
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("stub_{}_{}", prefix, n)
    }
}

impl Default for StubGraphApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphApi for StubGraphApi {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GraphError> {
        self.record("GET", path, query);

        let fields = query
            .iter()
            .find(|(k, _)| *k == "fields")
            .map(|(_, v)| *v)
            .unwrap_or_default();

        if fields.starts_with("instagram_business_account") {
            return Ok(serde_json::json!({
                "instagram_business_account": {"id": "stub_account", "username": "stub"}
            }));
        }

        let node = path.rsplit('/').next().unwrap_or_default();
        Ok(serde_json::json!({
            "id": node,
            "username": "stub",
            "name": "Stub Account",
            "followers_count": 0,
            "follows_count": 0,
            "media_count": 0
        }))
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Value, GraphError> {
        self.record("POST", path, fields);

        let id = if path.ends_with("/media_publish") {
            self.next_id("media")
        } else if path.ends_with("/media") {
            self.next_id("container")
        } else {
            return Err(GraphError::api(Some("Unsupported stub endpoint")));
        };

        Ok(serde_json::json!({ "id": id }))
    }
}
