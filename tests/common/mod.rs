#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use http::{HeaderMap, HeaderValue, StatusCode};
use paypal_nvp::{
    concepts::Transport,
    transport::{HttpResponse, TransportError},
};
use url::Url;

/// Replays scripted responses in order and keeps the URLs it was asked for.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, body: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("paypal-debug-id", HeaderValue::from_static("5c7a2c4b1f0e3"));
        self.script.lock().unwrap().push_back(Ok(HttpResponse {
            status: StatusCode::OK,
            headers,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    /// Query pairs of the `n`th request.
    pub fn query(&self, n: usize) -> Vec<(String, String)> {
        self.requests()[n].query_pairs().into_owned().collect()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted")
    }
}
