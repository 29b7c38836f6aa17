//! Scripted `Network` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Network, NetworkError};
use crate::models::{Request, Response, ResponseType};

/// Answers from a URL -> outcome table. Unknown URLs fail like an
/// unreachable host.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Result<Response, NetworkError>>>,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, response: Response) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_string(), Ok(response));
    }

    pub(crate) fn ok(&self, url: &str, body: &str) {
        self.respond(url, Response::new(200, ResponseType::Basic).with_body(body));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.routes.lock().expect("routes lock").insert(
            url.to_string(),
            Err(NetworkError::Connect("offline".to_string())),
        );
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.routes
            .lock()
            .expect("routes lock")
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(NetworkError::Connect(format!("no route to {}", request.url))))
    }
}
