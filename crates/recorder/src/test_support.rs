//! Scripted in-memory backend for engine tests

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sleeker_backend::{Backend, BackendError, QueryRequest, Sample, Series};
use tokio::time::Instant;

/// Reply to one scripted query
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Rows(Vec<Series>),
    Fail,
}

#[derive(Default)]
struct Inner {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<(Instant, QueryRequest)>>,
    delay: Mutex<Option<Duration>>,
}

/// Backend answering from per-query scripts
///
/// Replies for a query are consumed in order; the last one repeats forever.
/// Unscripted queries return no rows.
#[derive(Clone, Default)]
pub(crate) struct ScriptedBackend {
    inner: Arc<Inner>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for `query`
    pub(crate) fn on(&self, query: &str, reply: Reply) -> &Self {
        self.inner
            .replies
            .lock()
            .entry(query.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue rows for `query`
    pub(crate) fn rows(&self, query: &str, rows: Vec<Series>) -> &Self {
        self.on(query, Reply::Rows(rows))
    }

    /// Queue a failure for `query`
    pub(crate) fn fail(&self, query: &str) -> &Self {
        self.on(query, Reply::Fail)
    }

    /// Make every query take `delay` of (tokio) time
    pub(crate) fn with_delay(&self, delay: Duration) -> &Self {
        *self.inner.delay.lock() = Some(delay);
        self
    }

    /// Every request received so far, with the instant it arrived
    pub(crate) fn requests(&self) -> Vec<(Instant, QueryRequest)> {
        self.inner.requests.lock().clone()
    }

    /// Requests for `query` only
    pub(crate) fn requests_for(&self, query: &str) -> Vec<(Instant, QueryRequest)> {
        self.requests()
            .into_iter()
            .filter(|(_, request)| request.query() == query)
            .collect()
    }

    fn next_reply(&self, query: &str) -> Reply {
        let mut replies = self.inner.replies.lock();
        match replies.get_mut(query) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Fail),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Rows(Vec::new())),
            None => Reply::Rows(Vec::new()),
        }
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, request: &QueryRequest) -> Result<Vec<Series>, BackendError> {
        self.inner
            .requests
            .lock()
            .push((Instant::now(), request.clone()));

        let delay = *self.inner.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply(request.query()) {
            Reply::Rows(rows) => Ok(rows),
            Reply::Fail => Err(BackendError::Status {
                status: 503,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Range row with `(timestamp, value)` points
pub(crate) fn range_row(pairs: &[(&str, &str)], points: &[(f64, f64)]) -> Series {
    Series {
        labels: labels(pairs),
        value: None,
        values: points.iter().map(|&(t, v)| Sample::new(t, v)).collect(),
    }
}

/// Instant row with one point
pub(crate) fn instant_row(pairs: &[(&str, &str)], timestamp: f64, value: f64) -> Series {
    Series {
        labels: labels(pairs),
        value: Some(Sample::new(timestamp, value)),
        values: Vec::new(),
    }
}

/// Instant row without a value
pub(crate) fn empty_row(pairs: &[(&str, &str)]) -> Series {
    Series {
        labels: labels(pairs),
        ..Default::default()
    }
}
