use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::{ApiParams, ChorusTransport};
use crate::core::ChorusError;

/// Request seen by a [`ReplayTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url_path: String,
    pub payload: Value,
}

/// Transport answering from scripted responses, keyed by URL path.
///
/// Answers for a path are consumed in order; the last one keeps being
/// replayed. A path without any answer fails with
/// [`ChorusError::Transport`].
#[derive(Debug, Default)]
pub struct ReplayTransport {
    answers: HashMap<String, VecDeque<Result<Value, String>>>,
    requests: Vec<RecordedRequest>,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for `url_path`.
    pub fn respond(mut self, url_path: &str, answer: Value) -> Self {
        self.push(url_path, Ok(answer));
        self
    }

    /// Queue a transport failure for `url_path`.
    pub fn fail(mut self, url_path: &str, message: impl Into<String>) -> Self {
        self.push(url_path, Err(message.into()));
        self
    }

    fn push(&mut self, url_path: &str, answer: Result<Value, String>) {
        self.answers
            .entry(url_path.to_string())
            .or_default()
            .push_back(answer);
    }

    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    pub fn calls_to(&self, url_path: &str) -> usize {
        self.requests
            .iter()
            .filter(|r| r.url_path == url_path)
            .count()
    }
}

impl ChorusTransport for ReplayTransport {
    fn post(
        &mut self,
        _params: &ApiParams,
        url_path: &str,
        payload: &Value,
    ) -> Result<Value, ChorusError> {
        self.requests.push(RecordedRequest {
            url_path: url_path.to_string(),
            payload: payload.clone(),
        });

        let queue = self
            .answers
            .get_mut(url_path)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ChorusError::Transport(format!("no answer scripted for {url_path}")))?;
        let answer = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match answer {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ChorusError::Transport(message)),
            None => Err(ChorusError::Transport(format!(
                "no answer scripted for {url_path}"
            ))),
        }
    }
}
