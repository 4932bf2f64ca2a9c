//! Scripted in-memory transport for tests

use super::traits::*;
use crate::error::SearchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

enum Step {
    Page(Page),
    Fail(String),
}

/// Pauses a term's fetch until released
#[derive(Clone, Default)]
pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Answers `(term, cursor)` pairs from a fixed script and records every call
#[derive(Default)]
pub struct ScriptedTransport {
    steps: HashMap<(String, Option<String>), Step>,
    gates: HashMap<String, Gate>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, term: &str, cursor: Option<&str>, page: Page) -> Self {
        self.steps
            .insert((term.to_string(), cursor.map(String::from)), Step::Page(page));
        self
    }

    pub fn fail(mut self, term: &str, cursor: Option<&str>, message: &str) -> Self {
        self.steps.insert(
            (term.to_string(), cursor.map(String::from)),
            Step::Fail(message.to_string()),
        );
        self
    }

    /// Hold every fetch for `term` until the returned gate is released
    pub fn gate(&mut self, term: &str) -> Gate {
        self.gates.entry(term.to_string()).or_default().clone()
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&self, term: &str, cursor: Option<&str>) -> Result<Page, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((term.to_string(), cursor.map(String::from)));

        if let Some(gate) = self.gates.get(term) {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        match self.steps.get(&(term.to_string(), cursor.map(String::from))) {
            Some(Step::Page(page)) => Ok(page.clone()),
            Some(Step::Fail(message)) => Err(SearchError::Transport(message.clone())),
            None => Err(SearchError::MalformedPage(format!(
                "no scripted page for {term:?} after {cursor:?}"
            ))),
        }
    }
}
