//! Shared test utilities for the gbucketremove library crate.
//!
//! `MockStorage` is an in-memory `StorageTrait` implementation that pages its
//! listing, records every call and can be told to fail.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::Config;
use crate::remover::ConsoleSink;
use crate::safety::PromptHandler;
use crate::stage::Stage;
use crate::storage::StorageTrait;
use crate::types::error::PromptError;
use crate::types::token::create_drain_cancellation_token;
use crate::types::{DrainStatistics, ListPage, ObjectKey};

/// Initialise a dummy tracing subscriber for tests.
///
/// Uses `try_init` so that only the first call in a process actually
/// installs the subscriber; subsequent calls are silently ignored.
pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

/// Create a default [`Config`] suitable for most unit / property tests.
///
/// Key defaults: `worker_size=4`, no settle wait, one bucket `"test-bucket"`.
pub(crate) fn make_test_config() -> Config {
    Config {
        worker_size: 4,
        ..Config::for_buckets(&["test-bucket"])
    }
}

/// Build a [`Stage`] over `storage` with a fresh token and stats channel.
pub(crate) fn make_test_stage(
    config: Config,
    storage: MockStorage,
) -> (Stage, async_channel::Receiver<DrainStatistics>) {
    let (sender, receiver) = async_channel::unbounded();
    let stage = Stage::new(
        config,
        Box::new(storage),
        create_drain_cancellation_token(),
        sender,
    );
    (stage, receiver)
}

/// Object names `"{prefix}{0..count}"`, zero padded so they sort in order.
pub(crate) fn object_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i:05}")).collect()
}

#[derive(Debug, Default)]
struct MockState {
    objects: HashMap<String, Vec<String>>,
    refills: HashMap<String, VecDeque<Vec<String>>>,
    page_size: Option<usize>,
    list_calls: Vec<(String, Option<String>)>,
    delete_calls: Vec<ObjectKey>,
    failing_list_buckets: HashSet<String>,
    failing_objects: HashSet<String>,
    delete_delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory storage.
///
/// Listing returns `page_size` names per page (default 1000) with tokens
/// `"A"`, `"B"`, ... for the second, third, ... page. A successful delete
/// removes the object, so a later listing no longer sees it.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockStorage {
    state: Arc<Mutex<MockState>>,
}

impl MockStorage {
    pub fn with_objects(bucket: &str, objects: &[&str]) -> Self {
        let storage = Self::default();
        storage.add_objects(bucket, objects);
        storage
    }

    pub fn add_objects(&self, bucket: &str, objects: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .objects
            .entry(bucket.to_string())
            .or_default()
            .extend(objects.iter().map(|o| o.to_string()));
    }

    pub fn page_size(self, page_size: usize) -> Self {
        self.state.lock().unwrap().page_size = Some(page_size);
        self
    }

    /// Objects that appear in `bucket` at the start of every listing after
    /// the first one, one batch per listing. Simulates concurrent writers.
    pub fn refill_between_listings(self, bucket: &str, batches: Vec<Vec<&str>>) -> Self {
        self.state.lock().unwrap().refills.insert(
            bucket.to_string(),
            batches
                .into_iter()
                .map(|b| b.into_iter().map(|o| o.to_string()).collect())
                .collect(),
        );
        self
    }

    pub fn fail_list(self, bucket: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_list_buckets
            .insert(bucket.to_string());
        self
    }

    pub fn fail_delete(self, object: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_objects
            .insert(object.to_string());
        self
    }

    pub fn delete_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delete_delay = Some(delay);
        self
    }

    pub fn list_calls(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn list_calls_for(&self, bucket: &str) -> usize {
        self.list_calls()
            .iter()
            .filter(|(b, _)| b == bucket)
            .count()
    }

    pub fn delete_calls(&self) -> Vec<ObjectKey> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn delete_calls_for(&self, bucket: &str) -> usize {
        self.delete_calls()
            .iter()
            .filter(|k| k.bucket == bucket)
            .count()
    }

    pub fn remaining(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

fn page_token(page_index: usize) -> String {
    if page_index <= 26 {
        char::from(b'A' + (page_index - 1) as u8).to_string()
    } else {
        format!("P{page_index}")
    }
}

fn page_index(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii_uppercase() {
        return Some((bytes[0] - b'A') as usize + 1);
    }
    token.strip_prefix('P')?.parse().ok()
}

#[async_trait]
impl StorageTrait for MockStorage {
    async fn list_objects(&self, bucket: &str, page_token_in: Option<String>) -> Result<ListPage> {
        let mut state = self.state.lock().unwrap();
        let previous_listings = state
            .list_calls
            .iter()
            .filter(|(b, token)| b == bucket && token.is_none())
            .count();
        state
            .list_calls
            .push((bucket.to_string(), page_token_in.clone()));

        if state.failing_list_buckets.contains(bucket) {
            return Err(anyhow!("list failed: {bucket}"));
        }

        if page_token_in.is_none() && previous_listings > 0 {
            let refill = state
                .refills
                .get_mut(bucket)
                .and_then(|batches| batches.pop_front());
            if let Some(batch) = refill {
                state
                    .objects
                    .entry(bucket.to_string())
                    .or_default()
                    .extend(batch);
            }
        }

        let page = match &page_token_in {
            None => 0,
            Some(token) => page_index(token).ok_or_else(|| anyhow!("invalid page token: {token}"))?,
        };
        let page_size = state.page_size.unwrap_or(1000);
        let objects = state.objects.get(bucket).cloned().unwrap_or_default();

        let start = (page * page_size).min(objects.len());
        let end = (start + page_size).min(objects.len());
        let next_page_token = if end < objects.len() {
            Some(page_token(page + 1))
        } else {
            None
        };

        Ok(ListPage {
            object_names: objects[start..end].to_vec(),
            next_page_token,
        })
    }

    async fn delete_object(&self, key: &ObjectKey) -> Result<()> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.delete_calls.push(key.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.delete_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;

        if state.failing_objects.contains(&key.object) {
            return Err(anyhow!("delete failed: {key}"));
        }

        if let Some(objects) = state.objects.get_mut(&key.bucket) {
            objects.retain(|o| o != &key.object);
        }
        Ok(())
    }
}

/// Prompt handler answering from a fixed list and recording every question.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedPromptHandler {
    answers: Arc<Mutex<VecDeque<std::result::Result<String, PromptError>>>>,
    questions: Arc<Mutex<Vec<String>>>,
    warnings: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPromptHandler {
    pub fn new(answers: &[&str]) -> Self {
        let handler = Self::default();
        handler
            .answers
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| Ok(a.to_string())));
        handler
    }

    /// Append an error answer, e.g. end of input.
    pub fn then_error(self, error: PromptError) -> Self {
        self.answers.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

impl PromptHandler for ScriptedPromptHandler {
    fn read_answer(&self, question: &str) -> std::result::Result<String, PromptError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(PromptError::EndOfInput))
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

/// Console sink that keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturingConsole {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ConsoleSink for CapturingConsole {
    fn console_log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_tokens_round_trip_past_the_alphabet() {
        assert_eq!(page_token(1), "A");
        assert_eq!(page_token(2), "B");
        assert_eq!(page_index("A"), Some(1));
        assert_eq!(page_index(&page_token(40)), Some(40));
        assert_eq!(page_index("zz"), None);
    }

    #[tokio::test]
    async fn listing_pages_and_delete_removes() {
        let storage = MockStorage::with_objects("b", &["o1", "o2", "o3"]).page_size(2);

        let first = storage.list_objects("b", None).await.unwrap();
        assert_eq!(first.object_names, vec!["o1", "o2"]);
        assert_eq!(first.next_page_token.as_deref(), Some("A"));

        let second = storage.list_objects("b", first.next_page_token).await.unwrap();
        assert_eq!(second.object_names, vec!["o3"]);
        assert_eq!(second.next_page_token, None);

        storage.delete_object(&ObjectKey::new("b", "o2")).await.unwrap();
        assert_eq!(storage.remaining("b"), vec!["o1", "o3"]);
    }

    #[tokio::test]
    async fn refill_applies_from_second_listing() {
        let storage =
            MockStorage::default().refill_between_listings("b", vec![vec!["late"]]);

        assert!(storage.list_objects("b", None).await.unwrap().object_names.is_empty());
        assert_eq!(
            storage.list_objects("b", None).await.unwrap().object_names,
            vec!["late"]
        );
    }
}
