// TestDependencies - mock implementations for testing
//
// Provides scripted mock collaborators that can be injected into ServerDeps
// for tests. Each mock records its calls; scripted responses are consumed in
// order and a default is returned once the script runs out.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use super::{
    BaseAI, BaseChannelResolver, BaseEmailSender, BaseVideoLister, ChannelQuery, EmailMessage,
    ResolvedChannel, ServerDeps,
};
use crate::domains::jobs::models::Video;
use crate::domains::jobs::store::JobStore;

/// Scripted outcome: a value or an error message to fail with.
type Scripted<T> = Result<T, String>;

fn next_scripted<T>(script: &Mutex<Vec<Scripted<T>>>) -> Option<Scripted<T>> {
    let mut script = script.lock().unwrap();
    if script.is_empty() {
        None
    } else {
        Some(script.remove(0))
    }
}

/// `count` videos, newest first, with ids `vid1..vidN`.
pub fn sample_videos(count: usize) -> Vec<Video> {
    let newest = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
    (1..=count)
        .map(|n| {
            let video_id = format!("vid{}", n);
            Video {
                url: format!("https://www.youtube.com/watch?v={}", video_id),
                thumbnail_url: format!("https://i.ytimg.com/vi/{}/default.jpg", video_id),
                title: format!("Original title {}", n),
                published_at: newest - Duration::days(n as i64 - 1),
                video_id,
            }
        })
        .collect()
}

/// A well-formed title-generation reply for `videos`.
pub fn titles_json(videos: &[Video]) -> String {
    let titles: Vec<serde_json::Value> = videos
        .iter()
        .map(|v| {
            serde_json::json!({
                "original": v.title,
                "improved": format!("Better: {}", v.title),
                "rational": "Adds a hook and a clearer promise",
            })
        })
        .collect();
    serde_json::json!({ "titles": titles }).to_string()
}

// =============================================================================
// Mock Channel Resolver
// =============================================================================

pub struct MockChannelResolver {
    responses: Arc<Mutex<Vec<Scripted<Option<ResolvedChannel>>>>>,
    calls: Arc<Mutex<Vec<ChannelQuery>>>,
}

impl MockChannelResolver {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Resolve the next lookup to this channel
    pub fn with_channel(self, channel_id: &str, channel_name: &str) -> Self {
        self.responses.lock().unwrap().push(Ok(Some(ResolvedChannel {
            channel_id: channel_id.to_string(),
            channel_name: channel_name.to_string(),
        })));
        self
    }

    /// The next lookup matches nothing
    pub fn with_no_match(self) -> Self {
        self.responses.lock().unwrap().push(Ok(None));
        self
    }

    /// The next lookup fails
    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Get all lookups that were made
    pub fn calls(&self) -> Vec<ChannelQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseChannelResolver for MockChannelResolver {
    async fn resolve(&self, query: &ChannelQuery) -> Result<Option<ResolvedChannel>> {
        self.calls.lock().unwrap().push(query.clone());

        match next_scripted(&self.responses) {
            Some(Ok(resolved)) => Ok(resolved),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Mock Video Lister
// =============================================================================

pub struct MockVideoLister {
    responses: Arc<Mutex<Vec<Scripted<Vec<Video>>>>>,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockVideoLister {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_videos(self, videos: Vec<Video>) -> Self {
        self.responses.lock().unwrap().push(Ok(videos));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Get all `(channel_id, max_results)` pairs that were requested
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseVideoLister for MockVideoLister {
    async fn list_recent(&self, channel_id: &str, max_results: usize) -> Result<Vec<Video>> {
        self.calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), max_results));

        match next_scripted(&self.responses) {
            Some(Ok(videos)) => Ok(videos),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Mock AI (Generic LLM capabilities)
// =============================================================================

/// Prompt pair captured from a completion call
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<Scripted<String>>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(Ok(response.into()));
        self
    }

    /// Reply with well-formed improved titles for `videos`
    pub fn with_titles_for(self, videos: &[Video]) -> Self {
        self.with_response(titles_json(videos))
    }

    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last user prompt sent to the AI
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.user_prompt.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        match next_scripted(&self.responses) {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(String::new()),
        }
    }
}

// =============================================================================
// Mock Email Sender
// =============================================================================

pub struct MockEmailSender {
    failures: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self {
            failures: Arc::new(Mutex::new(Vec::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the next send with this message
    pub fn with_error(self, message: &str) -> Self {
        self.failures.lock().unwrap().push(message.to_string());
        self
    }

    /// Get all messages that were accepted
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseEmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(anyhow::anyhow!(failures.remove(0)));
        }
        drop(failures);

        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub jobs: JobStore,
    pub channel_resolver: Arc<MockChannelResolver>,
    pub video_lister: Arc<MockVideoLister>,
    pub ai: Arc<MockAI>,
    pub email_sender: Arc<MockEmailSender>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            jobs: JobStore::in_memory(),
            channel_resolver: Arc::new(MockChannelResolver::new()),
            video_lister: Arc::new(MockVideoLister::new()),
            ai: Arc::new(MockAI::new()),
            email_sender: Arc::new(MockEmailSender::new()),
        }
    }

    /// Set a mock channel resolver
    pub fn mock_resolver(mut self, resolver: MockChannelResolver) -> Self {
        self.channel_resolver = Arc::new(resolver);
        self
    }

    /// Set a mock video lister
    pub fn mock_videos(mut self, lister: MockVideoLister) -> Self {
        self.video_lister = Arc::new(lister);
        self
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock email sender
    pub fn mock_email(mut self, sender: MockEmailSender) -> Self {
        self.email_sender = Arc::new(sender);
        self
    }

    /// Convert to ServerDeps, sharing the mocks so calls stay inspectable.
    pub fn into_server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.jobs.clone(),
            self.channel_resolver.clone(),
            self.video_lister.clone(),
            self.ai.clone(),
            self.email_sender.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MockChannelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MockVideoLister {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MockEmailSender {
    fn default() -> Self {
        Self::new()
    }
}
