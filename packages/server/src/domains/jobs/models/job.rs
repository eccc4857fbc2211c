use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::JobId;

/// Job - one submitted channel + email pair tracked through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: JobId,
    pub channel: String,
    pub email: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Set once, on entry into a failure state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    // Channel resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    // Fetch + title generation (parallel sequences)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<Video>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improved_titles: Vec<ImprovedTitle>,
}

/// Summary of one uploaded video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub thumbnail_url: String,
}

/// Suggested replacement for one video title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovedTitle {
    pub original: String,
    pub improved: String,
    #[serde(rename = "rational", alias = "rationale")]
    pub rationale: String,
    pub url: String,
}

/// Pipeline status
///
/// ```text
/// queued → resolving_channel → fetching_videos → videos_fetched
///        → generating_ai_titles → ai_titles_ready → sending_email → email_sent
///
/// any non-terminal state → failed
/// sending_email          → email_error
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    ResolvingChannel,
    FetchingVideos,
    VideosFetched,
    GeneratingAiTitles,
    AiTitlesReady,
    SendingEmail,
    EmailSent,
    Failed,
    EmailError,
}

impl JobStatus {
    pub const ALL: [JobStatus; 10] = [
        JobStatus::Queued,
        JobStatus::ResolvingChannel,
        JobStatus::FetchingVideos,
        JobStatus::VideosFetched,
        JobStatus::GeneratingAiTitles,
        JobStatus::AiTitlesReady,
        JobStatus::SendingEmail,
        JobStatus::EmailSent,
        JobStatus::Failed,
        JobStatus::EmailError,
    ];

    /// No write is accepted once a job reaches one of these.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::EmailSent | JobStatus::Failed | JobStatus::EmailError
        )
    }

    pub fn is_failure(self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::EmailError)
    }

    /// Whether a job in `self` may move to `next`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (Queued, ResolvingChannel)
                | (ResolvingChannel, FetchingVideos)
                | (FetchingVideos, VideosFetched)
                | (VideosFetched, GeneratingAiTitles)
                | (GeneratingAiTitles, AiTitlesReady)
                | (AiTitlesReady, SendingEmail)
                | (SendingEmail, EmailSent)
                | (SendingEmail, EmailError)
                | (_, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::ResolvingChannel => "resolving_channel",
            JobStatus::FetchingVideos => "fetching_videos",
            JobStatus::VideosFetched => "videos_fetched",
            JobStatus::GeneratingAiTitles => "generating_ai_titles",
            JobStatus::AiTitlesReady => "ai_titles_ready",
            JobStatus::SendingEmail => "sending_email",
            JobStatus::EmailSent => "email_sent",
            JobStatus::Failed => "failed",
            JobStatus::EmailError => "email_error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid job status: {}", s))
    }
}

/// Rejected job mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job is already {0} and accepts no further changes")]
    Terminal(JobStatus),

    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("{titles} improved titles for {videos} videos")]
    TitleCountMismatch { videos: usize, titles: usize },

    #[error("improved title {index} does not point at video {index}")]
    TitleUrlMismatch { index: usize },
}

impl JobError {
    /// The job has already moved past the write: a duplicate or late delivery.
    ///
    /// Other rejections mean the data itself is inconsistent.
    pub fn is_stale(&self) -> bool {
        matches!(self, JobError::Terminal(_) | JobError::InvalidTransition { .. })
    }
}

impl Job {
    /// Create a queued job with a fresh identifier.
    pub fn new(channel: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: JobId::new(),
            channel: channel.into(),
            email: email.into(),
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            error: None,
            channel_id: None,
            channel_name: None,
            videos: Vec::new(),
            improved_titles: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `next` along the pipeline graph.
    pub fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        self.check_transition(next)?;
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn check_transition(&self, next: JobStatus) -> Result<(), JobError> {
        if self.status.is_terminal() {
            return Err(JobError::Terminal(self.status));
        }
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(())
    }

    /// Enter `failed` with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), JobError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(reason.into());
        Ok(())
    }

    /// Record the resolved channel. Status is left as is.
    pub fn record_channel(
        &mut self,
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
    ) -> Result<(), JobError> {
        if self.status.is_terminal() {
            return Err(JobError::Terminal(self.status));
        }
        self.channel_id = Some(channel_id.into());
        self.channel_name = Some(channel_name.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store the fetched videos and move to `videos_fetched`.
    pub fn record_videos(&mut self, videos: Vec<Video>) -> Result<(), JobError> {
        self.transition(JobStatus::VideosFetched)?;
        self.videos = videos;
        Ok(())
    }

    /// Store the improved titles and move to `ai_titles_ready`.
    ///
    /// Titles must pair one-to-one with the stored videos, by position and URL.
    pub fn record_titles(&mut self, titles: Vec<ImprovedTitle>) -> Result<(), JobError> {
        self.check_transition(JobStatus::AiTitlesReady)?;
        if titles.len() != self.videos.len() {
            return Err(JobError::TitleCountMismatch {
                videos: self.videos.len(),
                titles: titles.len(),
            });
        }
        if let Some(index) = titles
            .iter()
            .zip(&self.videos)
            .position(|(title, video)| title.url != video.url)
        {
            return Err(JobError::TitleUrlMismatch { index });
        }
        self.transition(JobStatus::AiTitlesReady)?;
        self.improved_titles = titles;
        Ok(())
    }

    /// Enter `email_error` with a reason.
    pub fn fail_email(&mut self, reason: impl Into<String>) -> Result<(), JobError> {
        self.transition(JobStatus::EmailError)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::*;

    const HAPPY_PATH: [JobStatus; 8] = [
        Queued,
        ResolvingChannel,
        FetchingVideos,
        VideosFetched,
        GeneratingAiTitles,
        AiTitlesReady,
        SendingEmail,
        EmailSent,
    ];

    fn video(id: &str) -> Video {
        Video {
            video_id: id.to_string(),
            title: format!("Title {}", id),
            published_at: Utc::now(),
            url: format!("https://www.youtube.com/watch?v={}", id),
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/default.jpg", id),
        }
    }

    fn job_at(status: JobStatus) -> Job {
        let mut job = Job::new("@chan", "a@b.com");
        job.status = status;
        job
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new("@mkbhd", "a@b.com");
        assert_eq!(job.status, Queued);
        assert!(job.error.is_none());
        assert!(job.videos.is_empty());
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn test_happy_path_walks_every_state() {
        let mut job = Job::new("@chan", "a@b.com");
        for next in &HAPPY_PATH[1..] {
            job.transition(*next).unwrap();
        }
        assert_eq!(job.status, EmailSent);
        assert!(job.is_terminal());
    }

    #[test]
    fn test_each_active_state_has_one_predecessor() {
        for (i, next) in HAPPY_PATH.iter().enumerate().skip(1) {
            let allowed: Vec<_> = JobStatus::ALL
                .into_iter()
                .filter(|from| from.can_transition_to(*next))
                .collect();
            assert_eq!(allowed, vec![HAPPY_PATH[i - 1]], "predecessors of {}", next);
        }
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        let mut job = job_at(FetchingVideos);
        assert_eq!(
            job.transition(ResolvingChannel),
            Err(JobError::InvalidTransition {
                from: FetchingVideos,
                to: ResolvingChannel
            })
        );
        assert!(job.transition(SendingEmail).is_err());
        assert_eq!(job.status, FetchingVideos);
    }

    #[test]
    fn test_failed_reachable_from_any_non_terminal_state() {
        for status in JobStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            let mut job = job_at(status);
            job.fail("boom").unwrap();
            assert_eq!(job.status, Failed);
            assert_eq!(job.error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn test_email_error_only_from_sending_email() {
        for status in JobStatus::ALL {
            let mut job = job_at(status);
            let result = job.fail_email("smtp down");
            assert_eq!(result.is_ok(), status == SendingEmail, "from {}", status);
        }
    }

    #[test]
    fn test_terminal_jobs_reject_every_write() {
        for status in [EmailSent, Failed, EmailError] {
            let mut job = job_at(status);
            assert_eq!(job.fail("again"), Err(JobError::Terminal(status)));
            assert_eq!(
                job.record_channel("UC1", "Chan"),
                Err(JobError::Terminal(status))
            );
            assert!(job.error.is_none());
        }
    }

    #[test]
    fn test_record_titles_requires_matching_count() {
        let mut job = job_at(FetchingVideos);
        job.record_videos(vec![video("a"), video("b")]).unwrap();
        job.transition(GeneratingAiTitles).unwrap();

        let one = vec![ImprovedTitle {
            original: "Title a".into(),
            improved: "Better a".into(),
            rationale: "why".into(),
            url: job.videos[0].url.clone(),
        }];
        assert_eq!(
            job.record_titles(one),
            Err(JobError::TitleCountMismatch {
                videos: 2,
                titles: 1
            })
        );
        assert_eq!(job.status, GeneratingAiTitles);
    }

    #[test]
    fn test_record_titles_requires_matching_urls() {
        let mut job = job_at(FetchingVideos);
        job.record_videos(vec![video("a"), video("b")]).unwrap();
        job.transition(GeneratingAiTitles).unwrap();

        let titles: Vec<ImprovedTitle> = ["a", "b"]
            .iter()
            .map(|id| ImprovedTitle {
                original: format!("Title {}", id),
                improved: format!("Better {}", id),
                rationale: "why".into(),
                url: format!("https://elsewhere.example/{}", id),
            })
            .collect();
        assert_eq!(
            job.record_titles(titles),
            Err(JobError::TitleUrlMismatch { index: 0 })
        );
        assert!(job.improved_titles.is_empty());
        assert_eq!(job.status, GeneratingAiTitles);
    }

    #[test]
    fn test_record_titles_on_finished_job_is_stale() {
        let mut job = job_at(Failed);
        let err = job.record_titles(Vec::new()).unwrap_err();
        assert_eq!(err, JobError::Terminal(Failed));
        assert!(err.is_stale());
        assert!(!JobError::TitleCountMismatch { videos: 2, titles: 1 }.is_stale());
        assert!(!JobError::TitleUrlMismatch { index: 0 }.is_stale());
    }

    #[test]
    fn test_status_string_forms() {
        for status in JobStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::json!(status.to_string()));
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("done".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_serializes_camel_case() {
        let mut job = job_at(FetchingVideos);
        job.record_videos(vec![video("a")]).unwrap();
        let value = serde_json::to_value(&job).unwrap();

        assert!(value.get("jobId").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["status"], "videos_fetched");
        assert_eq!(value["videos"][0]["videoId"], "a");
        assert!(value.get("improvedTitles").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_improved_title_accepts_both_rationale_spellings() {
        let a: ImprovedTitle = serde_json::from_value(serde_json::json!({
            "original": "o", "improved": "i", "rational": "r", "url": "u"
        }))
        .unwrap();
        let b: ImprovedTitle = serde_json::from_value(serde_json::json!({
            "original": "o", "improved": "i", "rationale": "r", "url": "u"
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap()["rational"], "r");
    }
}
