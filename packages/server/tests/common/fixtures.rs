//! Test fixtures for scripting the mock collaborators.

use title_doctor::domains::jobs::Video;
use title_doctor::kernel::test_dependencies::{
    sample_videos, MockAI, MockChannelResolver, MockVideoLister,
};
use title_doctor::kernel::TestDependencies;

/// Mocks for one job that goes all the way to `email_sent`.
pub fn happy_path_deps(channel_id: &str, channel_name: &str, video_count: usize) -> (TestDependencies, Vec<Video>) {
    let videos = sample_videos(video_count);
    let deps = TestDependencies::new()
        .mock_resolver(MockChannelResolver::new().with_channel(channel_id, channel_name))
        .mock_videos(MockVideoLister::new().with_videos(videos.clone()))
        .mock_ai(MockAI::new().with_titles_for(&videos));
    (deps, videos)
}

/// Raw `submitted` payload as it would arrive at the bus boundary.
pub fn submitted_payload(job_id: impl std::fmt::Display, channel: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "jobId": job_id.to_string(),
        "channel": channel,
        "email": email,
    })
}
