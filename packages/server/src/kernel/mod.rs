//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;
pub mod youtube_client;

pub use deps::{GeminiTitleGenerator, ResendAdapter, ServerDeps};
pub use test_dependencies::TestDependencies;
pub use traits::*;
pub use youtube_client::{YouTubeClient, DEFAULT_YOUTUBE_API_BASE_URL};
