use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{BaseChannelResolver, BaseVideoLister, ChannelQuery, ResolvedChannel};
use crate::domains::jobs::models::Video;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client for channel lookup and recent uploads
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// List envelope shared by `search` and `channels`
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// `search?type=channel` item
#[derive(Debug, Deserialize)]
struct ChannelSearchItem {
    snippet: ChannelSearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSearchSnippet {
    channel_id: String,
    title: String,
}

/// `channels?forUsername=` item
#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
struct TitleSnippet {
    title: String,
}

/// `search?type=video` item
#[derive(Debug, Deserialize)]
struct VideoSearchItem {
    id: VideoRef,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRef {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeClient {
    /// Create a new YouTube client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_YOUTUBE_API_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at another host (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, resource))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send YouTube {} request", resource))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube API error {}: {}", status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse YouTube {} response", resource))
    }
}

#[async_trait]
impl BaseChannelResolver for YouTubeClient {
    async fn resolve(&self, query: &ChannelQuery) -> Result<Option<ResolvedChannel>> {
        // An empty search term matches whatever the API ranks first
        if query.is_empty() {
            return Ok(None);
        }

        let resolved = match query {
            ChannelQuery::Handle(handle) => {
                let response: ListResponse<ChannelSearchItem> = self
                    .get(
                        "search",
                        &[("part", "snippet"), ("type", "channel"), ("q", handle.as_str())],
                    )
                    .await?;
                response.items.into_iter().next().map(|item| ResolvedChannel {
                    channel_id: item.snippet.channel_id,
                    channel_name: item.snippet.title,
                })
            }
            ChannelQuery::Username(username) => {
                let response: ListResponse<ChannelItem> = self
                    .get(
                        "channels",
                        &[("part", "snippet"), ("forUsername", username.as_str())],
                    )
                    .await?;
                response.items.into_iter().next().map(|item| ResolvedChannel {
                    channel_id: item.id,
                    channel_name: item.snippet.title,
                })
            }
        };

        debug!(?query, found = resolved.is_some(), "YouTube channel lookup");
        Ok(resolved)
    }
}

#[async_trait]
impl BaseVideoLister for YouTubeClient {
    async fn list_recent(&self, channel_id: &str, max_results: usize) -> Result<Vec<Video>> {
        let max = max_results.to_string();
        let response: ListResponse<VideoSearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", channel_id),
                    ("maxResults", max.as_str()),
                    ("order", "date"),
                    ("type", "video"),
                ],
            )
            .await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(Video {
                    url: format!("https://www.youtube.com/watch?v={}", video_id),
                    video_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                    thumbnail_url: item
                        .snippet
                        .thumbnails
                        .default
                        .map(|t| t.url)
                        .unwrap_or_default(),
                })
            })
            .take(max_results)
            .collect();

        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn search(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        if q.get("key").map(String::as_str) != Some("yt-key") {
            return (StatusCode::FORBIDDEN, Json(json!({ "error": "bad key" })));
        }
        let body = match q.get("type").map(String::as_str) {
            Some("channel") if q.get("q").map(String::as_str) == Some("mkbhd") => json!({
                "items": [{ "snippet": { "channelId": "UC123", "title": "Marques Brownlee" } }]
            }),
            Some("channel") => json!({ "items": [] }),
            Some("video") => json!({
                "items": [
                    {
                        "id": { "kind": "youtube#video", "videoId": "abc" },
                        "snippet": {
                            "title": "Newest",
                            "publishedAt": "2024-05-02T10:00:00Z",
                            "thumbnails": { "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" } }
                        }
                    },
                    {
                        "id": { "kind": "youtube#video", "videoId": "def" },
                        "snippet": { "title": "Older", "publishedAt": "2024-05-01T10:00:00Z" }
                    }
                ]
            }),
            _ => return (StatusCode::BAD_REQUEST, Json(json!({}))),
        };
        (StatusCode::OK, Json(body))
    }

    async fn channels(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        match q.get("forUsername").map(String::as_str) {
            Some("legacyname") => Json(json!({
                "items": [{ "id": "UC999", "snippet": { "title": "Legacy" } }]
            })),
            _ => Json(json!({ "pageInfo": { "totalResults": 0 } })),
        }
    }

    async fn client(key: &str) -> YouTubeClient {
        let app = Router::new()
            .route("/search", get(search))
            .route("/channels", get(channels));
        let base = serve(app).await;
        YouTubeClient::new(key.to_string()).unwrap().with_base_url(base)
    }

    #[tokio::test]
    async fn test_resolve_handle() {
        let youtube = client("yt-key").await;
        let resolved = youtube
            .resolve(&ChannelQuery::Handle("mkbhd".into()))
            .await
            .unwrap();

        assert_eq!(
            resolved,
            Some(ResolvedChannel {
                channel_id: "UC123".into(),
                channel_name: "Marques Brownlee".into()
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_username() {
        let youtube = client("yt-key").await;
        let resolved = youtube
            .resolve(&ChannelQuery::Username("legacyname".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.channel_id, "UC999");
    }

    #[tokio::test]
    async fn test_resolve_without_items_is_no_match() {
        let youtube = client("yt-key").await;
        assert!(youtube
            .resolve(&ChannelQuery::Username("nonexistentxyz".into()))
            .await
            .unwrap()
            .is_none());
        assert!(youtube
            .resolve(&ChannelQuery::Handle("nobody".into()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolve_empty_handle_skips_request() {
        // Nothing listens here: any request would fail
        let youtube = YouTubeClient::new("yt-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        let resolved = youtube
            .resolve(&ChannelQuery::Handle(String::new()))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_list_recent_maps_videos() {
        let youtube = client("yt-key").await;
        let videos = youtube.list_recent("UC123", 5).await.unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_id, "abc");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(videos[0].thumbnail_url, "https://i.ytimg.com/vi/abc/default.jpg");
        assert_eq!(videos[1].thumbnail_url, "");
        assert!(videos[0].published_at > videos[1].published_at);
    }

    #[tokio::test]
    async fn test_list_recent_truncates() {
        let youtube = client("yt-key").await;
        assert_eq!(youtube.list_recent("UC123", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let youtube = client("wrong").await;
        let err = youtube.list_recent("UC123", 5).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
