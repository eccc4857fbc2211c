//! Title-generation prompt and response parsing.
//!
//! One request covers every fetched video. The model is asked for a JSON
//! object whose `titles` array is in the same order as the numbered list in
//! the prompt; anything else is a [`TitleParseError`] for the whole batch.

use serde::Deserialize;
use thiserror::Error;

use crate::domains::jobs::models::{ImprovedTitle, Video};

pub const TITLE_SYSTEM_PROMPT: &str =
    "You are a youtube SEO and engagement expert who helps creators write better youtube titles";

/// Build the user prompt listing every original title.
pub fn title_prompt(channel_name: &str, videos: &[Video]) -> String {
    let numbered = videos
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}. \"{}\"", i + 1, v.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a youtube title optimization expert. Below are {count} video titles from a youtube channel named "{channel_name}".
For each title, provide:
1. An improved version that is more engaging, SEO-friendly and likely to get more clicks.
2. A brief rationale (in 10 words or less) explaining why the new title is better.

Guidelines:
- Keep the core meaning of the original title.
- Use action verbs, numbers, and specific value propositions.
- Make it curious and clickable without being clickbait.
- Optimize for relevant keywords.

Here are the original titles:
{numbered}

Respond in the following JSON format, with exactly {count} entries in the same order:
{{
  "titles": [
    {{
      "original": "...",
      "improved": "...",
      "rational": "..."
    }}
  ]
}}"#,
        count = videos.len(),
    )
}

/// Expected response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleSuggestions {
    pub titles: Vec<TitleSuggestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleSuggestion {
    pub original: String,
    pub improved: String,
    #[serde(alias = "rationale")]
    pub rational: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleParseError {
    #[error("Empty response from Gemini API")]
    EmptyResponse,

    #[error("response is not valid title JSON: {0}")]
    InvalidJson(String),

    #[error("expected {expected} titles, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("title {index} has a blank `{field}`")]
    BlankField { index: usize, field: &'static str },
}

/// Remove ```json / ``` fences the model sometimes wraps its answer in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the model's answer and pair each suggestion with its video's URL.
pub fn parse_improved_titles(
    raw: &str,
    videos: &[Video],
) -> Result<Vec<ImprovedTitle>, TitleParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(TitleParseError::EmptyResponse);
    }

    let parsed: TitleSuggestions = serde_json::from_str(&cleaned)
        .map_err(|e| TitleParseError::InvalidJson(e.to_string()))?;

    if parsed.titles.len() != videos.len() {
        return Err(TitleParseError::CountMismatch {
            expected: videos.len(),
            actual: parsed.titles.len(),
        });
    }

    parsed
        .titles
        .into_iter()
        .zip(videos)
        .enumerate()
        .map(|(index, (suggestion, video))| {
            for (field, value) in [
                ("original", &suggestion.original),
                ("improved", &suggestion.improved),
                ("rational", &suggestion.rational),
            ] {
                if value.trim().is_empty() {
                    return Err(TitleParseError::BlankField { index, field });
                }
            }
            Ok(ImprovedTitle {
                original: suggestion.original,
                improved: suggestion.improved,
                rationale: suggestion.rational,
                url: video.url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn videos(n: usize) -> Vec<Video> {
        (1..=n)
            .map(|i| Video {
                video_id: format!("id{}", i),
                title: format!("Original {}", i),
                published_at: Utc::now(),
                url: format!("https://www.youtube.com/watch?v=id{}", i),
                thumbnail_url: String::new(),
            })
            .collect()
    }

    fn reply(n: usize) -> String {
        let titles: Vec<_> = (1..=n)
            .map(|i| {
                serde_json::json!({
                    "original": format!("Original {}", i),
                    "improved": format!("Improved {}", i),
                    "rational": "Stronger verb and a number",
                })
            })
            .collect();
        serde_json::json!({ "titles": titles }).to_string()
    }

    #[test]
    fn test_prompt_numbers_and_quotes_titles() {
        let prompt = title_prompt("Chan", &videos(2));

        assert!(prompt.contains("Below are 2 video titles"));
        assert!(prompt.contains("named \"Chan\""));
        assert!(prompt.contains("1. \"Original 1\"\n2. \"Original 2\""));
        assert!(prompt.contains("\"titles\": ["));
    }

    #[test]
    fn test_parse_pairs_urls_by_index() {
        let videos = videos(3);
        let titles = parse_improved_titles(&reply(3), &videos).unwrap();

        assert_eq!(titles.len(), 3);
        for (title, video) in titles.iter().zip(&videos) {
            assert_eq!(title.url, video.url);
        }
        assert_eq!(titles[1].improved, "Improved 2");
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let fenced = format!("```json\n{}\n```", reply(1));
        let titles = parse_improved_titles(&fenced, &videos(1)).unwrap();
        assert_eq!(titles[0].rationale, "Stronger verb and a number");
    }

    #[test]
    fn test_parse_accepts_rationale_spelling() {
        let raw = r#"{"titles":[{"original":"a","improved":"b","rationale":"c"}]}"#;
        let titles = parse_improved_titles(raw, &videos(1)).unwrap();
        assert_eq!(titles[0].rationale, "c");
    }

    #[test]
    fn test_parse_empty_response() {
        assert_eq!(
            parse_improved_titles("  ```json``` ", &videos(1)),
            Err(TitleParseError::EmptyResponse)
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_improved_titles("Sure! Here are your titles", &videos(1)).unwrap_err();
        assert!(matches!(err, TitleParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_missing_field_is_invalid() {
        let raw = r#"{"titles":[{"original":"a","improved":"b"}]}"#;
        let err = parse_improved_titles(raw, &videos(1)).unwrap_err();
        assert!(matches!(err, TitleParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_count_mismatch() {
        assert_eq!(
            parse_improved_titles(&reply(4), &videos(5)),
            Err(TitleParseError::CountMismatch {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_parse_blank_field() {
        let raw = r#"{"titles":[{"original":"a","improved":" ","rational":"c"}]}"#;
        assert_eq!(
            parse_improved_titles(raw, &videos(1)),
            Err(TitleParseError::BlankField {
                index: 0,
                field: "improved"
            })
        );
    }
}
