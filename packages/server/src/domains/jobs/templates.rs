//! Plain-text email rendering.

use crate::domains::jobs::models::ImprovedTitle;

const RULE_WIDTH: usize = 60;

pub fn email_subject(channel_name: &str) -> String {
    format!("Your Improved YouTube Titles for {}", channel_name)
}

/// Render the results email. Blocks follow the order of `titles`.
pub fn email_body(channel_name: &str, titles: &[ImprovedTitle]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut text = format!("Youtube Title Doctor - Improved Titles for {}\n", channel_name);
    text.push_str(&rule);
    text.push_str("\n\n");

    for (index, title) in titles.iter().enumerate() {
        text.push_str(&format!("Video {}:\n", index + 1));
        text.push_str("----------\n");
        text.push_str(&format!("Original: {}\n", title.original));
        text.push_str(&format!("Improved: {}\n\n", title.improved));
        text.push_str(&format!("Why : {}\n", title.rationale));
        text.push_str(&format!("Watch: {}\n\n", title.url));
    }

    text.push_str(&rule);
    text.push('\n');
    text
}
