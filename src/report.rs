//! Presentation of a finished run: log previews, statistics, and the saved
//! plain-text report.

use crate::error::{PipelineError, Result};
use crate::types::GeneratedContent;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Characters of the blog post shown when logging.
pub const PREVIEW_CHARS: usize = 200;

const RULE_WIDTH: usize = 80;

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Length figures shown after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStats {
    pub blog_post_words: usize,
    pub social_post_chars: usize,
}

impl ContentStats {
    pub fn of(content: &GeneratedContent) -> Self {
        Self {
            blog_post_words: content.blog_post.split_whitespace().count(),
            social_post_chars: content.social_post.chars().count(),
        }
    }
}

/// Log each stage's output. Only the blog post is shortened.
pub fn log_results(content: &GeneratedContent) {
    let rule = "=".repeat(RULE_WIDTH);
    info!("{}", rule);
    info!("Intermediate results:");
    info!("[STEP 1] Blog post idea:\n{}", content.blog_idea);
    info!(
        "[STEP 2] Blog post:\n{}",
        preview(&content.blog_post, PREVIEW_CHARS)
    );
    info!("[STEP 3] Social media post:\n{}", content.social_post);
    info!("{}", rule);
}

/// Render the plain-text report for `content`, stamped with `generated_at`.
pub fn render_document(content: &GeneratedContent, generated_at: &DateTime<Local>) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut doc = String::new();
    doc.push_str(&format!("{}\n", heavy));
    doc.push_str("GENERATED CONTENT\n");
    doc.push_str(&format!(
        "Date: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    doc.push_str(&format!("Topic: {}\n", content.topic));
    doc.push_str(&format!("Style: {}\n", content.style));
    doc.push_str(&format!("{}\n\n", heavy));

    let sections = [
        ("STEP 1: BLOG POST IDEA", &content.blog_idea, "\n\n"),
        ("STEP 2: BLOG POST", &content.blog_post, "\n\n"),
        ("STEP 3: SOCIAL MEDIA POST", &content.social_post, "\n"),
    ];
    for (title, body, trailer) in sections {
        doc.push_str(&format!("{}\n{}\n{}{}", title, light, body, trailer));
    }

    doc
}

/// Write a report for `content` into `dir`, creating the directory if needed.
///
/// Files are named `content_YYYYMMDD_HHMMSS.txt`; a numeric suffix is added
/// when a file for the same second already exists.
pub fn save(dir: &Path, content: &GeneratedContent) -> Result<PathBuf> {
    let now = Local::now();
    let persist_err = |path: &Path, source| PipelineError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(|e| persist_err(dir, e))?;

    let stem = format!("content_{}", now.format("%Y%m%d_%H%M%S"));
    let document = render_document(content, &now);

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{}.txt", stem)
        } else {
            format!("{}_{}.txt", stem, attempt)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(document.as_bytes())
                    .map_err(|e| persist_err(&path, e))?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(persist_err(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Style;
    use chrono::TimeZone;

    fn sample() -> GeneratedContent {
        GeneratedContent {
            topic: "space travel".to_string(),
            style: Style::Humorous,
            blog_idea: "Packing for Mars".to_string(),
            blog_post: "word ".repeat(250),
            social_post: "Mars awaits! #space".to_string(),
            saved_to: None,
        }
    }

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("short", 200), "short");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "ж".repeat(201);
        let p = preview(&text, 200);
        assert_eq!(p.chars().count(), 203);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_exact_length_untouched() {
        let text = "a".repeat(200);
        assert_eq!(preview(&text, 200), text);
    }

    #[test]
    fn test_stats() {
        let stats = ContentStats::of(&sample());
        assert_eq!(stats.blog_post_words, 250);
        assert_eq!(stats.social_post_chars, 19);
    }

    #[test]
    fn test_render_document_layout() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let content = sample();
        let doc = render_document(&content, &at);

        assert!(doc.starts_with(&format!("{}\nGENERATED CONTENT\n", "=".repeat(80))));
        assert!(doc.contains("Date: 2024-03-01 09:30:00\n"));
        assert!(doc.contains("Topic: space travel\n"));
        assert!(doc.contains("Style: humorous\n"));
        assert!(doc.contains(&format!("STEP 2: BLOG POST\n{}\n", "-".repeat(80))));
        // Full blog post, never the preview.
        assert!(doc.contains(&content.blog_post));
        assert!(doc.ends_with("Mars awaits! #space\n"));
    }
}
