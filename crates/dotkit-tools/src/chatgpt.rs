//! ChatGPT data export (`conversations.json`) to one Markdown file per
//! conversation.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use dotkit_core::{Result, atomic_write};

#[derive(Debug, Deserialize)]
pub struct Conversation {
    pub title: Option<String>,
    #[serde(default)]
    pub mapping: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Node {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    author: Author,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Author {
    role: String,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Value>,
}

/// First 25 characters of the title with spaces, dots and colons removed.
pub fn file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .take(25)
        .filter(|c| !matches!(c, ' ' | '.' | ':' | '/'))
        .collect();
    format!("{stem}.md")
}

/// Markdown for one conversation, messages in export order.
pub fn render_conversation(title: &str, conversation: &Conversation) -> String {
    let mut blocks = vec![format!("# {title}\n\n")];
    for node in conversation.mapping.values() {
        let Ok(node) = serde_json::from_value::<Node>(node.clone()) else {
            debug!("skipping malformed mapping node");
            continue;
        };
        let Some(message) = node.message else {
            continue;
        };
        let heading = if message.author.role == "user" { "### Me:\n" } else { "### GPT:\n" };
        // Non-text parts (images, tool payloads) are left out.
        for part in message.content.parts.iter().filter_map(Value::as_str) {
            blocks.push(heading.to_string());
            blocks.push(format!("{}\n", part.replace("\\n", "\n").trim()));
        }
    }
    blocks.join("\n\n")
}

/// Write a Markdown file into `out_dir` for every titled conversation in
/// `input`. Returns the written paths.
pub fn export(input: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let raw = std::fs::read_to_string(input)?;
    let conversations: Vec<Conversation> = serde_json::from_str(&raw)?;

    let mut written = Vec::new();
    for conversation in &conversations {
        let Some(title) = conversation.title.as_deref() else {
            continue;
        };
        let path = out_dir.join(file_name(title));
        atomic_write(&path, &render_conversation(title, conversation))?;
        written.push(path);
    }
    info!(count = written.len(), dir = %out_dir.display(), "conversations exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Rust: async traits vs. generics in 2024"), "Rustasynctraitsvsge.md");
        assert_eq!(file_name("a/b"), "ab.md");
    }

    #[test]
    fn test_render_conversation() {
        let conv: Conversation = serde_json::from_str(
            r#"{
                "title": "Hello",
                "mapping": {
                    "root": {"message": null},
                    "a": {"message": {"author": {"role": "user"}, "content": {"parts": ["Hi\\nthere "]}}},
                    "b": {"message": {"author": {"role": "assistant"}, "content": {"parts": ["Hello!", {"image": 1}]}}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            render_conversation("Hello", &conv),
            "# Hello\n\n\n\n### Me:\n\n\nHi\nthere\n\n\n### GPT:\n\n\nHello!\n"
        );
    }
}
