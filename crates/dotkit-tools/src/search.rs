//! Web search through the Perplexity chat-completions API.

use serde_json::{Value, json};
use tracing::debug;

use dotkit_core::{DotkitError, Fetcher, Result};

pub const PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_MODEL: &str = "sonar";

const SYSTEM_PROMPT: &str = "Be precise and concise and return citations and sources.";

pub fn build_request(query: &str, model: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": query},
        ],
        "temperature": 0.2,
        "top_p": 0.9,
        "return_images": false,
        "return_related_questions": false,
        "search_recency_filter": "month",
        "top_k": 0,
        "stream": false,
        "presence_penalty": 0,
        "frequency_penalty": 1,
    })
}

/// `choices[0].message.content`, plus numbered citations when present.
pub fn extract_answer(body: &str) -> Result<String> {
    let data: Value = serde_json::from_str(body)?;
    let content = data
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| DotkitError::http("perplexity", "response has no answer"))?;

    let mut answer = content.trim().to_string();
    if let Some(citations) = data.get("citations").and_then(Value::as_array) {
        let urls: Vec<&str> = citations.iter().filter_map(Value::as_str).collect();
        if !urls.is_empty() {
            answer.push_str("\n\nSources:");
            for (i, url) in urls.iter().enumerate() {
                answer.push_str(&format!("\n[{}] {}", i + 1, url));
            }
        }
    }
    Ok(answer)
}

pub async fn search(fetcher: &dyn Fetcher, api_key: Option<&str>, query: &str, model: &str) -> Result<String> {
    let key = api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DotkitError::Config("no Perplexity API key (PPLX_API_KEY)".into()))?;
    if query.trim().is_empty() {
        return Err(DotkitError::InvalidInput("empty search query".into()));
    }
    debug!(model, "querying perplexity");
    let body = fetcher
        .post_json(PERPLEXITY_URL, Some(key), &build_request(query, model))
        .await?;
    extract_answer(&body)
}
