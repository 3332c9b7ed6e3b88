//! Answer synthesis over retrieved snippets via an OpenAI-compatible
//! chat completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::language::SupportedLanguage;

const SYSTEM_TONE: &str = "You are the Focus Squad site assistant. Answer ONLY with information \
found in the provided context snippets. Never guess, never cite outside knowledge, and keep \
responses concise, motivating, and playful. Encourage the user to keep studying and gently \
remind them that you only cover this website. Do not mention internal tools or the retrieval \
pipeline. Avoid citations and source lists.";

/// Snippet metadata carried alongside each validated vector match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetMeta {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub chunk: String,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub question: String,
    pub language: SupportedLanguage,
    pub contexts: Vec<SnippetMeta>,
    pub memory: Vec<String>,
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build_system_message(language: SupportedLanguage) -> String {
    format!("{} Always reply in {}.", SYSTEM_TONE, language.label())
}

fn build_user_prompt(request: &GenerationRequest) -> String {
    let snippets = request
        .contexts
        .iter()
        .enumerate()
        .map(|(index, meta)| {
            let title = meta.title.as_deref().unwrap_or("Untitled section");
            format!(
                "Snippet {} ({} | {}): {}",
                index + 1,
                title,
                meta.url,
                collapse_whitespace(&meta.chunk)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut sections = vec![format!("Language: {}", request.language.label())];
    if !request.memory.is_empty() {
        let notes = request
            .memory
            .iter()
            .map(|m| m.trim())
            .collect::<Vec<_>>()
            .join("\n- ");
        sections.push(format!("User background notes:\n- {}", notes));
    }
    sections.push("Use these context snippets from the site:".to_string());
    sections.push(snippets);
    sections.push(format!("Question: {}", request.question));
    sections.push(
        "Answer using only the snippets. Keep the tone motivating and playful, cheer the user \
         on, and never add citations or URLs."
            .to_string(),
    );
    sections.join("\n\n")
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

pub struct OpenAiGeneration {
    base_url: String,
    api_key: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiGeneration {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl GenerationService for OpenAiGeneration {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_system_message(request.language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(request),
                },
            ],
        };
        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Generation request failed: {}", e))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Generation backend returned {}: {}", status, text));
        }
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse generation response: {}", e))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content.trim().to_string())
            .filter(|text| !text.is_empty());
        content.ok_or_else(|| anyhow::anyhow!("Generation response contained no text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            question: "How do focus rooms work?".to_string(),
            language: SupportedLanguage::En,
            contexts: vec![SnippetMeta {
                url: "https://example.com/rooms".to_string(),
                title: Some("Focus rooms".to_string()),
                chunk: "Rooms  pair you\n with a study buddy.".to_string(),
            }],
            memory: vec!["name: Alice".to_string()],
        }
    }

    #[test]
    fn test_user_prompt_layout() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.starts_with("Language: English"));
        assert!(prompt.contains("User background notes:\n- name: Alice"));
        assert!(prompt.contains(
            "Snippet 1 (Focus rooms | https://example.com/rooms): Rooms pair you with a study buddy."
        ));
        assert!(prompt.contains("Question: How do focus rooms work?"));
    }

    #[test]
    fn test_prompt_without_memory_or_title() {
        let mut req = request();
        req.memory.clear();
        req.contexts[0].title = None;
        let prompt = build_user_prompt(&req);
        assert!(!prompt.contains("User background notes"));
        assert!(prompt.contains("Snippet 1 (Untitled section |"));
    }

    #[test]
    fn test_system_message_names_reply_language() {
        let message = build_system_message(SupportedLanguage::Ru);
        assert!(message.ends_with("Always reply in Russian."));
    }
}
