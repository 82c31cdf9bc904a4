//! Per-article AI summary and impact inference.

use crate::api::{AskAsync, ChatMessage};
use crate::error::Result;
use crate::models::{Article, Summary};
use tracing::{info, instrument};

pub const SYSTEM_PROMPT: &str = "You are a professional news analyst who writes concise, \
incisive news summaries and inferences.";

/// The user message for one article.
pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "Here is a news headline: \"{title}\"\n\
         Content summary: \"{body}\"\n\
         \n\
         Write a **short summary** (1-2 sentences) and a **short inference** \
         (1 sentence) about the impact this news could have on the world or \
         on a particular field."
    )
}

#[derive(Debug)]
pub struct Summarizer<A> {
    client: A,
}

impl<A: AskAsync> Summarizer<A> {
    pub fn new(client: A) -> Self {
        Self { client }
    }

    /// Ask the model about `article`. Errors from the completion call are
    /// returned untouched; the caller decides what a failed article means
    /// for the run.
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    pub async fn summarize(&self, article: &Article) -> Result<Summary> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(&article.title, article.body())),
        ];
        let text = self.client.ask(&messages).await?;
        let ai_text = text.trim().to_string();
        info!(bytes = ai_text.len(), "Summarized article");
        Ok(Summary {
            article_url: article.url.clone(),
            ai_text,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::Role;
    use crate::error::DigestError;
    use crate::models::PLACEHOLDER_BODY;
    use std::sync::Mutex;

    /// Records every conversation and answers with a canned reply, or fails
    /// once `fail_after` calls have succeeded.
    #[derive(Debug, Default)]
    pub(crate) struct FakeAsk {
        pub calls: Mutex<Vec<Vec<ChatMessage>>>,
        pub reply: String,
        pub fail_after: Option<usize>,
    }

    impl FakeAsk {
        pub(crate) fn replying(reply: &str) -> Self {
            Self { reply: reply.to_string(), ..Default::default() }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl AskAsync for &FakeAsk {
        async fn ask(&self, messages: &[ChatMessage]) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            if self.fail_after.is_some_and(|n| calls.len() >= n) {
                return Err(DigestError::EmptyCompletion);
            }
            calls.push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_summarize_sends_system_and_user_messages() {
        let fake = FakeAsk::replying("  Summary. Impact.  \n");
        let summarizer = Summarizer::new(&fake);
        let article = Article {
            title: "Rates cut".to_string(),
            description: Some("Central bank cuts rates".to_string()),
            url: "https://example.com/rates".to_string(),
            ..Default::default()
        };

        let summary = summarizer.summarize(&article).await.unwrap();
        assert_eq!(summary.ai_text, "Summary. Impact.");
        assert_eq!(summary.article_url, "https://example.com/rates");

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let messages = &calls[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("\"Rates cut\""));
        assert!(messages[1].content.contains("\"Central bank cuts rates\""));
    }

    #[tokio::test]
    async fn test_summarize_uses_placeholder_without_text() {
        let fake = FakeAsk::replying("ok");
        let summarizer = Summarizer::new(&fake);
        let article = Article {
            title: "Bare".to_string(),
            ..Default::default()
        };

        summarizer.summarize(&article).await.unwrap();
        let calls = fake.calls.lock().unwrap();
        assert!(calls[0][1].content.contains(PLACEHOLDER_BODY));
        assert!(!calls[0][1].content.contains("\"\""));
    }

    #[tokio::test]
    async fn test_summarize_propagates_errors() {
        let fake = FakeAsk { fail_after: Some(0), ..Default::default() };
        let summarizer = Summarizer::new(&fake);
        let result = summarizer.summarize(&Article::default()).await;
        assert!(matches!(result, Err(DigestError::EmptyCompletion)));
    }

    #[test]
    fn test_build_prompt_mentions_summary_and_inference() {
        let prompt = build_prompt("T", "B");
        assert!(prompt.contains("\"T\""));
        assert!(prompt.contains("\"B\""));
        assert!(prompt.contains("1-2 sentences"));
        assert!(prompt.contains("1 sentence"));
    }
}
