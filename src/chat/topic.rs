//! Topic-based session naming.
//!
//! When a transcript is saved, the model itself is asked to summarize
//! the conversation into a short topic, which becomes the suffix of a
//! timestamped filename.  Naming must never prevent a save, so every
//! failure degrades to a `no-topic` suffix and a warning the caller may
//! surface.

use time::OffsetDateTime;

use crate::client::CompletionBackend;
use crate::error::Error;
use crate::observability::TOPIC_FALLBACKS;
use crate::types::{Message, Model};

const TOPIC_PROMPT: &str = "Summarize the topic of this conversation in at most 50 characters, \
using only letters, digits, underscores, and hyphens. \
Only output the session topic nothing else.";

const MAX_TOPIC_LEN: usize = 50;

/// The generated name, plus the error that forced a fallback if one did.
#[derive(Debug)]
pub struct TopicOutcome {
    pub name: String,
    pub warning: Option<Error>,
}

/// Names sessions by asking the completion backend for a topic.
pub struct TopicNamer<'a> {
    client: &'a dyn CompletionBackend,
}

impl<'a> TopicNamer<'a> {
    pub fn new(client: &'a dyn CompletionBackend) -> Self {
        Self { client }
    }

    /// Produces `<YYYY-MM-DD_HH-MM-SS>_<topic>` for the transcript.
    ///
    /// The transcript is read, never mutated; the topic request sees a
    /// copy with the summarization instruction appended.  This never
    /// fails: an unusable topic falls back to the `no-topic` suffix.
    pub async fn generate(&self, transcript: &[Message], model: &Model) -> TopicOutcome {
        let mut request = transcript.to_vec();
        request.push(Message::user(TOPIC_PROMPT));
        let (topic, warning) = match self.client.complete(model, &request).await {
            Ok(reply) => (sanitize_topic(&reply.content), None),
            Err(err) => (String::new(), Some(err)),
        };
        let topic = if topic.is_empty() {
            TOPIC_FALLBACKS.click();
            "no-topic".to_string()
        } else {
            topic
        };
        TopicOutcome {
            name: format!("{}_{topic}", timestamp(OffsetDateTime::now_utc())),
            warning,
        }
    }
}

/// `YYYY-MM-DD_HH-MM-SS`, safe for filenames on every platform.
fn timestamp(t: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        t.year(),
        u8::from(t.month()),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// Restricts the model's topic to `[A-Za-z0-9_-]`, mapping whitespace
/// runs to single hyphens and dropping everything else, capped at 50
/// characters.
fn sanitize_topic(raw: &str) -> String {
    let mut topic = String::new();
    let mut pending_hyphen = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_hyphen = !topic.is_empty();
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_hyphen {
                topic.push('-');
                pending_hyphen = false;
            }
            topic.push(c);
        }
        if topic.len() >= MAX_TOPIC_LEN {
            break;
        }
    }
    topic.truncate(MAX_TOPIC_LEN);
    topic
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::error::Result;

    use super::*;

    struct CannedTopic(&'static str);

    #[async_trait]
    impl CompletionBackend for CannedTopic {
        async fn complete(&self, _: &Model, _: &[Message]) -> Result<Message> {
            Ok(Message::assistant(self.0))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl CompletionBackend for AlwaysFails {
        async fn complete(&self, _: &Model, _: &[Message]) -> Result<Message> {
            Err(Error::connection("refused", None))
        }
    }

    fn model() -> Model {
        Model::from("gpt-4o-mini".to_string())
    }

    #[test]
    fn timestamps_are_zero_padded() {
        let t = OffsetDateTime::from_unix_timestamp(1_735_693_201).unwrap();
        assert_eq!(timestamp(t), "2025-01-01_01-00-01");
    }

    #[test]
    fn sanitize_keeps_safe_characters_only() {
        assert_eq!(sanitize_topic("rust error handling"), "rust-error-handling");
        assert_eq!(sanitize_topic("  Weather? in SF!  "), "Weather-in-SF");
        assert_eq!(sanitize_topic("###"), "");
        let long = "a".repeat(80);
        assert_eq!(sanitize_topic(&long).len(), MAX_TOPIC_LEN);
    }

    #[tokio::test]
    async fn topic_comes_from_the_model() {
        let client = CannedTopic("weather_in_sf");
        let namer = TopicNamer::new(&client);
        let outcome = namer.generate(&[Message::user("hi")], &model()).await;
        assert!(outcome.name.ends_with("_weather_in_sf"));
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_no_topic() {
        let client = AlwaysFails;
        let namer = TopicNamer::new(&client);
        let outcome = namer.generate(&[Message::user("hi")], &model()).await;
        assert!(outcome.name.ends_with("_no-topic"));
        assert!(outcome.warning.is_some());
    }

    #[tokio::test]
    async fn unusable_topic_falls_back_to_no_topic() {
        let client = CannedTopic("!!!???");
        let namer = TopicNamer::new(&client);
        let outcome = namer.generate(&[Message::user("hi")], &model()).await;
        assert!(outcome.name.ends_with("_no-topic"));
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn transcript_is_not_mutated() {
        let client = CannedTopic("topic");
        let namer = TopicNamer::new(&client);
        let transcript = vec![Message::user("hi")];
        let before = transcript.clone();
        namer.generate(&transcript, &model()).await;
        assert_eq!(transcript, before);
    }
}
