//! In-memory conversation state.
//!
//! A [`ChatSession`] owns the transcript, the live settings derived
//! from [`Config`](crate::chat::Config), and any attachments staged for
//! the next turn.  It drives the completion client and hands output to
//! a [`Renderer`], but knows nothing about the terminal loop itself.

use futures::StreamExt;

use crate::chat::config::Config;
use crate::client::OpenAi;
use crate::error::Result;
use crate::ingest::Attachment;
use crate::render::Renderer;
use crate::types::{ChatCompletionParams, Message, Model, Role};

/// One interactive conversation.
pub struct ChatSession {
    config: Config,
    transcript: Vec<Message>,
    attached_files: Vec<String>,
    file_contents: String,
}

impl ChatSession {
    /// Starts a fresh session seeded with the config's developer message.
    pub fn new(config: Config) -> Self {
        let transcript = vec![config.messages.clone()];
        Self {
            config,
            transcript,
            attached_files: Vec::new(),
            file_contents: String::new(),
        }
    }

    /// Discards the transcript and attachments, reseeding from `config`.
    pub fn reset(&mut self, config: Config) {
        *self = ChatSession::new(config);
    }

    pub fn model(&self) -> &Model {
        &self.config.model
    }

    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    pub fn instructions(&self) -> &str {
        &self.config.instructions
    }

    /// Replaces the standing instructions and the seed developer message
    /// at the head of the transcript.
    pub fn set_instructions(&mut self, instructions: String) {
        self.config.instructions = instructions.clone();
        self.config.messages = Message::developer(&instructions);
        if self
            .transcript
            .first()
            .is_some_and(|m| m.role == Role::Developer)
        {
            self.transcript[0] = Message::developer(instructions);
        } else {
            self.transcript.insert(0, Message::developer(instructions));
        }
    }

    pub fn history(&self) -> bool {
        self.config.history
    }

    pub fn set_history(&mut self, history: bool) {
        self.config.history = history;
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Replaces the transcript wholesale, as after loading a session.
    pub fn replace_transcript(&mut self, transcript: Vec<Message>) {
        self.transcript = transcript;
        self.attached_files.clear();
        self.file_contents.clear();
    }

    /// Names of the attachments staged for the next turn.
    pub fn attached_files(&self) -> &[String] {
        &self.attached_files
    }

    /// Stages an attachment; it rides along with the next user turn.
    pub fn attach(&mut self, attachment: Attachment) {
        self.file_contents.push_str(&format!(
            "{{ {} }}: {{ {} }}, ",
            attachment.filename, attachment.content
        ));
        self.attached_files.push(attachment.filename);
    }

    /// Drops all staged attachments.
    pub fn clear_attachments(&mut self) {
        self.attached_files.clear();
        self.file_contents.clear();
    }

    /// Folds staged attachments into the user's input as one message.
    ///
    /// Leaves the staging buffer alone; the caller clears it once the
    /// composed message is retained in the transcript or the request
    /// succeeds, so a failed turn does not lose the attachments.
    fn compose_input(&self, input: &str) -> String {
        if self.file_contents.is_empty() {
            input.to_string()
        } else {
            format!("{input}, files: {{ {} }}", self.file_contents)
        }
    }

    /// Sends one user turn and renders the assistant's reply.
    ///
    /// With history on, the turn is appended to the transcript and the
    /// full transcript is sent; the assistant's reply is appended only
    /// when the request succeeds.  The user's turn stays in the
    /// transcript on failure so it is not lost on retry-worthy errors.
    /// With history off, each turn is an independent exchange and the
    /// transcript is untouched.
    pub async fn send(
        &mut self,
        client: &OpenAi,
        renderer: &mut dyn Renderer,
        input: &str,
    ) -> Result<()> {
        let input = self.compose_input(input);
        if !self.config.history {
            let output = self.client_respond(client, &input).await?;
            self.clear_attachments();
            renderer.print_text(&output);
            renderer.finish_response();
            return Ok(());
        }

        // The composed turn (attachments included) stays in the
        // transcript even if the request fails, so the staging buffer
        // is done either way.
        self.transcript.push(Message::user(input));
        self.clear_attachments();
        let params =
            ChatCompletionParams::new_streaming(self.config.model.clone(), self.transcript.clone());
        let mut stream = Box::pin(client.chat_stream(params).await?);

        let mut reply = String::new();
        let mut interrupted = false;
        while let Some(chunk) = stream.next().await {
            if renderer.should_interrupt() {
                interrupted = true;
                break;
            }
            let chunk = chunk?;
            if let Some(text) = chunk.content() {
                reply.push_str(text);
                renderer.print_text(text);
            }
        }
        if interrupted {
            renderer.print_interrupted();
        }
        renderer.finish_response();
        self.transcript.push(Message::assistant(reply));
        Ok(())
    }

    async fn client_respond(&self, client: &OpenAi, input: &str) -> Result<String> {
        client
            .respond(&self.config.model, &self.config.instructions, input)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        serde_json::from_str(
            r#"{
                "model": "gpt-4o-mini",
                "instructions": "You are a helpful assistant.",
                "messages": {"role": "developer", "content": "You are a helpful assistant."},
                "history": true
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn new_session_seeds_developer_message() {
        let session = ChatSession::new(config());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Developer);
        assert_eq!(
            session.transcript()[0].content,
            "You are a helpful assistant."
        );
    }

    #[test]
    fn set_instructions_rewrites_seed_message() {
        let mut session = ChatSession::new(config());
        session.set_instructions("Answer in French.".to_string());
        assert_eq!(session.instructions(), "Answer in French.");
        assert_eq!(session.transcript()[0].content, "Answer in French.");
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn set_instructions_inserts_when_transcript_has_no_seed() {
        let mut session = ChatSession::new(config());
        session.replace_transcript(vec![Message::user("hi")]);
        session.set_instructions("Be terse.".to_string());
        assert_eq!(session.transcript()[0].role, Role::Developer);
        assert_eq!(session.transcript()[1].content, "hi");
    }

    #[test]
    fn attachments_merge_into_one_user_message() {
        let mut session = ChatSession::new(config());
        session.attach(Attachment {
            filename: "a.txt".to_string(),
            content: "alpha".to_string(),
        });
        session.attach(Attachment {
            filename: "b.md".to_string(),
            content: "beta".to_string(),
        });
        assert_eq!(session.attached_files(), ["a.txt", "b.md"]);

        let composed = session.compose_input("summarize these");
        assert_eq!(
            composed,
            "summarize these, files: { { a.txt }: { alpha }, { b.md }: { beta },  }"
        );
        // Composing does not consume the staging buffer; that happens
        // only once the turn is retained or the request succeeds.
        assert_eq!(session.attached_files(), ["a.txt", "b.md"]);
    }

    #[test]
    fn compose_without_attachments_is_identity() {
        let session = ChatSession::new(config());
        assert_eq!(session.compose_input("plain"), "plain");
    }

    #[tokio::test]
    async fn failed_history_off_turn_keeps_attachments() {
        use std::time::Duration;

        use crate::client::OpenAi;
        use crate::render::PlainTextRenderer;

        // Nothing listens here, so the request fails fast.
        let client = OpenAi::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:9/".to_string()),
            Some(Duration::from_millis(250)),
        )
        .unwrap();

        let mut session = ChatSession::new(config());
        session.set_history(false);
        session.attach(Attachment {
            filename: "a.txt".to_string(),
            content: "alpha".to_string(),
        });

        let mut renderer = PlainTextRenderer::with_color(false);
        let result = session.send(&client, &mut renderer, "summarize").await;
        assert!(result.is_err());
        assert_eq!(session.attached_files(), ["a.txt"]);
    }

    #[tokio::test]
    async fn failed_history_on_turn_retains_composed_message() {
        use std::time::Duration;

        use crate::client::OpenAi;
        use crate::render::PlainTextRenderer;

        let client = OpenAi::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:9/".to_string()),
            Some(Duration::from_millis(250)),
        )
        .unwrap();

        let mut session = ChatSession::new(config());
        session.attach(Attachment {
            filename: "a.txt".to_string(),
            content: "alpha".to_string(),
        });

        let mut renderer = PlainTextRenderer::with_color(false);
        let result = session.send(&client, &mut renderer, "summarize").await;
        assert!(result.is_err());

        // The attachments live on inside the retained user turn, so
        // the staging buffer is empty and a retry resends them.
        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("a.txt"));
        assert!(session.attached_files().is_empty());
    }

    #[test]
    fn reset_discards_transcript_and_attachments() {
        let mut session = ChatSession::new(config());
        session.replace_transcript(vec![Message::user("hi"), Message::assistant("yo")]);
        session.attach(Attachment {
            filename: "a.txt".to_string(),
            content: "alpha".to_string(),
        });
        session.reset(config());
        assert_eq!(session.transcript().len(), 1);
        assert!(session.attached_files().is_empty());
    }

    #[test]
    fn replace_transcript_clears_staged_attachments() {
        let mut session = ChatSession::new(config());
        session.attach(Attachment {
            filename: "a.txt".to_string(),
            content: "alpha".to_string(),
        });
        session.replace_transcript(vec![Message::user("resumed")]);
        assert!(session.attached_files().is_empty());
        assert_eq!(session.compose_input("next"), "next");
    }
}
