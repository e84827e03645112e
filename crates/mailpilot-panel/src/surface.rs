use serde_json::{json, Value};

use mailpilot_core::{
    ids, merge_with_dom, now_timestamp, BackgroundPort, CoreError, DomExtraction, EmailContent,
};

use crate::{DismissReason, OverlayManager, PanelMode, PanelOutput};

const GENERATION_FAILED: &str = "Failed to generate AI response. Please try again.";

/// The overlay component running inside a message-display document.
///
/// Reacts to commands the coordinator forwards to its tab, owns the
/// document's panel slot, and drives the generate flow: extract content,
/// request generation through the background port, render the result or an
/// inline error in the panel's output region.
pub struct MessageSurface<P> {
    port: P,
    dom: DomExtraction,
    overlay: OverlayManager,
}

impl<P: BackgroundPort> MessageSurface<P> {
    /// `dom` is whatever the surface could scrape from its own document; it
    /// backs up the host API during extraction.
    pub fn new(port: P, dom: DomExtraction) -> Self {
        Self {
            port,
            dom,
            overlay: OverlayManager::new(),
        }
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    /// Handle a command forwarded by the coordinator. Returns false for tags
    /// this surface does not react to.
    pub fn handle_forwarded(&mut self, message: &Value, now_ms: u64) -> bool {
        match message.get("cmd").and_then(Value::as_str) {
            Some(ids::SHOW_REPLY_UI) => {
                self.overlay.show_prompt(PanelMode::Reply, now_ms);
                true
            }
            Some(ids::SHOW_SUMMARY_UI) => {
                self.overlay.show_prompt(PanelMode::Summary, now_ms);
                true
            }
            Some(other) => {
                tracing::warn!(command = other, "unrecognized command forwarded to surface");
                false
            }
            None => false,
        }
    }

    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        self.overlay.dismiss(reason)
    }

    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.overlay.tick(now_ms)
    }

    /// Run the generate flow for the visible prompt panel.
    ///
    /// Failures land in the panel's output region as inline error text; the
    /// panel itself stays open either way.
    pub async fn generate(&mut self, prompt: &str) -> Result<(), CoreError> {
        let panel = self
            .overlay
            .prompt_panel_mut()
            .ok_or_else(|| CoreError::Configuration("no prompt panel is visible".to_owned()))?;
        panel.input = prompt.to_owned();
        panel.output = PanelOutput::Loading;
        let mode = panel.mode;

        let email = self.extract_content().await;

        let command = match mode {
            PanelMode::Reply => ids::GENERATE_REPLY,
            PanelMode::Summary => ids::GENERATE_SUMMARY,
        };
        let response = self
            .port
            .send(json!({
                "cmd": command,
                "prompt": prompt,
                "emailContent": email,
            }))
            .await;

        let output = match response {
            Ok(response) if response.get("success").and_then(Value::as_bool) == Some(true) => {
                let field = match mode {
                    PanelMode::Reply => "reply",
                    PanelMode::Summary => "summary",
                };
                match response.get(field).and_then(Value::as_str) {
                    Some(text) => PanelOutput::Result(text.to_owned()),
                    None => PanelOutput::Error(GENERATION_FAILED.to_owned()),
                }
            }
            Ok(response) => {
                let message = response
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or(GENERATION_FAILED);
                PanelOutput::Error(message.to_owned())
            }
            Err(err) => PanelOutput::Error(err.to_string()),
        };

        if let Some(panel) = self.overlay.prompt_panel_mut() {
            panel.output = output;
        }
        Ok(())
    }

    /// Extract email content, preferring the host API and falling back to
    /// the scraped document content when the API has no answer.
    async fn extract_content(&self) -> EmailContent {
        let api = match self
            .port
            .send(json!({"cmd": ids::GET_MESSAGE_CONTENT}))
            .await
        {
            Ok(response) => serde_json::from_value::<EmailContent>(response).ok(),
            Err(err) => {
                tracing::debug!(error = %err, "message content API unavailable, using DOM fallback");
                None
            }
        };
        merge_with_dom(api, self.dom.clone(), now_timestamp())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use mailpilot_core::{ContentSource, Headers};

    use super::*;

    struct ScriptedPort {
        responses: Mutex<Vec<Result<Value, CoreError>>>,
        sent: Mutex<Vec<Value>>,
    }

    impl ScriptedPort {
        fn new(responses: Vec<Result<Value, CoreError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BackgroundPort for &ScriptedPort {
        async fn send(&self, message: Value) -> Result<Value, CoreError> {
            self.sent.lock().expect("lock sent").push(message);
            let mut responses = self.responses.lock().expect("lock responses");
            if responses.is_empty() {
                return Ok(json!({"success": true}));
            }
            responses.remove(0)
        }
    }

    fn api_content() -> Value {
        let mut headers = Headers::new();
        headers.insert("Subject", "Q3 plan");
        serde_json::to_value(EmailContent {
            text_content: "Please review by Friday.".to_owned(),
            html_content: String::new(),
            headers,
            message_id: None,
            extracted_at: "2026-08-29T10:00:00Z".to_owned(),
            source: ContentSource::Api,
            error: None,
        })
        .expect("serialize content")
    }

    #[test]
    fn forwarded_show_commands_open_the_matching_panel() {
        let port = ScriptedPort::new(vec![]);
        let mut surface = MessageSurface::new(&port, DomExtraction::default());

        assert!(surface.handle_forwarded(&json!({"cmd": "showSummaryUI"}), 0));
        assert_eq!(
            surface.overlay().prompt_panel().expect("panel").mode,
            PanelMode::Summary
        );

        assert!(surface.handle_forwarded(&json!({"cmd": "showReplyUI"}), 10));
        assert_eq!(
            surface.overlay().prompt_panel().expect("panel").mode,
            PanelMode::Reply
        );
        assert!(!surface.handle_forwarded(&json!({"cmd": "getMessageContent"}), 20));
        assert!(!surface.handle_forwarded(&json!({"other": true}), 30));
    }

    #[tokio::test]
    async fn generate_merges_api_content_and_renders_the_result() {
        let port = ScriptedPort::new(vec![
            Ok(api_content()),
            Ok(json!({"success": true, "reply": "generated reply"})),
        ]);
        let mut dom = DomExtraction::default();
        dom.text_content = "scraped".to_owned();
        let mut surface = MessageSurface::new(&port, dom);
        surface.handle_forwarded(&json!({"cmd": "showReplyUI"}), 0);

        surface.generate("be brief").await.expect("generate");

        let panel = surface.overlay().prompt_panel().expect("panel");
        assert_eq!(panel.output, PanelOutput::Result("generated reply".to_owned()));
        assert_eq!(panel.input, "be brief");

        let sent = port.sent.lock().expect("lock sent");
        assert_eq!(sent[0]["cmd"], "getMessageContent");
        assert_eq!(sent[1]["cmd"], "generateReply");
        assert_eq!(sent[1]["prompt"], "be brief");
        assert_eq!(sent[1]["emailContent"]["source"], "api+dom");
        assert_eq!(
            sent[1]["emailContent"]["textContent"],
            "Please review by Friday."
        );
    }

    #[tokio::test]
    async fn summary_mode_requests_and_reads_the_summary_field() {
        let port = ScriptedPort::new(vec![
            Ok(api_content()),
            Ok(json!({"success": true, "summary": "the gist"})),
        ]);
        let mut surface = MessageSurface::new(&port, DomExtraction::default());
        surface.handle_forwarded(&json!({"cmd": "showSummaryUI"}), 0);

        surface.generate("").await.expect("generate");

        let sent = port.sent.lock().expect("lock sent");
        assert_eq!(sent[1]["cmd"], "generateSummary");
        assert_eq!(
            surface.overlay().prompt_panel().expect("panel").output,
            PanelOutput::Result("the gist".to_owned())
        );
    }

    #[tokio::test]
    async fn failed_generation_shows_inline_error_and_keeps_panel_open() {
        let port = ScriptedPort::new(vec![
            Ok(api_content()),
            Ok(json!({"success": false, "error": "backend exploded"})),
        ]);
        let mut surface = MessageSurface::new(&port, DomExtraction::default());
        surface.handle_forwarded(&json!({"cmd": "showReplyUI"}), 0);

        surface.generate("x").await.expect("generate");

        assert!(surface.overlay().is_visible());
        assert_eq!(
            surface.overlay().prompt_panel().expect("panel").output,
            PanelOutput::Error("backend exploded".to_owned())
        );
    }

    #[tokio::test]
    async fn unreachable_background_degrades_to_dom_extraction() {
        let port = ScriptedPort::new(vec![
            Err(CoreError::DependencyUnavailable("port down".to_owned())),
            Ok(json!({"success": true, "reply": "ok"})),
        ]);
        let mut dom = DomExtraction::default();
        dom.text_content = "scraped body".to_owned();
        let mut surface = MessageSurface::new(&port, dom);
        surface.handle_forwarded(&json!({"cmd": "showReplyUI"}), 0);

        surface.generate("x").await.expect("generate");

        let sent = port.sent.lock().expect("lock sent");
        assert_eq!(sent[1]["emailContent"]["source"], "dom");
        assert_eq!(sent[1]["emailContent"]["textContent"], "scraped body");
    }

    #[tokio::test]
    async fn generate_without_a_panel_is_an_error() {
        let port = ScriptedPort::new(vec![]);
        let mut surface = MessageSurface::new(&port, DomExtraction::default());
        let err = surface.generate("x").await.expect_err("no panel");
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
