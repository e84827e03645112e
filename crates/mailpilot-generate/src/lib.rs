//! Placeholder generation backend.
//!
//! [`StubGenerator`] fills the [`Generator`] seam with deterministic,
//! side-effect-free output so the surrounding flows can be exercised before
//! a real model backend exists. Reply and summary echo excerpts of the
//! email context; compose matches the prompt against a small set of canned
//! phrasings. Swapping in a real backend must not change the trait contract.

use async_trait::async_trait;
use mailpilot_core::{
    CoreError, EmailContent, GenerateRequest, GenerationMode, GenerationResult, Generator,
};

const REPLY_EXCERPT_CHARS: usize = 200;
const SUMMARY_EXCERPT_CHARS: usize = 300;

const SHORT_FRIENDLY_BODY: &str = "I hope this message finds you well.\n\n\
I wanted to reach out with a quick update. Everything is progressing smoothly on our end, \
and I'll keep you posted on any developments.\n\n\
Please let me know if you have any questions or if there's anything else I can help with.";

const REQUEST_INFO_BODY: &str = "I hope you're doing well.\n\n\
I'm writing to request some additional information regarding [topic]. Could you please \
provide more details about:\n\n\
- [Specific item 1]\n- [Specific item 2]\n- [Any other relevant details]\n\n\
This information would be very helpful for moving forward. Please let me know if you need \
any clarification on what I'm looking for.\n\n\
Thank you for your time and assistance.";

const STATUS_UPDATE_BODY: &str = "I wanted to provide you with an update on [project/topic].\n\n\
Here's where things currently stand:\n\n\
\u{2022} [Progress item 1]\n\u{2022} [Progress item 2]\n\u{2022} [Next steps]\n\n\
The project is on track, and we expect [timeline/outcome]. I'll continue to keep you \
updated as we make progress.\n\n\
Please don't hesitate to reach out if you have any questions or concerns.";

const ANNOUNCEMENT_BODY: &str = "I hope this message reaches you well.\n\n\
I'm pleased to announce [announcement details]. This is an exciting development that will \
[impact/benefit].\n\n\
Key details:\n- [Detail 1]\n- [Detail 2]\n- [Timeline or next steps]\n\n\
I'm happy to answer any questions you might have about this announcement.";

/// Deterministic stand-in for the model backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubGenerator;

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerationResult, CoreError> {
        let output = match request.mode {
            GenerationMode::Reply => reply_output(&request.prompt, request.email.as_ref()),
            GenerationMode::Summary => summary_output(&request.prompt, request.email.as_ref()),
            GenerationMode::Compose => compose_output(&request.prompt),
        };
        Ok(GenerationResult {
            success: true,
            output,
            prompt: request.prompt,
            error: None,
        })
    }
}

fn header_or_na(email: Option<&EmailContent>, name: &str) -> String {
    email
        .and_then(|content| content.headers.get(name))
        .filter(|value| !value.is_empty())
        .unwrap_or("N/A")
        .to_owned()
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn reply_output(prompt: &str, email: Option<&EmailContent>) -> String {
    let subject = header_or_na(email, "Subject");
    let from = header_or_na(email, "From");
    let body = email
        .map(|content| content.text_content.as_str())
        .filter(|text| !text.is_empty())
        .map(|text| excerpt(text, REPLY_EXCERPT_CHARS))
        .unwrap_or_else(|| "No content".to_owned());
    let instructions = if prompt.is_empty() { "None" } else { prompt };

    format!(
        "AI Reply (Placeholder):\n\nBased on the email content:\nSubject: {subject}\nFrom: {from}\n\n\
         Email excerpt: \"{body}...\"\n\nUser instructions: \"{instructions}\"\n\n\
         [This would be replaced with actual AI-generated reply]"
    )
}

fn summary_output(prompt: &str, email: Option<&EmailContent>) -> String {
    let subject = header_or_na(email, "Subject");
    let from = header_or_na(email, "From");
    let date = header_or_na(email, "Date");
    let body = email
        .map(|content| content.text_content.as_str())
        .filter(|text| !text.is_empty())
        .map(|text| excerpt(text, SUMMARY_EXCERPT_CHARS))
        .unwrap_or_else(|| "No content available".to_owned());
    let focus = if prompt.is_empty() {
        "General summary"
    } else {
        prompt
    };

    format!(
        "AI Summary (Placeholder):\n\nEmail Details:\n- Subject: {subject}\n- From: {from}\n\
         - Date: {date}\n\nContent Summary: \"{body}...\"\n\nUser focus: \"{focus}\"\n\n\
         [This would be replaced with actual AI-generated summary]"
    )
}

fn compose_output(prompt: &str) -> String {
    format!(
        "Subject: {}\n\nDear [Recipient],\n\n{}\n\nBest regards,\n[Your name]",
        subject_for_prompt(prompt),
        body_for_prompt(prompt)
    )
}

fn subject_for_prompt(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    if prompt.contains("short and friendly") {
        "Quick Update"
    } else if prompt.contains("request more information") {
        "Information Request"
    } else if prompt.contains("provide an update") {
        "Status Update"
    } else if prompt.contains("make an announcement") {
        "Important Announcement"
    } else {
        "Re: Your Request"
    }
}

fn body_for_prompt(prompt: &str) -> String {
    let lowered = prompt.to_lowercase();
    if lowered.contains("short and friendly") {
        SHORT_FRIENDLY_BODY.to_owned()
    } else if lowered.contains("request more information") {
        REQUEST_INFO_BODY.to_owned()
    } else if lowered.contains("provide an update") {
        STATUS_UPDATE_BODY.to_owned()
    } else if lowered.contains("make an announcement") {
        ANNOUNCEMENT_BODY.to_owned()
    } else {
        format!(
            "Thank you for your message.\n\nBased on your request: \"{prompt}\"\n\n\
             [An appropriate response will appear here once the model backend is connected.]\n\n\
             Please let me know if you need any additional information or if there's anything \
             else I can help you with."
        )
    }
}
