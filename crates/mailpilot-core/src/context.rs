use crate::{EmailContent, GenerationMode};

const REPLY_TASK: &str =
    "Generate an appropriate email reply based on the above email content and user instructions.";
const SUMMARY_TASK: &str = "Generate a concise summary of the above email content, focusing on \
     the key points mentioned in user instructions (if any).";
const COMPOSE_TASK: &str =
    "Write a professional email that addresses the request in the user instructions.";

fn task_line(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Reply => REPLY_TASK,
        GenerationMode::Summary => SUMMARY_TASK,
        GenerationMode::Compose => COMPOSE_TASK,
    }
}

/// Assemble the exact text block handed to generation.
///
/// Deterministic ordering: headers block, content block, instructions block,
/// then the fixed task line for the mode, each block followed by a blank
/// line. Blocks with no data are omitted entirely. The shape must stay
/// reproducible so generation requests can be tested even while the backend
/// is a placeholder.
pub fn assemble_context(
    prompt: &str,
    email: Option<&EmailContent>,
    mode: GenerationMode,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(email) = email {
        if !email.headers.is_empty() {
            sections.push("=== EMAIL HEADERS ===".to_owned());
            for (name, value) in email.headers.iter() {
                sections.push(format!("{name}: {value}"));
            }
            sections.push(String::new());
        }

        if !email.text_content.is_empty() {
            sections.push("=== EMAIL CONTENT ===".to_owned());
            sections.push(email.text_content.clone());
            sections.push(String::new());
        }
    }

    let instructions = prompt.trim();
    if !instructions.is_empty() {
        sections.push("=== USER INSTRUCTIONS ===".to_owned());
        sections.push(instructions.to_owned());
        sections.push(String::new());
    }

    sections.push("=== TASK ===".to_owned());
    sections.push(task_line(mode).to_owned());

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentSource, Headers};

    fn email(headers: Headers, text: &str) -> EmailContent {
        EmailContent {
            text_content: text.to_owned(),
            html_content: String::new(),
            headers,
            message_id: None,
            extracted_at: "2026-08-29T10:00:00Z".to_owned(),
            source: ContentSource::Api,
            error: None,
        }
    }

    #[test]
    fn empty_inputs_yield_only_the_task_section() {
        let content = email(Headers::new(), "");
        let context = assemble_context("", Some(&content), GenerationMode::Reply);
        assert_eq!(
            context,
            format!("=== TASK ===\n{REPLY_TASK}")
        );
        assert!(!context.contains("EMAIL HEADERS"));
        assert!(!context.contains("EMAIL CONTENT"));
        assert!(!context.contains("USER INSTRUCTIONS"));
    }

    #[test]
    fn headers_emit_one_line_per_entry_in_iteration_order() {
        let mut headers = Headers::new();
        headers.insert("Subject", "Q3 plan");
        headers.insert("From", "a@x.com");
        headers.insert("Date", "2026-08-29");
        let content = email(headers, "");

        let context = assemble_context("", Some(&content), GenerationMode::Summary);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines[0], "=== EMAIL HEADERS ===");
        assert_eq!(lines[1], "Subject: Q3 plan");
        assert_eq!(lines[2], "From: a@x.com");
        assert_eq!(lines[3], "Date: 2026-08-29");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn all_sections_appear_in_fixed_order() {
        let mut headers = Headers::new();
        headers.insert("Subject", "hi");
        let content = email(headers, "Please review by Friday.");

        let context =
            assemble_context("focus on deadlines", Some(&content), GenerationMode::Summary);

        let headers_at = context.find("=== EMAIL HEADERS ===").expect("headers");
        let content_at = context.find("=== EMAIL CONTENT ===").expect("content");
        let instructions_at = context
            .find("=== USER INSTRUCTIONS ===")
            .expect("instructions");
        let task_at = context.find("=== TASK ===").expect("task");
        assert!(headers_at < content_at);
        assert!(content_at < instructions_at);
        assert!(instructions_at < task_at);
        assert!(context.ends_with(SUMMARY_TASK));
    }

    #[test]
    fn whitespace_only_prompt_omits_the_instructions_section() {
        let content = email(Headers::new(), "body");
        let context = assemble_context("   \n ", Some(&content), GenerationMode::Reply);
        assert!(!context.contains("USER INSTRUCTIONS"));
        assert!(context.contains("=== EMAIL CONTENT ==="));
    }

    #[test]
    fn missing_email_content_behaves_like_empty_content() {
        let context = assemble_context("write something", None, GenerationMode::Compose);
        assert!(context.starts_with("=== USER INSTRUCTIONS ===\nwrite something"));
        assert!(context.ends_with(COMPOSE_TASK));
    }

    #[test]
    fn assembly_is_deterministic_across_calls() {
        let mut headers = Headers::new();
        headers.insert("Subject", "Q3 plan");
        let content = email(headers, "Please review by Friday.");

        let first = assemble_context("focus", Some(&content), GenerationMode::Reply);
        let second = assemble_context("focus", Some(&content), GenerationMode::Reply);
        assert_eq!(first, second);
    }
}
