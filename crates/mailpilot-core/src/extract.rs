use crate::{ContentSource, EmailContent, Headers, MessageRecord};

/// Content a surface scraped out of its own document as a fallback when the
/// host API has no answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomExtraction {
    pub text_content: String,
    pub html_content: String,
    pub headers: Headers,
}

/// Build [`EmailContent`] from a message retrieved through the host API.
///
/// Envelope fields come first so Subject/From/To/Date lead the headers
/// block; the full header list then overrides any of them the message also
/// carries verbatim.
pub fn content_from_message(message: &MessageRecord, extracted_at: String) -> EmailContent {
    let mut headers = Headers::new();
    headers.insert("Subject", message.subject.clone());
    headers.insert("From", message.author.clone());
    headers.insert("To", message.recipients.join(", "));
    headers.insert("Date", message.date.clone());
    for (name, value) in &message.headers {
        headers.insert(name.clone(), value.clone());
    }

    let mut text_content = String::new();
    let mut html_content = String::new();
    for part in &message.parts {
        let Some(body) = part.body.as_deref() else {
            continue;
        };
        match part.content_type.as_str() {
            "text/plain" => {
                text_content.push_str(body);
                text_content.push('\n');
            }
            "text/html" => {
                html_content.push_str(body);
                html_content.push('\n');
            }
            _ => {}
        }
    }

    EmailContent {
        text_content: text_content.trim().to_owned(),
        html_content: html_content.trim().to_owned(),
        headers,
        message_id: Some(message.id),
        extracted_at,
        source: ContentSource::Api,
        error: None,
    }
}

/// Combine an API extraction with DOM-scraped fallback content.
///
/// API fields win whenever they are non-empty; DOM headers survive only
/// where the API did not provide the same name. An API answer with source
/// `error` counts as absent.
pub fn merge_with_dom(
    api: Option<EmailContent>,
    dom: DomExtraction,
    extracted_at: String,
) -> EmailContent {
    let api = api.filter(|content| content.source != ContentSource::Error);

    let mut headers = dom.headers;
    let mut text_content = dom.text_content;
    let mut html_content = dom.html_content;
    let mut message_id = None;

    let source = match &api {
        Some(_) => ContentSource::ApiDom,
        None => ContentSource::Dom,
    };

    if let Some(api) = api {
        if !api.text_content.is_empty() {
            text_content = api.text_content;
        }
        if !api.html_content.is_empty() {
            html_content = api.html_content;
        }
        for (name, value) in api.headers.iter() {
            headers.insert(name, value);
        }
        message_id = api.message_id;
    }

    EmailContent {
        text_content: text_content.trim().to_owned(),
        html_content,
        headers,
        message_id,
        extracted_at,
        source,
        error: None,
    }
}
