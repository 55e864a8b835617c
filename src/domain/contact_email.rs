use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Inquiry;

static HTML_SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[&<>"']"#).expect("HTML escape pattern is valid"));

/// Escape the five HTML-significant characters of a user-supplied value.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    HTML_SPECIAL_CHARS.replace_all(value, |caps: &Captures<'_>| match &caps[0] {
        "&" => "&amp;",
        "<" => "&lt;",
        ">" => "&gt;",
        "\"" => "&quot;",
        _ => "&#039;",
    })
}

/// The message relayed to the business inbox for one inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub subject: String,
    pub html_body: String,
    pub plain_body: String,
    /// The submitter's address, unescaped, so the inbox can answer directly.
    pub reply_to: String,
}

impl ContactEmail {
    pub fn render(inquiry: &Inquiry) -> ContactEmail {
        ContactEmail {
            subject: subject(inquiry),
            html_body: html_body(inquiry),
            plain_body: plain_body(inquiry),
            reply_to: inquiry.email.as_ref().to_owned(),
        }
    }
}

fn subject(inquiry: &Inquiry) -> String {
    // The subject ends up in a mail header.
    format!(
        "New Contact Form Submission from {} {}",
        inquiry.first_name.as_ref(),
        inquiry.last_name.as_ref()
    )
    .replace(['\r', '\n'], " ")
}

fn plain_body(inquiry: &Inquiry) -> String {
    format!(
        "New contact form submission\n\
         \n\
         Name: {first_name} {last_name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         \n\
         Message:\n\
         {message}\n\
         \n\
         ---\n\
         This message was sent from the website contact form.\n\
         Reply directly to this email to respond to {first_name}.\n",
        first_name = inquiry.first_name.as_ref(),
        last_name = inquiry.last_name.as_ref(),
        email = inquiry.email.as_ref(),
        phone = inquiry.phone.as_ref(),
        message = inquiry.message.as_ref(),
    )
}

fn html_body(inquiry: &Inquiry) -> String {
    let first_name = escape_html(inquiry.first_name.as_ref());
    let last_name = escape_html(inquiry.last_name.as_ref());
    let email = escape_html(inquiry.email.as_ref());
    let phone = escape_html(inquiry.phone.as_ref());
    // Line breaks are inserted after escaping, otherwise the tag itself
    // would be escaped.
    let message = escape_html(inquiry.message.as_ref()).replace('\n', "<br>");

    format!(
        "<h2>New contact form submission</h2>\
         <p><strong>Name:</strong> {first_name} {last_name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Phone:</strong> {phone}</p>\
         <p><strong>Message:</strong></p>\
         <p>{message}</p>\
         <hr>\
         <p>This message was sent from the website contact form.<br>\
         Reply directly to this email to respond to {first_name}.</p>"
    )
}
