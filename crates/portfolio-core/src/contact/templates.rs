/*
Copyright 2024, Zep Software, Inc.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Bodies of the notification and auto-reply mails.

use chrono::{DateTime, FixedOffset};

use super::form::ContactForm;

pub const AUTO_REPLY_SUBJECT: &str = "Thank you for your inquiry - Portfolio";

/// A rendered mail body in both formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Mail sent to the site owner for every submission
pub fn notification(form: &ContactForm, received_at: DateTime<FixedOffset>) -> RenderedMail {
    let received = received_at.format("%Y-%m-%d %H:%M:%S %:z").to_string();
    let name = escape_html(&form.name);
    let email = escape_html(&form.email);
    let subject = escape_html(&form.subject);
    let message = escape_html(&form.message);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New inquiry</title></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="font-size: 22px;">A new inquiry has arrived</h1>
  <p><strong>Name:</strong><br>{name}</p>
  <p><strong>Email:</strong><br><a href="mailto:{email}">{email}</a></p>
  <p><strong>Subject:</strong><br>{subject}</p>
  <p><strong>Message:</strong></p>
  <div style="white-space: pre-wrap; border: 1px solid #dee2e6; padding: 15px;">{message}</div>
  <p style="font-size: 14px; color: #6c757d;">Received: {received}<br>Sent from the portfolio contact form.</p>
</body>
</html>"#
    );

    let text = format!(
        "A new inquiry has arrived\n\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\n\
         Message:\n{}\n\n\
         ---\n\
         Received: {}\n",
        form.name, form.email, form.subject, form.message, received
    );

    RenderedMail {
        subject: format!("New inquiry: {}", form.subject),
        html,
        text,
    }
}

/// Confirmation sent back to the visitor
pub fn auto_reply(form: &ContactForm, owner_address: &str) -> RenderedMail {
    let name = escape_html(&form.name);
    let subject = escape_html(&form.subject);
    let message = escape_html(&form.message);
    let owner = escape_html(owner_address);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Thank you for your inquiry</title></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <p>Dear {name},</p>
  <p>Thank you for reaching out through my portfolio site. I have received the following inquiry:</p>
  <p><strong>Subject:</strong> {subject}</p>
  <div style="white-space: pre-wrap; background: #f8f9fa; padding: 15px;">{message}</div>
  <p>I usually reply within 24 hours. If the matter is urgent, please write to {owner} directly.</p>
  <p style="font-size: 12px; color: #6c757d;">Portfolio Website. This message was sent automatically.</p>
</body>
</html>"#
    );

    let text = format!(
        "Dear {},\n\n\
         Thank you for reaching out through my portfolio site. \
         I have received the following inquiry:\n\n\
         Subject: {}\n\n\
         Message:\n{}\n\n\
         I usually reply within 24 hours. If the matter is urgent, \
         please write to {} directly.\n\n\
         Portfolio Website\n",
        form.name, form.subject, form.message, owner_address
    );

    RenderedMail {
        subject: AUTO_REPLY_SUBJECT.to_string(),
        html,
        text,
    }
}
