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

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::form::ContactForm;
use super::mailer::{Mailer, OutgoingEmail};
use super::templates;
use crate::errors::ContactError;

pub const DEFAULT_SENDER: &str = "contact@example.com";
pub const DEFAULT_INBOX: &str = "contact@example.com";
pub const SENT_MESSAGE: &str = "Your message has been sent. Please wait for a reply.";

impl ContactError {
    /// HTTP status the contact endpoint answers with
    pub fn status_code(&self) -> u16 {
        match self {
            ContactError::MissingFields
            | ContactError::InvalidEmail
            | ContactError::MessageTooShort { .. } => 400,
            ContactError::NotConfigured | ContactError::Delivery(_) => 500,
        }
    }
}

/// Addressing for contact mail
#[derive(Debug, Clone)]
pub struct ContactSettings {
    /// Domain the mail is sent from; `contact@<domain>`
    pub sender_domain: Option<String>,
    /// Where notifications go
    pub inbox: String,
    /// Offset used for the "received" timestamp in notifications
    pub utc_offset: FixedOffset,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            sender_domain: None,
            inbox: DEFAULT_INBOX.to_string(),
            utc_offset: Utc.fix(),
        }
    }
}

impl ContactSettings {
    pub fn sender(&self) -> String {
        match self.sender_domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => format!("contact@{}", domain),
            _ => DEFAULT_SENDER.to_string(),
        }
    }
}

/// Successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub message: String,
    pub id: String,
}

/// Validates contact submissions and sends the notification and auto-reply
pub struct ContactRelay {
    mailer: Option<Arc<dyn Mailer>>,
    settings: ContactSettings,
}

impl ContactRelay {
    /// `mailer` is `None` when no mail credential is configured
    pub fn new(mailer: Option<Arc<dyn Mailer>>, settings: ContactSettings) -> Self {
        Self { mailer, settings }
    }

    pub async fn submit(&self, form: ContactForm) -> Result<ContactReceipt, ContactError> {
        form.check()?;
        let form = form.sanitized();

        let mailer = self.mailer.as_ref().ok_or_else(|| {
            error!("Mail credential is not configured");
            ContactError::NotConfigured
        })?;

        let sender = self.settings.sender();
        let received_at = Utc::now().with_timezone(&self.settings.utc_offset);

        let notification = templates::notification(&form, received_at);
        let notification_id = mailer
            .send(&OutgoingEmail {
                from: sender.clone(),
                to: vec![self.settings.inbox.clone()],
                subject: notification.subject,
                html: notification.html,
                text: notification.text,
                reply_to: Some(form.email.clone()),
            })
            .await
            .map_err(|e| {
                error!("Notification email failed: {}", e);
                ContactError::Delivery(e)
            })?;

        let reply = templates::auto_reply(&form, &self.settings.inbox);
        let auto_reply_id = match mailer
            .send(&OutgoingEmail {
                from: sender,
                to: vec![form.email.clone()],
                subject: reply.subject,
                html: reply.html,
                text: reply.text,
                reply_to: None,
            })
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Auto-reply email failed: {}", e);
                None
            }
        };

        info!(
            notification_id = %notification_id,
            auto_reply_id = auto_reply_id.as_deref().unwrap_or("-"),
            "Contact form submission delivered"
        );

        Ok(ContactReceipt {
            message: SENT_MESSAGE.to_string(),
            id: notification_id,
        })
    }
}
