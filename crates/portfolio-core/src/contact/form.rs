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

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::ContactError;

/// Minimum length of the message body, in characters. Keep in step with
/// the `length` rule on [`ContactForm::message`].
pub const MIN_MESSAGE_CHARS: u64 = 10;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern is valid")
});

/// A submission from the contact page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[validate(email, custom(function = "validate_dotted_domain"))]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 10))]
    pub message: String,
}

impl ContactForm {
    /// Check the submission, reporting the first problem in field order:
    /// missing fields, then the address, then the message length.
    pub fn check(&self) -> Result<(), ContactError> {
        let required = [&self.name, &self.email, &self.subject, &self.message];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ContactError::MissingFields);
        }

        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let fields = errors.field_errors();
        if fields.contains_key("email") {
            Err(ContactError::InvalidEmail)
        } else {
            Err(ContactError::MessageTooShort {
                min: MIN_MESSAGE_CHARS,
            })
        }
    }

    /// Trimmed copy with `<script>` blocks removed from every field
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_input(&self.name),
            email: sanitize_input(&self.email),
            subject: sanitize_input(&self.subject),
            message: sanitize_input(&self.message),
        }
    }
}

/// Rejects addresses like `a@b` that the email rule alone lets through
fn validate_dotted_domain(email: &str) -> Result<(), ValidationError> {
    match email.rsplit_once('@') {
        Some((_, domain)) if domain.trim_matches('.').contains('.') => Ok(()),
        _ => Err(ValidationError::new("dotted_domain")),
    }
}

pub fn sanitize_input(input: &str) -> String {
    SCRIPT_BLOCK.replace_all(input.trim(), "").into_owned()
}
