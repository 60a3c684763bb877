use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// OpenAI API key; absence is reported per request, not at startup
    pub openai_api_key: Option<String>,

    /// OpenAI base URL (optional)
    pub openai_base_url: Option<String>,

    /// File overriding the built-in persona prompt
    pub persona_prompt_path: Option<String>,

    /// Resend API key for contact mail
    pub resend_api_key: Option<String>,

    /// Domain contact mail is sent from
    pub resend_domain: Option<String>,

    /// Owner inbox for contact notifications
    #[serde(default = "default_contact_inbox")]
    pub contact_inbox: String,

    /// Offset, in hours, for timestamps in contact notifications
    #[serde(default = "default_utc_offset_hours")]
    pub contact_utc_offset_hours: i32,

    /// Directory of rendered pages to serve
    pub static_dir: Option<String>,

    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_contact_inbox() -> String {
    "contact@example.com".to_string()
}

fn default_utc_offset_hours() -> i32 {
    9
}

/// Read a variable, treating blank values as unset
fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let contact_utc_offset_hours = match non_blank_var("CONTACT_UTC_OFFSET_HOURS") {
            Some(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("CONTACT_UTC_OFFSET_HOURS must be a whole number of hours")
            })?,
            None => default_utc_offset_hours(),
        };

        let settings = Settings {
            openai_api_key: non_blank_var("OPENAI_API_KEY"),
            openai_base_url: non_blank_var("OPENAI_BASE_URL"),
            persona_prompt_path: non_blank_var("PERSONA_PROMPT_PATH"),
            resend_api_key: non_blank_var("RESEND_API_KEY"),
            resend_domain: non_blank_var("RESEND_DOMAIN"),
            contact_inbox: non_blank_var("CONTACT_INBOX").unwrap_or_else(default_contact_inbox),
            contact_utc_offset_hours,
            static_dir: non_blank_var("STATIC_DIR"),
            host: env::var("HOST").unwrap_or_else(|_| default_host()),
            port: env::var("PORT")
                .map(|p| p.parse().unwrap_or(default_port()))
                .unwrap_or(default_port()),
        };

        settings.contact_utc_offset()?;
        Ok(settings)
    }

    /// Get the server address as a string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn contact_utc_offset(&self) -> Result<FixedOffset, anyhow::Error> {
        FixedOffset::east_opt(self.contact_utc_offset_hours * 3600).ok_or_else(|| {
            anyhow::anyhow!(
                "CONTACT_UTC_OFFSET_HOURS out of range: {}",
                self.contact_utc_offset_hours
            )
        })
    }
}

// Hand-written so credentials never end up in the startup log.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("persona_prompt_path", &self.persona_prompt_path)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "<set>"))
            .field("resend_domain", &self.resend_domain)
            .field("contact_inbox", &self.contact_inbox)
            .field("contact_utc_offset_hours", &self.contact_utc_offset_hours)
            .field("static_dir", &self.static_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            persona_prompt_path: None,
            resend_api_key: None,
            resend_domain: None,
            contact_inbox: default_contact_inbox(),
            contact_utc_offset_hours: default_utc_offset_hours(),
            static_dir: None,
            host: default_host(),
            port: default_port(),
        }
    }
}
