pub const APOLOGY_TEXT: &str = "Sorry, I couldn't process the image generation.";

pub const GENERATE_HELP: &str = "Generates an image from a prompt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage(String);

impl ReplyMessage {
    pub fn image_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn apology() -> Self {
        Self(APOLOGY_TEXT.to_string())
    }

    pub fn usage(prefix: &str) -> Self {
        Self(format!(
            "Usage: `{}generate <prompt>` - {}.",
            prefix, GENERATE_HELP
        ))
    }

    pub fn help(prefix: &str) -> Self {
        Self(format!(
            "Commands:\n  `{p}generate <prompt>` - {}\n  `{p}help` - Shows this message",
            GENERATE_HELP,
            p = prefix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ReplyMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
