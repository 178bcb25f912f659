//! Output formatting
//!
//! Projects [`OutputEvent`]s onto one of two line-oriented encodings. The
//! channel-encoded form is parsed byte-for-byte by downstream stream readers,
//! so its layout is fixed: `<channel digit>:<json>\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::types::OutputEvent;

/// Output channel, encoded as the line prefix digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseChannel {
    Text = 0,
    Data = 2,
}

impl ResponseChannel {
    pub fn prefix(self) -> u8 {
        self as u8
    }
}

/// Encoding of the output sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `0:"text"\n` and `2:[...]\n` lines
    #[default]
    #[serde(alias = "vercel-ai-sdk")]
    ChannelEncoded,
    /// Raw text, data as one JSON line
    HumanReadable,
}

impl OutputFormat {
    /// Encode one event.
    pub fn format(self, event: &OutputEvent) -> Result<String> {
        match event {
            OutputEvent::Text(text) => self.format_text(text),
            OutputEvent::Data(value) => self.format_channel(ResponseChannel::Data, value),
        }
    }

    /// Encode an arbitrary payload on the given channel.
    pub fn format_channel(self, channel: ResponseChannel, content: &Value) -> Result<String> {
        match (self, channel, content) {
            (Self::HumanReadable, ResponseChannel::Text, Value::String(text)) => Ok(text.clone()),
            (Self::HumanReadable, ..) => Ok(format!("{}\n", serde_json::to_string(content)?)),
            (Self::ChannelEncoded, ..) => Ok(format!(
                "{}:{}\n",
                channel.prefix(),
                serde_json::to_string(content)?
            )),
        }
    }

    fn format_text(self, text: &str) -> Result<String> {
        match self {
            Self::HumanReadable => Ok(text.to_string()),
            Self::ChannelEncoded => Ok(format!(
                "{}:{}\n",
                ResponseChannel::Text.prefix(),
                serde_json::to_string(text)?
            )),
        }
    }
}
