use base64::Engine;
use serde::{Deserialize, Serialize};

/// One part of a tool response (text or image).
///
/// Image payloads are opaque to everything above the renderer that
/// produced them; the declared MIME type travels with the bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { data: String, mime_type: String },
}

/// Result shape produced by a tool: plain text, or an ordered bundle of
/// text and image parts. At least one part by construction.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Text(String),
    Mixed(Vec<ToolContent>),
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A caption followed by a single image part; bytes are base64-encoded
    /// for transport.
    pub fn text_and_image(
        caption: impl Into<String>,
        data: &[u8],
        mime_type: impl Into<String>,
    ) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Self::Mixed(vec![
            ToolContent::Text {
                text: caption.into(),
            },
            ToolContent::Image {
                data: encoded,
                mime_type: mime_type.into(),
            },
        ])
    }

    /// Flattens into the ordered part list handed to the transport.
    pub fn into_parts(self) -> Vec<ToolContent> {
        match self {
            Self::Text(text) => vec![ToolContent::Text { text }],
            Self::Mixed(parts) => parts,
        }
    }
}
