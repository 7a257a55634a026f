//! Update event encoding and publish framing.
//!
//! A publish frame is UTF-8 text of the form `<topic>\n<json>`: a topic
//! without newlines, one `\n`, then the compact JSON of an [`UpdateEvent`].

use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::UpdateEvent;

/// Separator between topic and body.
pub const FRAME_SEPARATOR: char = '\n';

/// Serialize an update event to its canonical compact JSON form.
///
/// # Errors
///
/// Returns `CoreError::Encoding` if serialization fails. This does not happen
/// for well-typed events.
pub fn encode(event: &UpdateEvent) -> Result<String> {
    serde_json::to_string(event).map_err(CoreError::Encoding)
}

/// Parse canonical JSON back into an update event.
///
/// # Errors
///
/// Returns `CoreError::Decoding` for invalid JSON, missing or extra fields,
/// or inconsistent vote counts.
pub fn decode(json: &str) -> Result<UpdateEvent> {
    serde_json::from_str(json).map_err(CoreError::Decoding)
}

/// Check that a topic can be placed in front of a frame body.
///
/// # Errors
///
/// Returns `CoreError::InvalidTopic` for an empty topic or one containing a
/// newline.
pub fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(CoreError::InvalidTopic {
            topic: topic.to_string(),
            reason: "topic must not be empty",
        });
    }
    if topic.contains(['\n', '\r']) {
        return Err(CoreError::InvalidTopic {
            topic: topic.to_string(),
            reason: "topic must not contain line breaks",
        });
    }
    Ok(())
}

/// The exact text written to the gateway socket.
#[derive(Clone, PartialEq, Eq)]
pub struct PublishFrame {
    text: String,
    topic_len: usize,
}

impl PublishFrame {
    /// Frame an already-encoded JSON body under a topic.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTopic` if the topic cannot be framed.
    pub fn new(topic: &str, json: &str) -> Result<Self> {
        validate_topic(topic)?;
        let mut text = String::with_capacity(topic.len() + 1 + json.len());
        text.push_str(topic);
        text.push(FRAME_SEPARATOR);
        text.push_str(json);
        Ok(Self {
            text,
            topic_len: topic.len(),
        })
    }

    /// Encode an event and frame it under a topic.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Encoding` or `CoreError::InvalidTopic`.
    pub fn for_event(topic: &str, event: &UpdateEvent) -> Result<Self> {
        let json = encode(event)?;
        Self::new(topic, &json)
    }

    /// The topic part.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.text[..self.topic_len]
    }

    /// The JSON body part.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.text[self.topic_len + FRAME_SEPARATOR.len_utf8()..]
    }

    /// The full frame text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the frame in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Frames always carry a topic, so this is never true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for PublishFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishFrame")
            .field("topic", &self.topic())
            .field("body_len", &self.body().len())
            .finish()
    }
}
