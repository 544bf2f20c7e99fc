//! Chat reply returned to clients

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::EmotionTag;

/// Structured assistant reply
///
/// Serialized flat into the HTTP response body:
/// `{ "message", "emotion", "audioBase64"?, "timestamp" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text
    #[serde(rename = "message")]
    pub text: String,
    /// Avatar emotion derived from the text
    pub emotion: EmotionTag,
    /// Base64-encoded audio, absent when synthesis was skipped or failed
    #[serde(
        rename = "audioBase64",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub audio: Option<String>,
    /// Local wall-clock time, "HH:MM"
    pub timestamp: String,
}

impl ChatReply {
    /// Create a reply stamped with the current local time
    pub fn new(text: impl Into<String>, emotion: EmotionTag) -> Self {
        Self::at(text, emotion, Local::now().time())
    }

    /// Create a reply stamped with an explicit time
    pub fn at(text: impl Into<String>, emotion: EmotionTag, time: NaiveTime) -> Self {
        Self {
            text: text.into(),
            emotion,
            audio: None,
            timestamp: format_timestamp(time),
        }
    }

    /// Attach base64 audio
    pub fn with_audio(mut self, audio: Option<String>) -> Self {
        self.audio = audio;
        self
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Format a time as zero-padded "HH:MM" (24h)
pub fn format_timestamp(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let time = NaiveTime::from_hms_opt(9, 5, 42).unwrap();
        assert_eq!(format_timestamp(time), "09:05");

        let time = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(format_timestamp(time), "23:59");
    }

    #[test]
    fn test_now_timestamp_shape() {
        let reply = ChatReply::new("hi", EmotionTag::Talking);
        assert_eq!(reply.timestamp.len(), 5);
        assert_eq!(reply.timestamp.as_bytes()[2], b':');
    }

    #[test]
    fn test_serialization_without_audio() {
        let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        let reply = ChatReply::at("你好", EmotionTag::Talking, time);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["message"], "你好");
        assert_eq!(json["emotion"], "talking");
        assert_eq!(json["timestamp"], "14:30");
        assert!(json.get("audioBase64").is_none());
    }

    #[test]
    fn test_serialization_with_audio() {
        let time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let reply = ChatReply::at("Great job!", EmotionTag::Celebrating, time)
            .with_audio(Some("SUQz".to_string()));

        assert!(reply.has_audio());
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["audioBase64"], "SUQz");
        assert_eq!(json["emotion"], "celebrating");
    }
}
