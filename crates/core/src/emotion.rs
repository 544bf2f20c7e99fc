//! Emotion vocabulary
//!
//! The seven tags below are a contract with the rendering layer, which maps
//! each one to an avatar animation. Adding a value requires a matching change
//! on the client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Avatar emotion tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionTag {
    /// Resting state, client-side only
    Idle,
    /// Default tag for any reply without a strong signal
    #[default]
    Talking,
    Thinking,
    Angry,
    Celebrating,
    /// Decorative state, client-side only
    CrazyDance,
    /// Client-side only
    Confused,
}

impl EmotionTag {
    /// Every tag in the vocabulary, in wire order
    pub const ALL: [EmotionTag; 7] = [
        EmotionTag::Idle,
        EmotionTag::Talking,
        EmotionTag::Thinking,
        EmotionTag::Angry,
        EmotionTag::Celebrating,
        EmotionTag::CrazyDance,
        EmotionTag::Confused,
    ];

    /// Tags that carry a keyword set and can win a classification
    pub const SCORED: [EmotionTag; 3] = [
        EmotionTag::Celebrating,
        EmotionTag::Thinking,
        EmotionTag::Angry,
    ];

    /// Wire name of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Idle => "idle",
            EmotionTag::Talking => "talking",
            EmotionTag::Thinking => "thinking",
            EmotionTag::Angry => "angry",
            EmotionTag::Celebrating => "celebrating",
            EmotionTag::CrazyDance => "crazy_dance",
            EmotionTag::Confused => "confused",
        }
    }

    /// Whether the server-side classifier may ever emit this tag
    pub fn is_server_emitted(&self) -> bool {
        matches!(
            self,
            EmotionTag::Talking | EmotionTag::Thinking | EmotionTag::Angry | EmotionTag::Celebrating
        )
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionTag {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown emotion tag: {}", s)))
    }
}
