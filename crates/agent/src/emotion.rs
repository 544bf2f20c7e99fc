//! Keyword-based emotion classification
//!
//! Each scored tag owns a set of case-insensitive substring markers. A marker
//! counts once when present, however often it repeats. A tag wins only with at
//! least [`MIN_SCORE`] hits and a strict lead over every other tag; anything
//! else is `Talking`.

use std::sync::Arc;

use once_cell::sync::Lazy;

use avatar_chat_core::EmotionTag;

use crate::AgentError;

/// Minimum distinct marker hits for a non-default tag
pub const MIN_SCORE: usize = 2;

const CELEBRATING_MARKERS: &[&str] = &[
    "congratulations", "great job", "well done", "excellent", "amazing", "fantastic",
    "wonderful", "awesome", "perfect", "brilliant", "impressive", "outstanding", "success",
    "achievement", "celebrate", "hooray", "yay", "bravo", "superb", "🎉", "🎊", "✨", "🌟",
    "⭐", "🏆", "👏", "good job", "nice work", "proud",
    "恭喜", "祝贺", "干得好", "了不起", "庆祝",
];

const THINKING_MARKERS: &[&str] = &[
    "let me explain", "think about", "consider this", "ponder", "analyze", "understand",
    "concept", "theory", "principle", "reason", "because", "therefore", "complex",
    "intricate", "detailed", "specifically", "let's explore", "imagine", "suppose",
    "hypothesis", "question",
    "让我解释", "想一想", "考虑", "分析", "理解", "概念", "原理", "因为", "所以", "假设",
];

const ANGRY_MARKERS: &[&str] = &[
    "careful", "watch out", "warning", "danger", "oops", "mistake", "error", "incorrect",
    "wrong", "avoid", "don't", "shouldn't", "risky", "concern", "worried", "caution",
    "alert", "attention", "important", "critical", "serious", "issue", "problem", "⚠️",
    "❗", "❌",
    "小心", "注意", "警告", "危险", "错误", "风险", "不要", "避免", "严重",
];

/// Built-in marker table, English and Chinese
static DEFAULT_TABLE: Lazy<Arc<KeywordTable>> = Lazy::new(|| {
    Arc::new(KeywordTable {
        entries: vec![
            (EmotionTag::Celebrating, lowered(CELEBRATING_MARKERS)),
            (EmotionTag::Thinking, lowered(THINKING_MARKERS)),
            (EmotionTag::Angry, lowered(ANGRY_MARKERS)),
        ],
    })
});

fn lowered<S: AsRef<str>>(markers: impl IntoIterator<Item = S>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for marker in markers {
        let marker = marker.as_ref().trim().to_lowercase();
        if !marker.is_empty() && !out.contains(&marker) {
            out.push(marker);
        }
    }
    out
}

/// Ordered markers per scored tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(EmotionTag, Vec<String>)>,
}

impl KeywordTable {
    /// Empty table; classifies everything as `Talking`
    pub fn new() -> Self {
        Self::default()
    }

    /// Add markers for a scored tag
    ///
    /// Markers are lower-cased and de-duplicated. `Talking` and the
    /// client-side tags cannot carry markers.
    pub fn with_markers<S: AsRef<str>>(
        mut self,
        tag: EmotionTag,
        markers: impl IntoIterator<Item = S>,
    ) -> Result<Self, AgentError> {
        if !EmotionTag::SCORED.contains(&tag) {
            return Err(AgentError::Config(format!("tag '{}' cannot carry markers", tag)));
        }

        let markers = lowered(markers);
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => {
                for marker in markers {
                    if !existing.contains(&marker) {
                        existing.push(marker);
                    }
                }
            }
            None => self.entries.push((tag, markers)),
        }
        Ok(self)
    }

    pub fn markers(&self, tag: EmotionTag) -> &[String] {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, m)| m.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct marker hits per tag, in table order
    pub fn scores(&self, text: &str) -> Vec<(EmotionTag, usize)> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .map(|(tag, markers)| {
                let hits = markers.iter().filter(|m| lower.contains(m.as_str())).count();
                (*tag, hits)
            })
            .collect()
    }
}

/// Emotion classifier over a shared keyword table
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    table: Arc<KeywordTable>,
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self { table: Arc::clone(&DEFAULT_TABLE) }
    }
}

impl EmotionClassifier {
    pub fn new(table: KeywordTable) -> Self {
        Self { table: Arc::new(table) }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Classify reply text
    pub fn classify(&self, text: &str) -> EmotionTag {
        let scores = self.table.scores(text);

        let Some(&(best_tag, best)) = scores.iter().max_by_key(|(_, score)| *score) else {
            return EmotionTag::Talking;
        };

        let tied = scores.iter().filter(|(_, score)| *score == best).count() > 1;
        if best < MIN_SCORE || tied {
            return EmotionTag::Talking;
        }

        best_tag
    }
}

/// Classify with the built-in table
pub fn classify(text: &str) -> EmotionTag {
    EmotionClassifier::default().classify(text)
}
