//! Persona configuration
//!
//! The system prompt sent to every provider, plus the static replies used
//! when no provider produces text. `language` selects the built-in texts;
//! any text set explicitly in configuration overrides them.

use serde::{Deserialize, Serialize};
use std::fmt;

const ZH_SYSTEM_PROMPT: &str = "你是AI4CZ的官方AI助手！你专注于AI4CZ项目和社区。

关于AI4CZ：
- AI4CZ是一个创新的AI驱动项目，建立在BNB Chain上
- 官方Twitter账号：https://x.com/ai4_cz
- 你是AI4CZ社区的智能助手，帮助用户了解项目和参与社区

严格限制：
- 你只讨论与AI4CZ项目直接相关的话题
- 当被问到其他话题时，礼貌地引导回AI4CZ
- 始终提及官方Twitter账号是 https://x.com/ai4_cz
- 鼓励用户关注我们的Twitter获取最新更新

你的性格：专业、友好、充满热情。你对AI4CZ项目充满信心。
你用中文自然且对话式地交流。
保持回复简洁（每条消息最多2-3句话）。";

const ZH_NOT_CONFIGURED: &str =
    "你好！看起来我没有配置AI凭据。请确保在环境变量中设置了OPENAI_API_KEY或ANTHROPIC_API_KEY。";

const ZH_PROVIDER_ERROR: &str = "哎呀！处理时出现了一个小错误。你能再试一次吗？";

const EN_SYSTEM_PROMPT: &str = "You are the official AI assistant of AI4CZ, focused on the AI4CZ project and its community.

About AI4CZ:
- AI4CZ is an innovative AI-driven project built on BNB Chain
- Official Twitter account: https://x.com/ai4_cz
- You are the community assistant, helping users learn about the project and take part

Strict limits:
- Only discuss topics directly related to AI4CZ
- When asked about anything else, politely steer back to AI4CZ
- Always mention the official Twitter account https://x.com/ai4_cz
- Encourage users to follow the Twitter account for the latest updates

Personality: professional and friendly, with real enthusiasm for AI4CZ.
Reply in natural, conversational English.
Keep replies short (2-3 sentences per message).";

const EN_NOT_CONFIGURED: &str =
    "Hi! It looks like no AI credentials are configured. Please set OPENAI_API_KEY or ANTHROPIC_API_KEY in the environment.";

const EN_PROVIDER_ERROR: &str = "Oops! Something went wrong while processing that. Could you try again?";

/// Reply language of the persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonaLanguage {
    #[default]
    Zh,
    En,
}

impl PersonaLanguage {
    /// BCP 47 tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaLanguage::Zh => "zh",
            PersonaLanguage::En => "en",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            PersonaLanguage::Zh => ZH_SYSTEM_PROMPT,
            PersonaLanguage::En => EN_SYSTEM_PROMPT,
        }
    }

    fn not_configured_message(&self) -> &'static str {
        match self {
            PersonaLanguage::Zh => ZH_NOT_CONFIGURED,
            PersonaLanguage::En => EN_NOT_CONFIGURED,
        }
    }

    fn provider_error_message(&self) -> &'static str {
        match self {
            PersonaLanguage::Zh => ZH_PROVIDER_ERROR,
            PersonaLanguage::En => EN_PROVIDER_ERROR,
        }
    }
}

impl fmt::Display for PersonaLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persona and static reply configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersonaFile")]
pub struct PersonaConfig {
    /// Reply language; picks the built-in texts below
    pub language: PersonaLanguage,

    /// System prompt: identity, persona and topical constraints
    pub system_prompt: String,

    /// Static reply when no provider is configured
    pub not_configured_message: String,

    /// Static reply when every configured provider failed
    pub provider_error_message: String,
}

impl PersonaConfig {
    /// Built-in persona for a language
    pub fn for_language(language: PersonaLanguage) -> Self {
        Self {
            language,
            system_prompt: language.system_prompt().to_string(),
            not_configured_message: language.not_configured_message().to_string(),
            provider_error_message: language.provider_error_message().to_string(),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self::for_language(PersonaLanguage::default())
    }
}

/// Persona as written in configuration; unset texts come from `language`
#[derive(Deserialize)]
struct PersonaFile {
    #[serde(default)]
    language: PersonaLanguage,
    system_prompt: Option<String>,
    not_configured_message: Option<String>,
    provider_error_message: Option<String>,
}

impl From<PersonaFile> for PersonaConfig {
    fn from(file: PersonaFile) -> Self {
        let defaults = PersonaConfig::for_language(file.language);
        Self {
            language: file.language,
            system_prompt: file.system_prompt.unwrap_or(defaults.system_prompt),
            not_configured_message: file
                .not_configured_message
                .unwrap_or(defaults.not_configured_message),
            provider_error_message: file
                .provider_error_message
                .unwrap_or(defaults.provider_error_message),
        }
    }
}
