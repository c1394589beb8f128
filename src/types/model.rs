use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a DashScope model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or private deployments)
    Custom(String),
}

/// Known DashScope model versions.
///
/// This is the catalog the service advertised for text generation: the
/// hosted qwen commercial tier, the open-weight chat models, and the
/// hosted third-party models.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Qwen turbo tier
    #[serde(rename = "qwen-turbo")]
    QwenTurbo,

    /// Qwen plus tier
    #[serde(rename = "qwen-plus")]
    QwenPlus,

    /// Qwen max tier
    #[serde(rename = "qwen-max")]
    QwenMax,

    /// Qwen max (2023-12-01 snapshot)
    #[serde(rename = "qwen-max-1201")]
    QwenMax1201,

    /// Qwen max with a long context window
    #[serde(rename = "qwen-max-longcontext")]
    QwenMaxLongContext,

    /// Llama 2 7B chat
    #[serde(rename = "llama2-7b-chat-v2")]
    Llama2_7bChatV2,

    /// Llama 2 13B chat
    #[serde(rename = "llama2-13b-chat-v2")]
    Llama2_13bChatV2,

    /// Open-weight Qwen 1.5 72B chat
    #[serde(rename = "qwen1.5-72b-chat")]
    Qwen1_5_72bChat,

    /// Open-weight Qwen 1.5 14B chat
    #[serde(rename = "qwen1.5-14b-chat")]
    Qwen1_5_14bChat,

    /// Open-weight Qwen 1.5 7B chat
    #[serde(rename = "qwen1.5-7b-chat")]
    Qwen1_5_7bChat,

    /// Open-weight Qwen 72B chat
    #[serde(rename = "qwen-72b-chat")]
    Qwen72bChat,

    /// Open-weight Qwen 14B chat
    #[serde(rename = "qwen-14b-chat")]
    Qwen14bChat,

    /// Open-weight Qwen 7B chat
    #[serde(rename = "qwen-7b-chat")]
    Qwen7bChat,

    /// Open-weight Qwen 1.8B chat with a long context window
    #[serde(rename = "qwen-1.8b-longcontext-chat")]
    Qwen1_8bLongContextChat,

    /// Open-weight Qwen 1.8B chat
    #[serde(rename = "qwen-1.8b-chat")]
    Qwen1_8bChat,

    /// Baichuan 2 7B chat
    #[serde(rename = "baichuan2-7b-chat-v1")]
    Baichuan2_7bChatV1,

    /// Baichuan 2 13B chat
    #[serde(rename = "baichuan2-13b-chat-v1")]
    Baichuan2_13bChatV1,

    /// ChatGLM 3 6B
    #[serde(rename = "chatglm3-6b")]
    ChatGlm3_6b,

    /// Sanle v1
    #[serde(rename = "sanle-v1")]
    SanleV1,

    /// Ziya Llama 13B
    #[serde(rename = "ziya-llama-13b-v1")]
    ZiyaLlama13bV1,

    /// Dolly 12B
    #[serde(rename = "dolly-12b-v2")]
    Dolly12bV2,

    /// BELLE Llama 13B (2M instructions)
    #[serde(rename = "belle-llama-13b-2m-v1")]
    BelleLlama13b2mV1,

    /// MOSS Moon 003 SFT
    #[serde(rename = "moss-moon-003-sft-v1")]
    MossMoon003SftV1,

    /// ChatYuan large
    #[serde(rename = "chatyuan-large-v2")]
    ChatyuanLargeV2,

    /// BiLLa 7B SFT
    #[serde(rename = "billa-7b-sft-v1")]
    Billa7bSftV1,
}

impl KnownModel {
    /// All known models, in the order the service catalogs them.
    pub fn all() -> &'static [KnownModel] {
        &[
            KnownModel::QwenTurbo,
            KnownModel::QwenPlus,
            KnownModel::QwenMax,
            KnownModel::QwenMax1201,
            KnownModel::QwenMaxLongContext,
            KnownModel::Llama2_7bChatV2,
            KnownModel::Llama2_13bChatV2,
            KnownModel::Qwen1_5_72bChat,
            KnownModel::Qwen1_5_14bChat,
            KnownModel::Qwen1_5_7bChat,
            KnownModel::Qwen72bChat,
            KnownModel::Qwen14bChat,
            KnownModel::Qwen7bChat,
            KnownModel::Qwen1_8bLongContextChat,
            KnownModel::Qwen1_8bChat,
            KnownModel::Baichuan2_7bChatV1,
            KnownModel::Baichuan2_13bChatV1,
            KnownModel::ChatGlm3_6b,
            KnownModel::SanleV1,
            KnownModel::ZiyaLlama13bV1,
            KnownModel::Dolly12bV2,
            KnownModel::BelleLlama13b2mV1,
            KnownModel::MossMoon003SftV1,
            KnownModel::ChatyuanLargeV2,
            KnownModel::Billa7bSftV1,
        ]
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::QwenTurbo => write!(f, "qwen-turbo"),
            KnownModel::QwenPlus => write!(f, "qwen-plus"),
            KnownModel::QwenMax => write!(f, "qwen-max"),
            KnownModel::QwenMax1201 => write!(f, "qwen-max-1201"),
            KnownModel::QwenMaxLongContext => write!(f, "qwen-max-longcontext"),
            KnownModel::Llama2_7bChatV2 => write!(f, "llama2-7b-chat-v2"),
            KnownModel::Llama2_13bChatV2 => write!(f, "llama2-13b-chat-v2"),
            KnownModel::Qwen1_5_72bChat => write!(f, "qwen1.5-72b-chat"),
            KnownModel::Qwen1_5_14bChat => write!(f, "qwen1.5-14b-chat"),
            KnownModel::Qwen1_5_7bChat => write!(f, "qwen1.5-7b-chat"),
            KnownModel::Qwen72bChat => write!(f, "qwen-72b-chat"),
            KnownModel::Qwen14bChat => write!(f, "qwen-14b-chat"),
            KnownModel::Qwen7bChat => write!(f, "qwen-7b-chat"),
            KnownModel::Qwen1_8bLongContextChat => write!(f, "qwen-1.8b-longcontext-chat"),
            KnownModel::Qwen1_8bChat => write!(f, "qwen-1.8b-chat"),
            KnownModel::Baichuan2_7bChatV1 => write!(f, "baichuan2-7b-chat-v1"),
            KnownModel::Baichuan2_13bChatV1 => write!(f, "baichuan2-13b-chat-v1"),
            KnownModel::ChatGlm3_6b => write!(f, "chatglm3-6b"),
            KnownModel::SanleV1 => write!(f, "sanle-v1"),
            KnownModel::ZiyaLlama13bV1 => write!(f, "ziya-llama-13b-v1"),
            KnownModel::Dolly12bV2 => write!(f, "dolly-12b-v2"),
            KnownModel::BelleLlama13b2mV1 => write!(f, "belle-llama-13b-2m-v1"),
            KnownModel::MossMoon003SftV1 => write!(f, "moss-moon-003-sft-v1"),
            KnownModel::ChatyuanLargeV2 => write!(f, "chatyuan-large-v2"),
            KnownModel::Billa7bSftV1 => write!(f, "billa-7b-sft-v1"),
        }
    }
}

/// Error returned when parsing an unrecognized model string.
#[derive(Debug)]
pub struct ModelParseError {
    /// The string that did not match a known model.
    pub invalid_value: String,
}

impl fmt::Display for ModelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {}", self.invalid_value)
    }
}

impl std::error::Error for ModelParseError {}

impl FromStr for KnownModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::all()
            .iter()
            .copied()
            .find(|model| model.to_string() == s)
            .ok_or_else(|| ModelParseError {
                invalid_value: s.to_string(),
            })
    }
}

impl FromStr for Model {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(s.to_string())))
    }
}
