use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents an OpenAI model identifier.
///
/// This can be a member of the supported model list or a custom string
/// value carried through from a config or session file.  Only `Known`
/// models pass validation in `set model` / `set default model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Supported model versions.
    Known(KnownModel),

    /// Custom model identifier (not accepted by validation, but kept so
    /// that persisted documents with unknown models still parse).
    Custom(String),
}

impl Model {
    /// True if this model is in the supported list.
    pub fn is_supported(&self) -> bool {
        matches!(self, Model::Known(_))
    }
}

/// Supported OpenAI model versions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// GPT-4.1
    #[serde(rename = "gpt-4.1")]
    Gpt41,

    /// GPT-4.1 mini
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,

    /// GPT-4.1 nano
    #[serde(rename = "gpt-4.1-nano")]
    Gpt41Nano,

    /// GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o,

    /// GPT-4o mini
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,

    /// GPT-4o mini with web search
    #[serde(rename = "gpt-4o-mini-search-preview")]
    Gpt4oMiniSearchPreview,

    /// GPT-4o with web search
    #[serde(rename = "gpt-4o-search-preview")]
    Gpt4oSearchPreview,

    /// The ChatGPT product model alias
    #[serde(rename = "chatgpt-4o-latest")]
    Chatgpt4oLatest,

    /// GPT-4 Turbo
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,

    /// GPT-4 Turbo preview alias
    #[serde(rename = "gpt-4-turbo-preview")]
    Gpt4TurboPreview,

    /// GPT-4 (2024-01-25 preview)
    #[serde(rename = "gpt-4-0125-preview")]
    Gpt40125Preview,

    /// GPT-4 (2023-11-06 preview)
    #[serde(rename = "gpt-4-1106-preview")]
    Gpt41106Preview,

    /// GPT-4 (2023-06-13)
    #[serde(rename = "gpt-4-0613")]
    Gpt40613,

    /// GPT-3.5 Turbo
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,

    /// GPT-3.5 Turbo (2024-01-25)
    #[serde(rename = "gpt-3.5-turbo-0125")]
    Gpt35Turbo0125,

    /// GPT-3.5 Turbo (2023-11-06)
    #[serde(rename = "gpt-3.5-turbo-1106")]
    Gpt35Turbo1106,

    /// GPT-3.5 Turbo with 16k context
    #[serde(rename = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,

    /// o1 reasoning model
    #[serde(rename = "o1")]
    O1,

    /// o1-mini reasoning model
    #[serde(rename = "o1-mini")]
    O1Mini,

    /// o1 preview
    #[serde(rename = "o1-preview")]
    O1Preview,

    /// o3 reasoning model
    #[serde(rename = "o3")]
    O3,

    /// o3-mini reasoning model
    #[serde(rename = "o3-mini")]
    O3Mini,

    /// o4-mini reasoning model
    #[serde(rename = "o4-mini")]
    O4Mini,
}

impl KnownModel {
    /// All supported models, in display order.
    pub const ALL: &'static [KnownModel] = &[
        KnownModel::Gpt41,
        KnownModel::Gpt41Mini,
        KnownModel::Gpt41Nano,
        KnownModel::Gpt4o,
        KnownModel::Gpt4oMini,
        KnownModel::Gpt4oMiniSearchPreview,
        KnownModel::Gpt4oSearchPreview,
        KnownModel::Chatgpt4oLatest,
        KnownModel::Gpt4Turbo,
        KnownModel::Gpt4TurboPreview,
        KnownModel::Gpt40125Preview,
        KnownModel::Gpt41106Preview,
        KnownModel::Gpt40613,
        KnownModel::Gpt35Turbo,
        KnownModel::Gpt35Turbo0125,
        KnownModel::Gpt35Turbo1106,
        KnownModel::Gpt35Turbo16k,
        KnownModel::O1,
        KnownModel::O1Mini,
        KnownModel::O1Preview,
        KnownModel::O3,
        KnownModel::O3Mini,
        KnownModel::O4Mini,
    ];

    /// The identifier string sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gpt41 => "gpt-4.1",
            KnownModel::Gpt41Mini => "gpt-4.1-mini",
            KnownModel::Gpt41Nano => "gpt-4.1-nano",
            KnownModel::Gpt4o => "gpt-4o",
            KnownModel::Gpt4oMini => "gpt-4o-mini",
            KnownModel::Gpt4oMiniSearchPreview => "gpt-4o-mini-search-preview",
            KnownModel::Gpt4oSearchPreview => "gpt-4o-search-preview",
            KnownModel::Chatgpt4oLatest => "chatgpt-4o-latest",
            KnownModel::Gpt4Turbo => "gpt-4-turbo",
            KnownModel::Gpt4TurboPreview => "gpt-4-turbo-preview",
            KnownModel::Gpt40125Preview => "gpt-4-0125-preview",
            KnownModel::Gpt41106Preview => "gpt-4-1106-preview",
            KnownModel::Gpt40613 => "gpt-4-0613",
            KnownModel::Gpt35Turbo => "gpt-3.5-turbo",
            KnownModel::Gpt35Turbo0125 => "gpt-3.5-turbo-0125",
            KnownModel::Gpt35Turbo1106 => "gpt-3.5-turbo-1106",
            KnownModel::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
            KnownModel::O1 => "o1",
            KnownModel::O1Mini => "o1-mini",
            KnownModel::O1Preview => "o1-preview",
            KnownModel::O3 => "o3",
            KnownModel::O3Mini => "o3-mini",
            KnownModel::O4Mini => "o4-mini",
        }
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
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == s)
            .ok_or(())
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(()) => Model::Custom(model),
        }
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::from(model.to_string())
    }
}
