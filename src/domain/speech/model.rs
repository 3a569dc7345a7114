use super::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// OpenAI speech models offered to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeechModel {
    #[serde(rename = "tts-1")]
    Standard,
    #[serde(rename = "tts-1-hd")]
    Hd,
}

impl SpeechModel {
    pub const ALL: [SpeechModel; 2] = [SpeechModel::Standard, SpeechModel::Hd];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechModel::Standard => "tts-1",
            SpeechModel::Hd => "tts-1-hd",
        }
    }

    pub fn to_openai(self) -> async_openai::types::SpeechModel {
        match self {
            SpeechModel::Standard => async_openai::types::SpeechModel::Tts1,
            SpeechModel::Hd => async_openai::types::SpeechModel::Tts1Hd,
        }
    }
}

impl Default for SpeechModel {
    fn default() -> Self {
        SpeechModel::Standard
    }
}

impl fmt::Display for SpeechModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeechModel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(GenerationError::Validation(
                "Model name must be specified".to_string(),
            )),
            "tts-1" => Ok(SpeechModel::Standard),
            "tts-1-hd" => Ok(SpeechModel::Hd),
            other => Err(GenerationError::Validation(format!(
                "Unsupported model '{}'",
                other
            ))),
        }
    }
}

/// The six voices exposed by the speech API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    pub fn to_openai(self) -> async_openai::types::Voice {
        use async_openai::types::Voice as OpenAiVoice;
        match self {
            Voice::Alloy => OpenAiVoice::Alloy,
            Voice::Echo => OpenAiVoice::Echo,
            Voice::Fable => OpenAiVoice::Fable,
            Voice::Onyx => OpenAiVoice::Onyx,
            Voice::Nova => OpenAiVoice::Nova,
            Voice::Shimmer => OpenAiVoice::Shimmer,
        }
    }

    /// Introduction line used when generating the voice sample files
    pub fn introduction(&self) -> &'static str {
        match self {
            Voice::Alloy => "Hello, I'm Alloy. I'm a versatile, general-purpose voice that's great for explanations, presentations, and everyday content.",
            Voice::Echo => "Hi there, I'm Echo. My smooth, natural delivery is perfect for narration, storytelling, and educational material.",
            Voice::Fable => "Greetings, I'm Fable. My authoritative tone is ideal for documentaries, podcasts, and more formal content.",
            Voice::Onyx => "Hello, I'm Onyx. My deep, engaging voice works well for announcements, marketing, and professional presentations.",
            Voice::Nova => "Hi, I'm Nova. My warm, pleasant tone is great for friendly content, customer service, and approachable narratives.",
            Voice::Shimmer => "Hello, I'm Shimmer. My clear, articulate delivery is excellent for instructional content, tutorials, and detailed explanations.",
        }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Voice::Alloy
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err(GenerationError::Validation(
                "Voice name must be specified".to_string(),
            ));
        }
        Voice::ALL
            .into_iter()
            .find(|voice| voice.as_str() == name)
            .ok_or_else(|| GenerationError::Validation(format!("Unsupported voice '{}'", name)))
    }
}

/// Input of one pipeline run
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub destination: PathBuf,
    pub model: SpeechModel,
    pub voice: Voice,
}

/// A synthesized audio file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// The final artifact of a generation plus the metrics callers log
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub chunk_count: usize,
    pub elapsed: Duration,
}
