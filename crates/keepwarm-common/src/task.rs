use std::fmt;

use serde::{Deserialize, Serialize};

/// Task family an endpoint serves, as reported by the directory service.
///
/// Parsing is case-insensitive. Tags outside the known set are kept verbatim in
/// [`TaskKind::Unknown`] so they can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    TextGeneration,
    Embed,
    Rank,
    ImageTextToText,
    ObjectDetection,
    SpeechToText,
    TextToSpeech,
    Inference,
    Unknown(String),
}

impl TaskKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TEXT_GENERATION" | "TEXT_TO_TEXT_GENERATION" => TaskKind::TextGeneration,
            "EMBED" => TaskKind::Embed,
            "RANK" => TaskKind::Rank,
            "IMAGE_TEXT_TO_TEXT" => TaskKind::ImageTextToText,
            "OBJECT_DETECTION" => TaskKind::ObjectDetection,
            "SPEECH_TO_TEXT" => TaskKind::SpeechToText,
            "TEXT_TO_SPEECH" => TaskKind::TextToSpeech,
            "INFERENCE" => TaskKind::Inference,
            _ => TaskKind::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::TextGeneration => "TEXT_GENERATION",
            TaskKind::Embed => "EMBED",
            TaskKind::Rank => "RANK",
            TaskKind::ImageTextToText => "IMAGE_TEXT_TO_TEXT",
            TaskKind::ObjectDetection => "OBJECT_DETECTION",
            TaskKind::SpeechToText => "SPEECH_TO_TEXT",
            TaskKind::TextToSpeech => "TEXT_TO_SPEECH",
            TaskKind::Inference => "INFERENCE",
            TaskKind::Unknown(raw) => raw,
        }
    }
}

impl From<String> for TaskKind {
    fn from(raw: String) -> Self {
        TaskKind::parse(&raw)
    }
}

impl From<TaskKind> for String {
    fn from(task: TaskKind) -> Self {
        task.as_str().to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
