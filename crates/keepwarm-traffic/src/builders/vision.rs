use rand::Rng;

use keepwarm_common::EndpointDescriptor;

use super::pick;
use crate::request::{
    ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, MessageContent, Payload, Target,
    TrafficRequest,
};

/// 1x1 red pixel PNG.
pub const PLACEHOLDER_IMAGE_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

pub const VLM_PROMPTS: &[&str] = &[
    "Describe this image in detail.",
    "What do you see in this picture?",
    "What is the main subject of this image?",
];

/// Document-parsing models take the image alone; a text part makes them fail.
pub fn is_parse_model(model_name: &str) -> bool {
    model_name.to_ascii_lowercase().contains("parse")
}

pub fn placeholder_image_uri() -> String {
    format!("data:image/png;base64,{PLACEHOLDER_IMAGE_PNG_BASE64}")
}

pub fn build<R: Rng + ?Sized>(
    endpoint: &EndpointDescriptor,
    max_tokens: u32,
    rng: &mut R,
) -> TrafficRequest {
    let mut parts = vec![ContentPart::ImageUrl {
        image_url: ImageUrl {
            url: placeholder_image_uri(),
        },
    }];
    if !is_parse_model(&endpoint.model_name) {
        parts.push(ContentPart::Text {
            text: pick(VLM_PROMPTS, rng).to_string(),
        });
    }

    TrafficRequest {
        target: Target::ChatCompletions,
        payload: Payload::Chat(ChatCompletionRequest {
            model: endpoint.model_name.clone(),
            messages: vec![ChatMessage::user(MessageContent::Parts(parts))],
            max_tokens,
            temperature: None,
        }),
    }
}
