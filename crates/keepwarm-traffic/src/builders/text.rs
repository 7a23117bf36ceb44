use rand::Rng;

use keepwarm_common::EndpointDescriptor;

use super::pick;
use crate::request::{
    ChatCompletionRequest, ChatMessage, CompletionRequest, MessageContent, Payload, Target,
    TrafficRequest,
};

pub const TEMPERATURE: f64 = 0.7;

pub const CHAT_PROMPTS: &[&str] = &[
    "Hello! How are you?",
    "What can you help me with today?",
    "Tell me a fun fact about computers.",
    "What is your purpose?",
    "Can you help me write some code?",
];

pub const COMPLETION_PROMPTS: &[&str] = &[
    "What is machine learning?",
    "Explain the concept of neural networks in simple terms.",
    "Write a haiku about artificial intelligence.",
    "What are the benefits of cloud computing?",
    "Describe the difference between supervised and unsupervised learning.",
];

/// Chat request when the model ships a chat template, raw completion otherwise.
pub fn build<R: Rng + ?Sized>(
    endpoint: &EndpointDescriptor,
    max_tokens: u32,
    rng: &mut R,
) -> TrafficRequest {
    if endpoint.has_chat_template {
        let prompt = pick(CHAT_PROMPTS, rng);
        TrafficRequest {
            target: Target::ChatCompletions,
            payload: Payload::Chat(ChatCompletionRequest {
                model: endpoint.model_name.clone(),
                messages: vec![ChatMessage::user(MessageContent::Text(prompt.to_string()))],
                max_tokens,
                temperature: Some(TEMPERATURE),
            }),
        }
    } else {
        let prompt = pick(COMPLETION_PROMPTS, rng);
        TrafficRequest {
            target: Target::Completions,
            payload: Payload::Completion(CompletionRequest {
                model: endpoint.model_name.clone(),
                prompt: prompt.to_string(),
                max_tokens,
                temperature: TEMPERATURE,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::endpoint;
    use keepwarm_common::TaskKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_chat_template_builds_single_user_message() {
        let ep = endpoint(TaskKind::TextGeneration, "llama", true);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let req = build(&ep, 50, &mut rng);
            assert_eq!(req.target, Target::ChatCompletions);
            let body = req.body().unwrap();
            let messages = body["messages"].as_array().unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0]["role"], "user");
            assert!(CHAT_PROMPTS.contains(&messages[0]["content"].as_str().unwrap()));
            assert!(body.get("prompt").is_none());
            assert_eq!(body["max_tokens"], 50);
            assert_eq!(body["temperature"], 0.7);
            assert_eq!(body["model"], "llama");
        }
    }

    #[test]
    fn test_no_chat_template_builds_prompt() {
        let ep = endpoint(TaskKind::TextGeneration, "gpt2", false);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let req = build(&ep, 12, &mut rng);
            assert_eq!(req.target, Target::Completions);
            let body = req.body().unwrap();
            assert!(COMPLETION_PROMPTS.contains(&body["prompt"].as_str().unwrap()));
            assert!(body.get("messages").is_none());
            assert_eq!(body["max_tokens"], 12);
            assert_eq!(body["temperature"], 0.7);
        }
    }

    #[test]
    fn test_same_seed_same_request() {
        let ep = endpoint(TaskKind::TextGeneration, "llama", true);
        let a = build(&ep, 50, &mut StdRng::seed_from_u64(42));
        let b = build(&ep, 50, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
