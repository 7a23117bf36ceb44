use rand::Rng;

use keepwarm_common::EndpointDescriptor;

use super::pick;
use crate::request::{EmbeddingRequest, Payload, Target, TrafficRequest};

/// Asymmetric embedding models reject requests that don't say which side they embed.
pub const INPUT_TYPE: &str = "query";

pub const EMBEDDING_TEXTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "Machine learning is transforming industries",
    "Cloud computing provides scalable infrastructure",
    "Artificial intelligence is advancing rapidly",
    "Data science combines statistics and programming",
];

pub fn build<R: Rng + ?Sized>(endpoint: &EndpointDescriptor, rng: &mut R) -> TrafficRequest {
    TrafficRequest {
        target: Target::Direct,
        payload: Payload::Embedding(EmbeddingRequest {
            model: endpoint.model_name.clone(),
            input: pick(EMBEDDING_TEXTS, rng).to_string(),
            input_type: INPUT_TYPE.to_string(),
        }),
    }
}
