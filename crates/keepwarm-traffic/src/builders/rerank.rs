use rand::seq::SliceRandom;
use rand::Rng;

use keepwarm_common::EndpointDescriptor;

use crate::request::{
    Payload, RerankDocumentsRequest, RerankRequest, Target, TextItem, TrafficRequest,
};

pub struct RerankSample {
    pub query: &'static str,
    pub documents: &'static [&'static str],
}

pub const RERANK_SAMPLES: &[RerankSample] = &[
    RerankSample {
        query: "What is machine learning?",
        documents: &[
            "Machine learning is a subset of artificial intelligence.",
            "The weather today is sunny and warm.",
            "Neural networks are inspired by biological neurons.",
            "Pizza is a popular Italian food.",
        ],
    },
    RerankSample {
        query: "benefits of cloud computing",
        documents: &[
            "Cloud computing offers scalability and flexibility.",
            "Cats are popular pets around the world.",
            "Cost savings are a major advantage of cloud services.",
            "Mountains are formed by tectonic activity.",
        ],
    },
];

/// Both shapes of one sampled rerank query. `fallback` is only sent when the
/// endpoint rejects `primary`.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankRequests {
    pub primary: TrafficRequest,
    pub fallback: TrafficRequest,
}

pub fn build<R: Rng + ?Sized>(endpoint: &EndpointDescriptor, rng: &mut R) -> RerankRequests {
    let sample = RERANK_SAMPLES
        .choose(rng)
        .unwrap_or(&RERANK_SAMPLES[0]);

    let primary = TrafficRequest {
        target: Target::Direct,
        payload: Payload::Rerank(RerankRequest {
            model: endpoint.model_name.clone(),
            query: TextItem {
                text: sample.query.to_string(),
            },
            passages: sample
                .documents
                .iter()
                .map(|doc| TextItem {
                    text: doc.to_string(),
                })
                .collect(),
        }),
    };

    let fallback = TrafficRequest {
        target: Target::Direct,
        payload: Payload::RerankDocuments(RerankDocumentsRequest {
            model: endpoint.model_name.clone(),
            query: sample.query.to_string(),
            documents: sample.documents.iter().map(|d| d.to_string()).collect(),
        }),
    };

    RerankRequests { primary, fallback }
}
