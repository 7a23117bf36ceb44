//! Request builders, one per task family.
//!
//! Builders are pure: they read the endpoint descriptor, draw from the injected
//! random source, and return a [`TrafficRequest`](crate::request::TrafficRequest).
//! Each builder owns the static sample corpus it draws from.

pub mod embedding;
pub mod rerank;
pub mod text;
pub mod vision;

use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly pick one entry of a non-empty static corpus.
pub(crate) fn pick<'a, R: Rng + ?Sized>(corpus: &'a [&'a str], rng: &mut R) -> &'a str {
    corpus.choose(rng).copied().unwrap_or_default()
}
