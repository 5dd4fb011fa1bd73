//! Content scoring used by the similar-content and recommendation endpoints.
//!
//! A content piece is reduced to a sparse vector keyed by `group/category`.
//! Cosine similarity uses the category weights; Jaccard only looks at which
//! keys are present. Both land in `[0.0, 1.0]`.

use std::collections::{HashMap, HashSet};

use crate::{Content, Scored};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Cosine,
    Jaccard,
}

impl Algorithm {
    /// `jaccard` (any case) selects Jaccard; anything else, including
    /// nothing, selects cosine.
    pub fn from_param(algo: Option<&str>) -> Self {
        match algo {
            Some(a) if a.trim().eq_ignore_ascii_case("jaccard") => Algorithm::Jaccard,
            _ => Algorithm::Cosine,
        }
    }
}

pub type Vector = HashMap<String, f64>;

/// Flatten `content`'s categories, keeping only `groups` when given.
pub fn vector(content: &Content, groups: Option<&HashSet<String>>) -> Vector {
    let mut out = Vector::new();
    for (group, categories) in &content.categories {
        if groups.is_some_and(|g| !g.contains(group)) {
            continue;
        }
        for category in categories {
            *out.entry(format!("{group}/{}", category.id)).or_default() += category.weight;
        }
    }
    out
}

pub fn score(algorithm: Algorithm, a: &Vector, b: &Vector) -> f64 {
    let raw = match algorithm {
        Algorithm::Cosine => cosine(a, b),
        Algorithm::Jaccard => jaccard(a, b),
    };
    raw.clamp(0.0, 1.0)
}

fn cosine(a: &Vector, b: &Vector) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(k, x)| b.get(k).map(|y| x * y))
        .sum();
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn jaccard(a: &Vector, b: &Vector) -> f64 {
    let union = a.keys().chain(b.keys()).collect::<HashSet<_>>().len();
    if union == 0 {
        return 0.0;
    }
    let shared = a.keys().filter(|k| b.contains_key(*k)).count();
    shared as f64 / union as f64
}

/// Highest score first, ties broken by id; truncated to `take` when positive.
pub fn rank(mut scored: Vec<Scored>, take: Option<i64>) -> Vec<Scored> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    if let Some(take) = take.filter(|n| *n > 0) {
        scored.truncate(usize::try_from(take).unwrap_or(usize::MAX));
    }
    scored
}
