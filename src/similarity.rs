//! Semantic similarity calculations for embeddings
//!
//! Provides cosine similarity and k-nearest-neighbor search for node embeddings.
//! Search is a linear scan with no index, O(n·d) per query.

use serde::Serialize;

use crate::db::NodeEmbedding;

/// A candidate ranked by similarity to the query embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarNode {
    pub id: String,
    pub similarity: f32,
}

/// Cosine similarity between two embedding vectors
/// Returns a value between -1.0 and 1.0 (1.0 = identical, 0.0 = orthogonal).
/// Mismatched lengths, empty input, or a zero vector give 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        // Rounding can push parallel vectors a hair past 1
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Compute the centroid (average) of multiple embeddings
/// Returns a normalized centroid vector. Embeddings whose dimension differs
/// from the first one are skipped.
pub fn compute_centroid(embeddings: &[&[f32]]) -> Option<Vec<f32>> {
    let dim = embeddings.first()?.len();
    if dim == 0 {
        return None;
    }

    let mut centroid = vec![0.0f32; dim];
    let mut used = 0usize;
    for emb in embeddings.iter().filter(|e| e.len() == dim) {
        for (c, &val) in centroid.iter_mut().zip(emb.iter()) {
            *c += val;
        }
        used += 1;
    }

    let n = used as f32;
    for val in &mut centroid {
        *val /= n;
    }

    // Normalize (L2 norm)
    let norm: f32 = centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        for val in &mut centroid {
            *val /= norm;
        }
    }

    Some(centroid)
}

/// Find the top N most similar nodes to a target embedding.
///
/// `exclude_id` is never returned (typically the query node itself) and
/// `min_similarity` is inclusive. Results are sorted by similarity descending.
pub fn find_similar(
    target_embedding: &[f32],
    candidates: &[NodeEmbedding],
    exclude_id: &str,
    top_n: usize,
    min_similarity: f32,
) -> Vec<SimilarNode> {
    let mut similarities: Vec<SimilarNode> = candidates
        .iter()
        .filter(|c| c.id != exclude_id)
        .map(|c| SimilarNode {
            id: c.id.clone(),
            similarity: cosine_similarity(target_embedding, &c.embedding),
        })
        .filter(|s| s.similarity >= min_similarity)
        .collect();

    similarities.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    similarities.truncate(top_n);
    similarities
}
