use tracing::warn;

/// Cosine similarity clamped to `[0, 1]`.
///
/// Returns 0 for empty vectors, zero vectors and mismatched dimensions. A dimension
/// mismatch means two different encoders fed the same comparison and is logged.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() != b.len() {
        warn!(
            left_dim = a.len(),
            right_dim = b.len(),
            "Embedding dimension mismatch, scoring as 0"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
