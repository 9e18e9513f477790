//! Vector math for embedding comparison

/// Cosine similarity between two equal-length vectors.
///
/// Returns `NaN` when either vector has zero magnitude or the lengths differ.
/// Callers ranking by this score must treat `NaN` as the lowest possible
/// similarity (see [`rank_key`]).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::NAN;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::NAN;
    }

    dot / (mag_a * mag_b)
}

/// Ordering key for a similarity score; `NaN` sorts below every real score.
pub fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
