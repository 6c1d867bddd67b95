use super::error::{VectorError, VectorResult};

/// Euclidean length of `v`, accumulated in `f64`.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    norm_f64(v) as f32
}

fn norm_f64(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Returns `v` scaled to unit length. A zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = norm_f64(v);
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|&x| (f64::from(x) / norm) as f32).collect()
}

/// Cosine similarity of `a` and `b`, in `[-1, 1]`.
///
/// A zero vector carries no signal and compares as `0.0` against anything. Sums are
/// accumulated in `f64` so large components cannot overflow the norms.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> VectorResult<f32> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
            let (av, bv) = (f64::from(av), f64::from(bv));
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32)
    }
}

/// Cosine similarity floored at zero; anti-correlated vectors contribute nothing.
#[inline]
pub fn clamped_similarity(a: &[f32], b: &[f32]) -> VectorResult<f32> {
    cosine_similarity(a, b).map(|s| s.max(0.0))
}
