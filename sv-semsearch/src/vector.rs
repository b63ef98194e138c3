//! Vector persistence format and similarity scoring.
//!
//! Vectors are stored as little-endian f32 blobs, one value after another.
//! Providers hand back f64 components; they are narrowed on the way in.

/// Encode a vector as a little-endian f32 blob.
pub fn to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decode a little-endian f32 blob. `None` if the length is not a multiple
/// of four bytes.
pub fn from_blob(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Narrow provider output (f64) to the stored precision.
pub fn narrow_to_f32(vector: &[f64]) -> Vec<f32> {
    vector.iter().map(|v| *v as f32).collect()
}

/// Cosine similarity in `[-1, 1]`.
///
/// Dimension mismatches and zero-norm vectors score `0.0` rather than
/// erroring; a stale row from an older model simply never ranks.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
