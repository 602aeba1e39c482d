//! Length-adequacy scoring.

/// Scores the student answer's length against the reference.
///
/// Token counts are floored at 1. Below `min_length_ratio` of the reference
/// length the score falls off sub-linearly; otherwise it is the raw ratio
/// capped at 1. Monotonic non-decreasing in the student length up to the
/// reference length.
pub fn length_score(student_tokens: usize, reference_tokens: usize, min_length_ratio: f32) -> f32 {
    let s_len = student_tokens.max(1) as f32;
    let r_len = reference_tokens.max(1) as f32;

    if s_len < min_length_ratio * r_len {
        s_len / (min_length_ratio * r_len)
    } else {
        (s_len / r_len).min(1.0)
    }
}
