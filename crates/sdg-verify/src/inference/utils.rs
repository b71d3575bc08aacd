//! Probability and tokenizer helpers shared by the model wrappers.

use std::io;
use std::path::Path;
use tokenizers::Tokenizer;

/// Numerically stable softmax. Empty input yields an empty vector.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value. Ties resolve to the first occurrence; NaNs are skipped.
pub fn argmax_first(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f64.powi(decimals as i32);
    ((value as f64 * factor).round() / factor) as f32
}

/// Loads a tokenizer from a model directory or explicit `tokenizer.json` path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path.to_path_buf()
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0]);
        let b = softmax(&[1001.0, 1002.0]);
        assert!((a[0] - b[0]).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_edge_cases() {
        assert!(softmax(&[]).is_empty());
        assert_eq!(softmax(&[f32::NAN, f32::NAN]), vec![0.0, 0.0]);
        assert_eq!(softmax(&[5.0]), vec![1.0]);
    }

    #[test]
    fn test_argmax_first_occurrence_wins() {
        assert_eq!(argmax_first(&[0.2, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax_first(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax_first(&[0.1, 0.9]), Some(1));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax_first(&[f32::NAN, 0.3, 0.2]), Some(1));
        assert_eq!(argmax_first(&[f32::NAN]), None);
        assert_eq!(argmax_first(&[]), None);
    }

    #[test]
    fn test_round_to_four_places() {
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(round_to(0.999_96, 4), 1.0);
        assert_eq!(round_to(0.3, 4), 0.3);
    }

    #[test]
    fn test_load_tokenizer_missing() {
        assert!(load_tokenizer(Path::new("/nonexistent/tokenizer.json")).is_err());
    }
}
