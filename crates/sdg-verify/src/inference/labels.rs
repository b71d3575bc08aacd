//! Class label files and `id2label` maps.
//!
//! A label file holds one label per line, or `index label` pairs. Blank lines
//! are ignored. When every line carries a numeric prefix the labels are
//! ordered by that index, which must run `0..n` without gaps.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::error::InferenceError;
use crate::constants::UNKNOWN_MODEL_LABEL;

/// Reads and parses a label file.
pub fn load_label_file(path: &Path) -> Result<Vec<String>, InferenceError> {
    let content = std::fs::read_to_string(path).map_err(|e| InferenceError::LabelFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let labels = parse_labels(&content).map_err(|reason| InferenceError::LabelFile {
        path: path.to_path_buf(),
        reason,
    })?;

    debug!(path = %path.display(), count = labels.len(), "Loaded label file");
    Ok(labels)
}

/// Parses label file content.
pub fn parse_labels(content: &str) -> Result<Vec<String>, String> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err("label file contains no labels".to_string());
    }

    let indexed: Vec<(usize, &str)> = lines.iter().filter_map(|l| split_index(l)).collect();
    if indexed.len() != lines.len() {
        return Ok(lines.into_iter().map(str::to_string).collect());
    }

    let mut by_index = BTreeMap::new();
    for (idx, label) in indexed {
        if by_index.insert(idx, label.to_string()).is_some() {
            return Err(format!("duplicate label index {idx}"));
        }
    }

    for (expected, idx) in by_index.keys().enumerate() {
        if *idx != expected {
            return Err(format!("label index {expected} is missing"));
        }
    }

    Ok(by_index.into_values().collect())
}

fn split_index(line: &str) -> Option<(usize, &str)> {
    let (head, rest) = line.split_once(char::is_whitespace)?;
    let idx = head.parse::<usize>().ok()?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some((idx, rest))
}

/// Flattens a Hugging Face `id2label` map into an index-ordered list.
///
/// Holes up to the largest index are filled with [`UNKNOWN_MODEL_LABEL`].
pub fn labels_from_id2label(map: &BTreeMap<String, String>) -> Vec<String> {
    let parsed: BTreeMap<usize, &String> = map
        .iter()
        .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|k| (k, v)))
        .collect();

    let Some(max) = parsed.keys().next_back().copied() else {
        return Vec::new();
    };

    (0..=max)
        .map(|idx| {
            parsed
                .get(&idx)
                .map(|l| l.to_string())
                .unwrap_or_else(|| UNKNOWN_MODEL_LABEL.to_string())
        })
        .collect()
}
