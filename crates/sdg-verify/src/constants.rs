//! Cross-cutting, shared constants.
//!
//! Thresholds and limits here are defaults only. Everything a deployment may
//! want to tune is also reachable through [`crate::config::Config`].

/// Square input edge expected by both scorers.
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Decimal places kept on authenticity confidence and activity scores.
pub const SCORE_DECIMALS: u32 = 4;

/// Minimum semantic score required to accept a submission.
pub const DEFAULT_MIN_SDG_SCORE: f32 = 0.3;

/// Confidence gate (percent) of the standard fixed-class profile.
pub const STANDARD_CLASS_CONFIDENCE_PERCENT: u8 = 40;

/// Confidence gate (percent) of the legacy fixed-class profile.
pub const LEGACY_CLASS_CONFIDENCE_PERCENT: u8 = 60;

/// Upload cap of the standard profile (5 MiB).
pub const STANDARD_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Upload cap of the large profile (100 MB).
pub const LARGE_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// File extensions accepted at the boundary (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Label text normalised to [`AuthenticityLabel::Fake`](crate::scoring::AuthenticityLabel::Fake).
pub const FAKE_LABEL_MARKER: &str = "fake";

/// Fallback used when a model emits a class index missing from `id2label`.
pub const UNKNOWN_MODEL_LABEL: &str = "Unknown";

/// Default candidate list for the semantic stage.
pub const DEFAULT_SDG_LABELS: &[&str] = &[
    "cleaning environment",
    "planting trees",
    "people cleaning street",
    "waste segregation",
    "tree planting activity",
    "community cleanup",
    "recycling materials",
    "protecting wildlife",
    "forest conservation",
    "coastal cleanup",
];

pub const MEDICAL_LABELS: &[&str] = &[
    "medical mission",
    "health checkup",
    "vaccination program",
    "blood donation",
    "dental mission",
    "medical consultation",
    "first aid training",
    "health awareness seminar",
];

pub const EDUCATION_LABELS: &[&str] = &[
    "teaching students",
    "reading program",
    "scholarship distribution",
    "school supplies donation",
    "tutorial session",
    "computer training",
    "skills workshop",
    "literacy program",
];

pub const INFRASTRUCTURE_LABELS: &[&str] = &[
    "road construction",
    "building repair",
    "bridge construction",
    "facility renovation",
    "infrastructure improvement",
    "construction work",
    "building maintenance",
    "community infrastructure",
];

pub const COMMUNITY_LABELS: &[&str] = &[
    "feeding program",
    "livelihood training",
    "community gathering",
    "sports activity",
    "cultural event",
    "community assembly",
    "youth program",
    "senior citizen activity",
];

pub const DISASTER_LABELS: &[&str] = &[
    "disaster relief",
    "evacuation assistance",
    "relief goods distribution",
    "rescue operation",
    "emergency response",
    "disaster preparedness",
    "relief packing",
    "emergency aid",
];

/// Named label presets, in lookup order.
pub const LABEL_PRESETS: &[(&str, &[&str])] = &[
    ("default", DEFAULT_SDG_LABELS),
    ("medical", MEDICAL_LABELS),
    ("education", EDUCATION_LABELS),
    ("infrastructure", INFRASTRUCTURE_LABELS),
    ("community", COMMUNITY_LABELS),
    ("disaster", DISASTER_LABELS),
];

/// Returns the labels of a named preset (case-insensitive).
pub fn preset_labels(name: &str) -> Option<&'static [&'static str]> {
    let name = name.trim();
    LABEL_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, labels)| *labels)
}
