//! Declarative class-name → verdict mapping for the fixed-class pipeline.
//!
//! A [`VerdictTable`] is an ordered list of [`VerdictRule`]s. Rules are tried
//! in order and the first whose pattern occurs in the predicted class name
//! wins; the fallback verdict applies when nothing matches.

#[cfg(test)]
mod tests;

/// Verdict shown when the classifier is below its confidence gate.
pub const UNCERTAIN_VERDICT: &str = "UNCERTAIN - IMAGE UNCLEAR";

/// Verdict shown when the optional source check flags the image.
pub const AI_GENERATED_VERDICT: &str = "REJECT - AI GENERATED";

/// How a rule's patterns are compared with the predicted class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Plain substring search.
    #[default]
    CaseSensitive,
    /// Both sides lowercased before the substring search.
    Lowercase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictCategory {
    /// Explicit anti-cheat class (screenshots, unrelated photos).
    Invalid,
    ValidMission,
    ValidRecyclable,
    ReviewRequired,
    Rejected,
    Uncertain,
}

impl VerdictCategory {
    /// Only mission and recyclable verdicts count as verified.
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            VerdictCategory::ValidMission | VerdictCategory::ValidRecyclable
        )
    }
}

/// What a matched rule (or the fallback) resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub category: VerdictCategory,
    pub verdict: String,
    pub message: String,
    pub sdg: Option<String>,
}

impl Verdict {
    pub fn new(
        category: VerdictCategory,
        verdict: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            verdict: verdict.into(),
            message: message.into(),
            sdg: None,
        }
    }

    pub fn with_sdg(mut self, sdg: impl Into<String>) -> Self {
        self.sdg = Some(sdg.into());
        self
    }

    pub fn is_verified(&self) -> bool {
        self.category.is_verified()
    }

    pub fn uncertain() -> Self {
        Self::new(
            VerdictCategory::Uncertain,
            UNCERTAIN_VERDICT,
            "The image is unclear. Please retake the photo in better conditions.",
        )
    }

    pub fn ai_generated() -> Self {
        Self::new(
            VerdictCategory::Invalid,
            AI_GENERATED_VERDICT,
            "The image appears to be AI generated and cannot be accepted.",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictRule {
    pub patterns: Vec<String>,
    pub match_mode: MatchMode,
    pub outcome: Verdict,
}

impl VerdictRule {
    pub fn new<I, S>(patterns: I, match_mode: MatchMode, outcome: Verdict) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            match_mode,
            outcome,
        }
    }

    pub fn matches(&self, class_name: &str) -> bool {
        match self.match_mode {
            MatchMode::CaseSensitive => self
                .patterns
                .iter()
                .any(|p| !p.is_empty() && class_name.contains(p.as_str())),
            MatchMode::Lowercase => {
                let class_name = class_name.to_lowercase();
                self.patterns
                    .iter()
                    .any(|p| !p.is_empty() && class_name.contains(&p.to_lowercase()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictTable {
    rules: Vec<VerdictRule>,
    fallback: Verdict,
}

impl VerdictTable {
    pub fn new(fallback: Verdict) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a rule with the lowest priority so far.
    pub fn rule(mut self, rule: VerdictRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[VerdictRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &Verdict {
        &self.fallback
    }

    /// Class names of the ImageFolder-trained model (`Non_SDG_Invalid`,
    /// `SDG12_Recycling`, `SDG15_Planting`, ...). The anti-cheat class is
    /// checked first.
    pub fn standard() -> Self {
        Self::new(Verdict::new(
            VerdictCategory::Rejected,
            "REJECT",
            "No recognised SDG activity in this image.",
        ))
        .rule(VerdictRule::new(
            ["Non_SDG", "Invalid"],
            MatchMode::CaseSensitive,
            Verdict::new(
                VerdictCategory::Invalid,
                "INVALID - NOT AN SDG ACTIVITY",
                "This image does not show an SDG activity. Please submit a real photo of your mission.",
            ),
        ))
        .rule(VerdictRule::new(
            ["Planting"],
            MatchMode::CaseSensitive,
            Verdict::new(
                VerdictCategory::ValidMission,
                "VALID MISSION (SDG 13/15)",
                "Tree planting activity verified.",
            )
            .with_sdg("SDG 13/15"),
        ))
        .rule(VerdictRule::new(
            ["Recycling"],
            MatchMode::CaseSensitive,
            Verdict::new(
                VerdictCategory::ValidRecyclable,
                "VALID RECYCLABLE (SDG 12)",
                "Recyclable material verified.",
            )
            .with_sdg("SDG 12"),
        ))
    }

    /// Class names of the garbage-classification model, matched lowercased.
    pub fn legacy() -> Self {
        Self::new(Verdict::new(
            VerdictCategory::Rejected,
            "REJECT",
            "This item does not qualify for a mission.",
        ))
        .rule(VerdictRule::new(
            ["planting"],
            MatchMode::Lowercase,
            Verdict::new(
                VerdictCategory::ValidMission,
                "VALID MISSION (SDG 13/15)",
                "Tree planting activity verified.",
            )
            .with_sdg("SDG 13/15"),
        ))
        .rule(VerdictRule::new(
            ["glass", "plastic", "metal", "paper", "cardboard"],
            MatchMode::Lowercase,
            Verdict::new(
                VerdictCategory::ValidRecyclable,
                "VALID RECYCLABLE (SDG 12)",
                "Recyclable material verified.",
            )
            .with_sdg("SDG 12"),
        ))
        .rule(VerdictRule::new(
            ["trash"],
            MatchMode::Lowercase,
            Verdict::new(
                VerdictCategory::ReviewRequired,
                "GENERAL TRASH - REQUIRES REVIEW",
                "General trash detected. A reviewer will check this submission.",
            ),
        ))
    }

    /// First matching rule's verdict, else the fallback.
    pub fn evaluate(&self, class_name: &str) -> &Verdict {
        self.rules
            .iter()
            .find(|rule| rule.matches(class_name))
            .map(|rule| &rule.outcome)
            .unwrap_or(&self.fallback)
    }
}
