use axum::body::Bytes;

use sdgverify::pipeline::AnalyzeOptions;
use sdgverify::scoring::CandidateLabelSet;
use sdgverify::upload::UploadRejection;

use crate::gateway::error::GatewayError;

/// The `file` part of a submission, already past the upload policy.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Multipart fields of `/analyze-image` (and the `file` of `/predict`).
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub file: Option<UploadedFile>,
    /// Comma-separated candidate labels.
    pub labels: Option<String>,
    pub min_sdg_score: Option<String>,
    /// Named label set, used when `labels` is absent or blank.
    pub preset: Option<String>,
}

impl SubmissionForm {
    pub fn into_file(self) -> Result<UploadedFile, GatewayError> {
        self.file.ok_or(GatewayError::Upload(UploadRejection::MissingFile))
    }

    /// Splits the form into the upload and the pipeline options.
    pub fn into_analyze_parts(
        self,
        default_min_sdg_score: f32,
    ) -> Result<(UploadedFile, AnalyzeOptions), GatewayError> {
        let file = self
            .file
            .ok_or(GatewayError::Upload(UploadRejection::MissingFile))?;

        let min_sdg_score = match non_blank(self.min_sdg_score.as_deref()) {
            Some(value) => value
                .parse::<f32>()
                .map_err(|e| GatewayError::InvalidField {
                    field: "min_sdg_score",
                    reason: e.to_string(),
                })?,
            None => default_min_sdg_score,
        };

        let labels = match non_blank(self.labels.as_deref())
            .and_then(CandidateLabelSet::from_comma_separated)
        {
            Some(labels) => Some(labels),
            None => match non_blank(self.preset.as_deref()) {
                Some(name) => Some(
                    CandidateLabelSet::preset(name)
                        .ok_or_else(|| GatewayError::UnknownPreset(name.to_string()))?,
                ),
                None => None,
            },
        };

        Ok((
            file,
            AnalyzeOptions {
                labels,
                min_sdg_score,
            },
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
