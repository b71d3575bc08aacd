use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tracing::debug;

use sdgverify::upload::UploadPolicy;

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{SubmissionForm, UploadedFile};

/// Reads the multipart body. The filename and content type of `file` are
/// checked before its bytes are read.
pub async fn read_submission(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<SubmissionForm, GatewayError> {
    let mut form = SubmissionForm::default();
    let to_gateway = |e: MultipartError| multipart_error(e, policy);

    while let Some(field) = multipart.next_field().await.map_err(to_gateway)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                policy.check_filename(filename.as_deref())?;
                policy.check_content_type(content_type.as_deref())?;

                let bytes = field.bytes().await.map_err(to_gateway)?;
                policy.check_size(bytes.len())?;

                form.file = Some(UploadedFile {
                    filename: filename.unwrap_or_default(),
                    content_type: content_type.unwrap_or_default(),
                    bytes,
                });
            }
            "labels" => form.labels = Some(field.text().await.map_err(to_gateway)?),
            "min_sdg_score" => form.min_sdg_score = Some(field.text().await.map_err(to_gateway)?),
            "preset" => form.preset = Some(field.text().await.map_err(to_gateway)?),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError, policy: &UploadPolicy) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::BodyTooLarge {
            limit: policy.max_bytes,
        }
    } else {
        GatewayError::InvalidRequest(err.body_text())
    }
}
