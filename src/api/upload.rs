use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::AppError;

/// Hard cap on uploaded files (avatars and audio)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for upload routes, leaving room for multipart framing
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

#[derive(Debug)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Upload {
    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64_simd::STANDARD.encode_to_string(&self.bytes)
        )
    }
}

fn too_large() -> AppError {
    AppError::Validation(format!(
        "File exceeds max size of {} bytes",
        MAX_UPLOAD_BYTES
    ))
}

/// Bodies cut off by the route limit report the size cap, not a parse failure
fn multipart_error(e: MultipartError, context: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::Validation(format!("{}: {}", context, e))
    }
}

/// Read the single file field `field_name`, ignoring any other fields
pub async fn read_file_field(
    mut multipart: Multipart,
    field_name: &str,
    default_mime: &str,
) -> Result<Upload, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart payload"))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| default_mime.to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, &format!("Invalid {} field", field_name)))?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(too_large());
        }

        upload = Some(Upload {
            bytes: bytes.to_vec(),
            mime_type,
        });
    }

    match upload {
        Some(upload) if !upload.bytes.is_empty() => Ok(upload),
        _ => Err(AppError::Validation(format!("No {} file uploaded", field_name))),
    }
}
