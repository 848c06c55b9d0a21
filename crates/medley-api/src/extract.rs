//! Multipart form parsing for upload endpoints.
//!
//! Pulls file parts and sidecar fields out of a multipart body into plain
//! structs; no validation happens here beyond shape (admission runs later).

use axum::extract::Multipart;
use medley_core::AppError;

/// Maximum number of file parts accepted in one upload batch.
pub const MAX_BATCH_FILES: usize = 10;

/// One file part as received, before admission.
#[derive(Debug, Clone)]
pub struct MultipartFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Parsed body of `POST /api/media`: 1..N files plus optional tag ids.
#[derive(Debug)]
pub struct MediaUploadForm {
    pub files: Vec<MultipartFile>,
    pub tag_ids: Vec<i64>,
}

/// Parsed body of `PATCH /api/media/{id}`: optional replacement file,
/// optional tag set. A present-but-empty `tags` field clears the set.
#[derive(Debug)]
pub struct MediaUpdateForm {
    pub file: Option<MultipartFile>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Parsed body of `POST /api/users`: signup fields plus optional profile
/// image.
#[derive(Debug)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub profile_image: Option<MultipartFile>,
}

async fn read_file_part(
    field: axum::extract::multipart::Field<'_>,
) -> Result<MultipartFile, AppError> {
    let original_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
        .to_vec();

    Ok(MultipartFile {
        original_name,
        content_type,
        data,
    })
}

async fn read_text_part(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read form field: {}", e)))
}

/// Parse tag ids from a sidecar field: a single integer or a comma-separated
/// list. Unparseable values are an input error; only *unknown* ids are
/// silently dropped, and that happens at tag resolution.
fn parse_tag_field(text: &str) -> Result<Vec<i64>, AppError> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid tag id: {}", s)))
        })
        .collect()
}

pub async fn parse_media_upload(mut multipart: Multipart) -> Result<MediaUploadForm, AppError> {
    let mut files = Vec::new();
    let mut tag_ids = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" | "file" => {
                if files.len() >= MAX_BATCH_FILES {
                    return Err(AppError::InvalidInput(format!(
                        "Too many files; at most {} per upload",
                        MAX_BATCH_FILES
                    )));
                }
                files.push(read_file_part(field).await?);
            }
            "tags" => {
                let text = read_text_part(field).await?;
                tag_ids.extend(parse_tag_field(&text)?);
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()));
    }

    Ok(MediaUploadForm { files, tag_ids })
}

pub async fn parse_media_update(mut multipart: Multipart) -> Result<MediaUpdateForm, AppError> {
    let mut file = None;
    let mut tag_ids: Option<Vec<i64>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" | "files" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Only one replacement file is allowed".to_string(),
                    ));
                }
                file = Some(read_file_part(field).await?);
            }
            "tags" => {
                let text = read_text_part(field).await?;
                tag_ids
                    .get_or_insert_with(Vec::new)
                    .extend(parse_tag_field(&text)?);
            }
            _ => {}
        }
    }

    Ok(MediaUpdateForm { file, tag_ids })
}

pub async fn parse_signup(mut multipart: Multipart) -> Result<SignupForm, AppError> {
    let mut name = None;
    let mut email = None;
    let mut password = None;
    let mut profile_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text_part(field).await?),
            "email" => email = Some(read_text_part(field).await?),
            "password" => password = Some(read_text_part(field).await?),
            "profileImage" => profile_image = Some(read_file_part(field).await?),
            _ => {}
        }
    }

    Ok(SignupForm {
        name: name.filter(|n| !n.trim().is_empty()),
        email: email
            .ok_or_else(|| AppError::InvalidInput("Missing email field".to_string()))?,
        password: password
            .ok_or_else(|| AppError::InvalidInput("Missing password field".to_string()))?,
        profile_image,
    })
}

/// Sanitize a client-supplied filename to prevent path traversal and invalid
/// characters before it is stored as the original name.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_field() {
        assert_eq!(parse_tag_field("7").unwrap(), vec![7]);
        assert_eq!(parse_tag_field("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_tag_field("").unwrap(), Vec::<i64>::new());
        assert!(parse_tag_field("1,abc").is_err());
    }

    #[test]
    fn test_sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
    }

    #[test]
    fn test_sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("image.png").unwrap(), "image.png");
        assert_eq!(sanitize_filename("my-file_1.jpg").unwrap(), "my-file_1.jpg");
    }

    #[test]
    fn test_sanitize_filename_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my photo!.png").unwrap(), "my_photo_.png");
    }

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("dir/photo.png").unwrap(), "photo.png");
    }
}
