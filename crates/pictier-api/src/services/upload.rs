//! Photo upload: multipart parsing, field validation and storing the source.

use std::borrow::Cow;
use std::path::Path;

use axum::extract::Multipart;
use pictier_core::{AppError, NewPhoto, Photo, ThumbnailSpec, User};
use pictier_processing::UploadValidationError;
use pictier_storage::keys;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::HttpAppError;
use crate::state::AppState;

const REQUIRED: &str = "This field is required.";
const MAX_FILENAME_LENGTH: usize = 100;
const MAX_KEY_ATTEMPTS: usize = 8;

/// Raw fields of an upload form, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub name: Option<String>,
    pub image: Option<UploadedFile>,
    pub expiring_links: bool,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Read `name`, `image` and `expiring_links` from the form. Unknown fields are ignored.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, HttpAppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "name" => {
                let value = field.text().await?;
                let value = value.trim();
                form.name = (!value.is_empty()).then(|| value.to_string());
            }
            "image" => {
                let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                let data = field.bytes().await?;
                form.image = Some(UploadedFile {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "expiring_links" => {
                let value = field.text().await?;
                form.expiring_links = parse_flag(&value);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Form-style boolean: `true`, `on`, `1`, `yes` (any case) are true, everything else false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Reduce a client supplied file name to a safe single path segment.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let filename_only = Path::new(filename)
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

    if sanitized.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn image_error(err: &UploadValidationError) -> ValidationError {
    let code = match err {
        UploadValidationError::InvalidExtension { .. } => "extension",
        UploadValidationError::EmptyFile => "empty",
        UploadValidationError::FileTooLarge { .. } => "max_size",
        UploadValidationError::NotAnImage => "invalid_image",
    };
    field_error(code, err.to_string())
}

/// Validate the form, store the source file and record the photo.
///
/// All field problems are reported together as [`AppError::Validation`].
/// `specs` are the owner's thumbnail specs; the source never takes a file name
/// a thumbnail could be written to.
pub async fn store_upload(
    state: &AppState,
    owner: &User,
    specs: &[ThumbnailSpec],
    form: UploadForm,
) -> Result<Photo, AppError> {
    let mut errors = ValidationErrors::new();

    if form.name.is_none() {
        errors.add("name", field_error("required", REQUIRED));
    }

    let mut image = None;
    match form.image {
        None => errors.add("image", field_error("required", REQUIRED)),
        Some(file) => match check_image(state, file).await? {
            Ok(file) => image = Some(file),
            Err(e) => errors.add("image", image_error(&e)),
        },
    }

    if let Some(name) = &form.name {
        collect_name_errors(&mut errors, name, &owner.username);
    }

    let (name, image) = match (form.name, image) {
        (Some(name), Some(image)) if errors.is_empty() => (name, image),
        _ => return Err(AppError::Validation(errors)),
    };

    let file_name = sanitize_filename(&image.file_name)?;
    let storage_key = unique_key(state, &owner.username, &file_name, specs).await?;
    let new_photo = NewPhoto {
        name,
        owner: owner.username.clone(),
        storage_path: storage_key.clone(),
    };

    state.storage.put(&storage_key, image.data).await?;

    match state.photos.create(new_photo).await {
        Ok(photo) => {
            tracing::info!(
                photo_id = %photo.id,
                owner = %photo.owner,
                storage_path = %photo.storage_path,
                "Photo uploaded"
            );
            Ok(photo)
        }
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&storage_key).await {
                tracing::warn!(
                    storage_path = %storage_key,
                    error = %cleanup,
                    "Failed to remove orphaned upload"
                );
            }
            Err(e)
        }
    }
}

/// Extension, size and decode checks. The decode runs on the blocking pool.
async fn check_image(
    state: &AppState,
    file: UploadedFile,
) -> Result<Result<UploadedFile, UploadValidationError>, AppError> {
    let validator = state.upload_validator.clone();

    if let Err(e) = validator
        .validate_extension(&file.file_name)
        .and_then(|_| validator.validate_file_size(file.data.len()))
    {
        return Ok(Err(e));
    }

    tokio::task::spawn_blocking(move || validator.validate_image(&file.data).map(|_| file))
        .await
        .map_err(|e| AppError::Internal(format!("Image validation task failed: {}", e)))
}

fn collect_name_errors(errors: &mut ValidationErrors, name: &str, owner: &str) {
    let candidate = NewPhoto {
        name: name.to_string(),
        owner: owner.to_string(),
        storage_path: String::new(),
    };
    if let Err(name_errors) = candidate.validate() {
        for (_, field_errors) in name_errors.field_errors() {
            for error in field_errors.iter() {
                errors.add("name", error.clone());
            }
        }
    }
}

/// `user_{owner}/{file}`, with a short random suffix when that key is taken
/// or has the shape of a thumbnail key for one of `specs`.
async fn unique_key(
    state: &AppState,
    owner: &str,
    file_name: &str,
    specs: &[ThumbnailSpec],
) -> Result<String, AppError> {
    let mut candidate = file_name.to_string();
    for _ in 0..MAX_KEY_ATTEMPTS {
        let key = keys::photo_key(owner, &candidate);
        if !is_thumbnail_name(&candidate, specs) && !state.storage.exists(&key).await? {
            return Ok(key);
        }
        candidate = with_random_suffix(file_name);
    }

    Err(AppError::Internal(format!(
        "No free storage key for {} after {} attempts",
        file_name, MAX_KEY_ATTEMPTS
    )))
}

/// Whether `file_name` is `{anything}_{spec}.png` for one of `specs`.
fn is_thumbnail_name(file_name: &str, specs: &[ThumbnailSpec]) -> bool {
    specs
        .iter()
        .any(|spec| file_name.ends_with(&format!("_{}.png", spec.name)))
}

fn with_random_suffix(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let suffix = Uuid::new_v4().simple().to_string();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, &suffix[..7], ext),
        None => format!("{}_{}", stem, &suffix[..7]),
    }
}
