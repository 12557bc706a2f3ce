//! Storage key layout shared by uploads, thumbnail generation and cleanup.

/// Directory holding every file owned by `owner`.
pub fn owner_dir(owner: &str) -> String {
    format!("user_{}", owner)
}

/// Key of an uploaded source photo.
pub fn photo_key(owner: &str, file_name: &str) -> String {
    format!("{}/{}", owner_dir(owner), file_name)
}

/// Key of the thumbnail derived from `photo_name` for `spec_name`. Always PNG.
pub fn artifact_key(owner: &str, photo_name: &str, spec_name: &str) -> String {
    format!("{}/{}_{}.png", owner_dir(owner), photo_name, spec_name)
}
