use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::profile::store::ProfileStore;
use crate::profile::types::User;
use crate::storage::StorageClient;

/// A file pulled out of the upload form, not yet validated.
pub struct IncomingAvatar {
    /// Client-supplied file name; only the extension is ever used.
    pub file_name: String,
    pub body: Bytes,
}

/// Replace `user`'s avatar with the incoming file.
///
/// Steps run strictly in order: validate → name → write → commit reference
/// → clean up the replaced file. The new file is always written before the
/// user record switches over, and the old file is only removed after the
/// switch, so the record never points at a file that does not exist. A
/// failed commit leaves an unreferenced orphan in storage and the record on
/// its previous reference; a failed cleanup is logged and swallowed — the
/// upload already succeeded.
///
/// Returns the committed storage name.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn replace_avatar(
    store: &dyn ProfileStore,
    storage: &dyn StorageClient,
    user: &User,
    upload: Option<IncomingAvatar>,
    max_bytes: usize,
) -> Result<String, AppError> {
    // Receiving: nothing has been written yet, so rejection here is free.
    let Some(upload) = upload else {
        return Err(AppError::validation("No file submitted"));
    };
    if upload.body.is_empty() {
        return Err(AppError::validation("No file submitted"));
    }
    if upload.body.len() > max_bytes {
        return Err(AppError::validation(format!(
            "File is too large (max {} bytes)",
            max_bytes
        )));
    }

    // Naming: a fresh uuid so concurrent and repeated uploads never collide.
    let name = match sanitized_extension(&upload.file_name) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };

    // Writing: failure leaves the record untouched.
    storage.put_object(&name, upload.body).await?;

    // Committing the reference: the single point where readers switch from
    // the old avatar to the new one.
    store.update_avatar(user.id, &name).await?;

    info!(avatar = %name, "avatar committed");

    // Cleanup: best effort only.
    if !user.avatar.is_empty() && user.avatar != name {
        if let Err(e) = storage.delete_object(&user.avatar).await {
            warn!(error = %e, old_avatar = %user.avatar, "failed to delete replaced avatar");
        }
    }

    Ok(name)
}

/// Lowercased alphanumeric extension of the client file name, if it has a
/// plausible one. Anything else is dropped rather than sanitized.
fn sanitized_extension(file_name: &str) -> Option<String> {
    let ext = std::path::Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
