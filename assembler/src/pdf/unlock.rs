use lopdf::Document;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum UnlockError {
    #[error("No password provided")]
    MissingPassword,
    #[error("Input must be a valid PDF file. reason=`{0}`")]
    MalformedInput(String),
    #[error("Incorrect password")]
    WrongPassword,
    #[error("Cannot write unlocked PDF. reason=`{0}`")]
    SerializationFailed(String),
}

/// Remove the password protection from a PDF.
///
/// Documents that don't require a password are re-serialized as they are,
/// so unlocking an already open PDF succeeds.
#[instrument(skip(bytes, password), fields(size = bytes.len()))]
pub fn unlock(bytes: &[u8], password: &str) -> Result<Vec<u8>, UnlockError> {
    if password.is_empty() {
        return Err(UnlockError::MissingPassword);
    }

    let doc = Document::load_mem(bytes).map_err(|e| UnlockError::MalformedInput(e.to_string()))?;

    let mut doc = if doc.is_encrypted() {
        authenticate(bytes, password)?
    } else {
        tracing::info!("PDF is not password protected, passing it through");
        doc
    };

    // Drop what is left of the security handler so the copy is written in clear
    doc.encryption_state = None;
    doc.trailer.remove(b"Encrypt");

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| UnlockError::SerializationFailed(e.to_string()))?;

    Ok(buffer)
}

/// Load the document again, decrypting it with `password`.
/// Every authentication failure is reported the same way.
fn authenticate(bytes: &[u8], password: &str) -> Result<Document, UnlockError> {
    match Document::load_mem_with_password(bytes, password) {
        Ok(doc) if !doc.is_encrypted() => {
            tracing::info!("PDF decrypted");
            Ok(doc)
        }
        Ok(_) | Err(lopdf::Error::InvalidPassword) => {
            tracing::info!("Could not authenticate against locked PDF");
            Err(UnlockError::WrongPassword)
        }
        Err(e) => Err(UnlockError::MalformedInput(e.to_string())),
    }
}
