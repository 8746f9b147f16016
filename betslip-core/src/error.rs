use std::any::Any;
use std::path::PathBuf;
use thiserror::Error;

/// Document-level failures. Anything below this level (a field that does not
/// parse, a missing bet) is not an error and never surfaces here.
#[derive(Debug, Error)]
pub enum SlipError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {} (expected .pdf or .txt)", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("failed to decode PDF: {0}")]
    PdfDecode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Text carried by a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
