// The crate-wide error type. Every variant states *where* things went wrong.
// Transient "not ready yet" states are NOT errors; see `NotReady` below.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Pushing a frame to the window failed

    #[error("Camera permission denied")]
    CameraPermissionDenied,
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening the device failed
    #[error("Camera stream error: {0}")]
    CameraStream(String), // The device opened but the stream did not start

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("Failed to read image '{}': {source}", path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Density ramp must contain at least one character")]
    EmptyRamp,
    #[error("Unknown density ramp '{0}' (expected 'default' or 'complex')")]
    UnknownRamp(String),
    #[error("Unrecognized color '{0}'")]
    InvalidColor(String),

    #[error("Failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write snapshot '{}': {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl Error {
    /// True for the camera acquisition failures that the UI recovers into a message.
    pub fn is_source_acquisition(&self) -> bool {
        matches!(
            self,
            Error::CameraPermissionDenied | Error::CameraInit(_) | Error::CameraStream(_)
        )
    }
}

/// Why a render cycle was skipped. Expected during startup, resizes and source switches;
/// the loop simply retries on the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    /// No source is bound (camera failed or was released).
    NoSource,
    /// The camera is bound but has not delivered a frame yet.
    SourceBuffering,
    /// The reference glyph measured zero in one dimension.
    GlyphUnmeasured,
    /// The viewport fits zero columns or zero rows.
    EmptyGrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_errors_are_classified() {
        assert!(Error::CameraPermissionDenied.is_source_acquisition());
        assert!(Error::CameraInit("no device".into()).is_source_acquisition());
        assert!(Error::CameraStream("busy".into()).is_source_acquisition());
        assert!(!Error::EmptyRamp.is_source_acquisition());
        assert!(!Error::InvalidColor("nope".into()).is_source_acquisition());
    }

    #[test]
    fn display_names_the_failing_path() {
        let err = Error::ConfigRead {
            path: PathBuf::from("/tmp/missing.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/missing.toml"));
    }
}
