use std::path::Path;

use lofty::error::LoftyError;
use lofty::prelude::AudioFile;

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetadataError::Io(err) => Some(err),
            MetadataError::Lofty(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

/// Reads the audio properties of `path` and returns the playing time rounded
/// to whole seconds. `Ok(None)` means the file parsed but reports no length.
pub fn read_duration_secs(path: &Path) -> Result<Option<u64>, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        )));
    }
    let tagged_file = lofty::read_from_path(path)?;
    let duration_ms = tagged_file.properties().duration().as_millis();
    Ok(round_secs(duration_ms))
}

fn round_secs(duration_ms: u128) -> Option<u64> {
    let secs = (duration_ms + 500) / 1000;
    if secs == 0 {
        None
    } else {
        Some(secs.min(u128::from(u64::MAX)) as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{read_duration_secs, round_secs, MetadataError};

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(round_secs(0), None);
        assert_eq!(round_secs(499), None);
        assert_eq!(round_secs(500), Some(1));
        assert_eq!(round_secs(183_499), Some(183));
        assert_eq!(round_secs(183_500), Some(184));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_duration_secs(Path::new("/definitely/not/here.mp3")).unwrap_err();
        assert!(matches!(err, MetadataError::Io(_)));
    }
}
