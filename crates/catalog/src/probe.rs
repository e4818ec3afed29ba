use std::path::{Component, Path, PathBuf};

use tracing::warn;

/// Best-effort audio length lookup. Implementations never fail; a file that
/// cannot be read simply has no known duration.
pub trait DurationProbe: Send + Sync {
    fn extract_duration(&self, path: &Path) -> Option<u64>;
}

pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn extract_duration(&self, path: &Path) -> Option<u64> {
        match metadata::read_duration_secs(path) {
            Ok(duration) => duration,
            Err(err) => {
                warn!("Failed to read duration of {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Maps a stored song url onto a file below `media_root`.
///
/// Accepts `public/music/a.mp3`, `/public/music/a.mp3` and `music/a.mp3`.
/// Remote urls and anything climbing out of the root resolve to `None`.
pub fn resolve_media_path(media_root: &Path, url: &str) -> Option<PathBuf> {
    let url = url.trim();
    if url.is_empty() || url.contains("://") {
        return None;
    }
    let relpath = url.trim_start_matches('/');
    let relpath = relpath.strip_prefix("public/").unwrap_or(relpath);

    let mut out = PathBuf::from(media_root);
    for part in relpath.split('/') {
        if part.is_empty() {
            continue;
        }
        let part_path = Path::new(part);
        if !matches!(part_path.components().next(), Some(Component::Normal(_)))
            || part_path.components().count() != 1
        {
            return None;
        }
        out.push(part);
    }
    if out == media_root {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{resolve_media_path, DurationProbe, LoftyProbe};

    #[test]
    fn resolves_relative_and_prefixed_urls() {
        let root = Path::new("/srv/public");
        let expected = Some(PathBuf::from("/srv/public/music/a.mp3"));
        assert_eq!(resolve_media_path(root, "public/music/a.mp3"), expected);
        assert_eq!(resolve_media_path(root, "/public/music/a.mp3"), expected);
        assert_eq!(resolve_media_path(root, "music/a.mp3"), expected);
    }

    #[test]
    fn refuses_remote_and_escaping_urls() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve_media_path(root, "https://cdn.example.com/a.mp3"), None);
        assert_eq!(resolve_media_path(root, "public/../secrets.txt"), None);
        assert_eq!(resolve_media_path(root, "music/./a.mp3"), None);
        assert_eq!(resolve_media_path(root, ""), None);
        assert_eq!(resolve_media_path(root, "public/"), None);
    }

    #[test]
    fn lofty_probe_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not-audio.mp3");
        std::fs::write(&bogus, b"definitely not an mpeg stream").unwrap();
        assert_eq!(LoftyProbe.extract_duration(&bogus), None);
        assert_eq!(LoftyProbe.extract_duration(&dir.path().join("missing.mp3")), None);
    }
}
