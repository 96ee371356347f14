//! Locating the ffmpeg executable

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{AudioFfmpegError, Result};

pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// A resolved ffmpeg executable.
///
/// Resolve once at start-up and hand it to [`crate::AudioTransformer`]; the
/// transform path does not search `PATH` again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTool {
    path: PathBuf,
}

impl FfmpegTool {
    /// Search `PATH` for `ffmpeg`.
    pub fn locate() -> Result<Self> {
        Self::locate_program(DEFAULT_PROGRAM)
    }

    pub fn locate_program(program: &str) -> Result<Self> {
        let path = env::var_os("PATH")
            .and_then(|search_path| find_in_path(program, &search_path))
            .ok_or_else(|| AudioFfmpegError::tool_not_found(program))?;
        debug!("Found {} at {}", program, path.display());
        Ok(Self { path })
    }

    /// Use an explicit executable path.
    pub fn at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_executable(path) {
            return Err(AudioFfmpegError::tool_not_found(path.display().to_string()));
        }
        Ok(Self { path: path.to_path_buf() })
    }

    /// Explicit path when configured, otherwise a `PATH` search.
    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::at(path),
            None => Self::locate(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn find_in_path(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    env::split_paths(search_path)
        .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    let suffixes: &[&str] = if cfg!(windows) { &[".exe", ""] } else { &[""] };
    suffixes.iter().map(move |suffix| format!("{}{}", program, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, executable: bool) {
        std::fs::write(path, b"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = executable;
    }

    #[test]
    fn test_missing_program() {
        let err = FfmpegTool::locate_program("definitely-not-a-real-tool-4f1c").unwrap_err();
        assert!(matches!(err, AudioFfmpegError::ToolNotFound { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-tool-4f1c"));
    }

    #[test]
    fn test_explicit_path() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("ffmpeg");
        write_file(&fake, true);

        let tool = FfmpegTool::at(&fake).unwrap();
        assert_eq!(tool.path(), fake.as_path());

        assert!(FfmpegTool::at(dir.path().join("missing")).is_err());
        assert!(FfmpegTool::at(dir.path()).is_err());
    }

    #[test]
    fn test_from_config_prefers_explicit_path() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("my-ffmpeg");
        write_file(&fake, true);

        let tool = FfmpegTool::from_config(Some(&fake)).unwrap();
        assert_eq!(tool.path(), fake.as_path());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_skipped() {
        let shadow = TempDir::new().unwrap();
        let real = TempDir::new().unwrap();
        write_file(&shadow.path().join("ffmpeg"), false);
        write_file(&real.path().join("ffmpeg"), true);

        let search_path = env::join_paths([shadow.path(), real.path()]).unwrap();
        let found = find_in_path("ffmpeg", &search_path).unwrap();
        assert_eq!(found, real.path().join("ffmpeg"));

        let only_shadow = env::join_paths([shadow.path()]).unwrap();
        assert!(find_in_path("ffmpeg", &only_shadow).is_none());
        assert!(FfmpegTool::at(shadow.path().join("ffmpeg")).is_err());
    }
}
