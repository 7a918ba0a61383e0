//! Desktop integration files shipped with the package.

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const APP_ID: &str = "audio-streamer";
pub const DESKTOP_FILENAME: &str = "audio-streamer.desktop";

const DESKTOP_ENTRY: &str = "\
[Desktop Entry]
Type=Application
Name=Audio Streamer
Comment=Stream system audio to phone via UDP
Exec=audio-streamer stream
Icon=audio-streamer
Terminal=true
Categories=AudioVideo;Audio;Network;
";

/// The `.desktop` file contents.
pub fn desktop_entry() -> &'static str {
    DESKTOP_ENTRY
}

/// Where each packaged file lands under an install prefix (e.g. `/usr`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub binary: PathBuf,
    pub desktop_file: PathBuf,
    pub icon: PathBuf,
    pub doc_dir: PathBuf,
}

pub fn install_layout(prefix: &Path) -> InstallLayout {
    InstallLayout {
        binary: prefix.join("bin").join(APP_ID),
        desktop_file: prefix.join("share/applications").join(DESKTOP_FILENAME),
        icon: prefix
            .join("share/icons/hicolor/scalable/apps")
            .join(format!("{APP_ID}.svg")),
        doc_dir: prefix.join("share/doc").join(APP_ID),
    }
}

/// Write the desktop entry into `dir` with mode 0644.
pub fn write_desktop_entry(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating '{}'", dir.display()))?;

    let path = dir.join(DESKTOP_FILENAME);
    fs::write(&path, DESKTOP_ENTRY)
        .with_context(|| format!("writing desktop entry '{}'", path.display()))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644))
        .with_context(|| format!("setting permissions on '{}'", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_desktop_entry_keys() {
        let entry = desktop_entry();
        assert!(entry.starts_with("[Desktop Entry]\n"));
        for key in ["Type=Application", "Name=Audio Streamer", "Exec=audio-streamer", "Icon=audio-streamer"] {
            assert!(entry.lines().any(|l| l.starts_with(key)), "missing {key}");
        }
    }

    #[test]
    fn test_install_layout() {
        let layout = install_layout(Path::new("/usr"));
        assert_eq!(layout.binary, PathBuf::from("/usr/bin/audio-streamer"));
        assert_eq!(
            layout.desktop_file,
            PathBuf::from("/usr/share/applications/audio-streamer.desktop")
        );
        assert_eq!(layout.doc_dir, PathBuf::from("/usr/share/doc/audio-streamer"));
    }

    #[test]
    fn test_write_desktop_entry() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("share/applications");

        let path = write_desktop_entry(&dir).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), desktop_entry());
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
