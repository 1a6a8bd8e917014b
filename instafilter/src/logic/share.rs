use filter_session::{SessionError, SessionResult, ShareHandle, SharePreview, ShareSink};
use image::{ImageFormat, RgbaImage};
use log::{info, warn};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone)]
enum Target {
    // A new timestamped file per export
    Directory(PathBuf),
    // Always the same file
    File(PathBuf),
}

/// Exports rendered pictures as PNG files.
#[derive(Debug, Clone)]
pub struct FileShareSink {
    target: Target,
    open_after_share: bool,
}

impl FileShareSink {
    pub fn directory(dir: PathBuf, open_after_share: bool) -> Self {
        Self {
            target: Target::Directory(dir),
            open_after_share,
        }
    }

    pub fn file(path: PathBuf) -> Self {
        Self {
            target: Target::File(path),
            open_after_share: false,
        }
    }

    fn next_path(&self) -> PathBuf {
        match &self.target {
            Target::Directory(dir) => {
                let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
                dir.join(format!("instafilter-{ts}.png"))
            }
            Target::File(path) => path.clone(),
        }
    }
}

impl ShareSink for FileShareSink {
    fn export(&mut self, image: &RgbaImage, preview: &SharePreview) -> SessionResult<ShareHandle> {
        let path = self.next_path();

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| {
                    SessionError::Share(format!("create {} failed: {e}", dir.display()))
                })?;
            }
        }

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| SessionError::Share(format!("save {} failed: {e}", path.display())))?;

        info!("{} saved to {}", preview.title, path.display());

        if self.open_after_share {
            if let Err(e) = open::that(&path) {
                warn!("open {} failed: {e}", path.display());
            }
        }

        Ok(ShareHandle {
            location: path.display().to_string(),
        })
    }
}
