use async_trait::async_trait;
use filter_session::ImageSource;
use log::debug;

/// Treats a selection as a path on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

#[async_trait]
impl ImageSource for FileImageSource {
    async fn fetch(&self, selection: &str) -> Option<Vec<u8>> {
        let path = selection.trim();
        if path.is_empty() {
            return None;
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                debug!("read {path}: {} bytes", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                debug!("read {path} failed: {e}");
                None
            }
        }
    }
}
