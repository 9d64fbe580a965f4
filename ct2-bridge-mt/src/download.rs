//! Fetching converted models from the Hugging Face hub

use crate::error::{MtError, MtResult};
use crate::registry::ModelEntry;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Downloads model files into a models root directory
#[derive(Debug, Clone)]
pub struct ModelDownloader {
    client: Client,
    endpoint: String,
    models_root: PathBuf,
}

impl ModelDownloader {
    pub fn new(models_root: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            models_root: models_root.into(),
        }
    }

    /// Use a mirror instead of huggingface.co
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn file_url(&self, repo: &str, file: &str) -> String {
        format!("{}/{}/resolve/main/{}", self.endpoint, repo, file)
    }

    pub fn model_dir(&self, entry: &ModelEntry) -> PathBuf {
        self.models_root.join(&entry.directory)
    }

    /// Files of `entry` not yet present on disk
    pub fn missing_files(&self, entry: &ModelEntry) -> Vec<String> {
        let dir = self.model_dir(entry);
        entry
            .files
            .iter()
            .filter(|f| !dir.join(f).is_file())
            .cloned()
            .collect()
    }

    /// Make sure every file of `entry` is on disk and return its directory
    pub async fn ensure(&self, entry: &ModelEntry) -> MtResult<PathBuf> {
        let dir = self.model_dir(entry);
        let missing = self.missing_files(entry);
        if missing.is_empty() {
            debug!("Model {} already present in {}", entry.id, dir.display());
            return Ok(dir);
        }

        let repo = entry.repo.as_deref().ok_or_else(|| {
            MtError::Download(format!(
                "model {} is not downloadable; place {} in {}",
                entry.id,
                missing.join(", "),
                dir.display()
            ))
        })?;

        info!(
            "Downloading {} missing files of {} from {}",
            missing.len(),
            entry.id,
            repo
        );
        for file in &missing {
            let url = self.file_url(repo, file);
            let bytes = self.download_file(&url, &dir.join(file)).await?;
            debug!("Fetched {} ({} bytes)", file, bytes);
        }
        info!("Model {} ready in {}", entry.id, dir.display());
        Ok(dir)
    }

    async fn download_file(&self, url: &str, path: &Path) -> MtResult<u64> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let part = part_path(path);

        let res = self.client.get(url).send().await?.error_for_status()?;
        let written = match write_part(res, &part).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove) = fs::remove_file(&part).await {
                    warn!("Failed to remove {}: {}", part.display(), remove);
                }
                return Err(e);
            }
        };

        fs::rename(&part, path).await?;
        Ok(written)
    }
}

async fn write_part(res: Response, part: &Path) -> MtResult<u64> {
    let mut file = File::create(part).await?;
    let mut stream = res.bytes_stream();
    let mut written = 0u64;

    while let Some(item) = stream.next().await {
        let chunk = item?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// `model.bin` -> `model.bin.part`
fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::{M2M100, M2M100Size, Nllb, NllbSize};
    use ct2_bridge::{Device, ModelFormat};
    use std::fs as std_fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn m2m100_entry() -> ModelEntry {
        ModelEntry::for_family(
            &M2M100::new(M2M100Size::Small418M),
            Device::Cpu,
            ModelFormat::Compact,
        )
    }

    /// Serve `body` for every request, announcing `declared_len` bytes
    ///
    /// Returns the endpoint and the request paths seen so far.
    async fn serve_fixed(
        body: &'static [u8],
        declared_len: usize,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    if let Some(path) = request.split_whitespace().nth(1) {
                        seen.lock().unwrap().push(path.to_string());
                    }
                    let header = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        declared_len
                    );
                    let _ = socket.write_all(header.as_bytes()).await;
                    let _ = socket.write_all(body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (endpoint, requests)
    }

    fn part_files(dir: &Path) -> Vec<PathBuf> {
        std_fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "part"))
            .collect()
    }

    #[test]
    fn test_file_url() {
        let downloader = ModelDownloader::new("/models").with_endpoint("https://mirror.example/");
        assert_eq!(
            downloader.file_url("JustFrederik/m2m_100_418m_ct2_int8", "model.bin"),
            "https://mirror.example/JustFrederik/m2m_100_418m_ct2_int8/resolve/main/model.bin"
        );
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/m/ja-en/model.bin")),
            PathBuf::from("/m/ja-en/model.bin.part")
        );
    }

    #[test]
    fn test_missing_files() {
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path());
        let entry = m2m100_entry();
        assert_eq!(downloader.missing_files(&entry).len(), entry.files.len());

        let dir = downloader.model_dir(&entry);
        std_fs::create_dir_all(&dir).unwrap();
        std_fs::write(dir.join("model.bin"), b"weights").unwrap();
        let missing = downloader.missing_files(&entry);
        assert_eq!(missing.len(), entry.files.len() - 1);
        assert!(!missing.contains(&"model.bin".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_skips_present_model() {
        let root = TempDir::new().unwrap();
        // Unroutable endpoint: any request would fail
        let downloader = ModelDownloader::new(root.path()).with_endpoint("http://127.0.0.1:9");
        let entry = m2m100_entry();
        let dir = downloader.model_dir(&entry);
        std_fs::create_dir_all(&dir).unwrap();
        for file in &entry.files {
            std_fs::write(dir.join(file), b"x").unwrap();
        }

        assert_eq!(downloader.ensure(&entry).await.unwrap(), dir);
    }

    #[tokio::test]
    async fn test_ensure_local_only_model_fails() {
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path());
        let entry = ModelEntry::for_family(
            &Nllb::new(NllbSize::DistilledSmall600M),
            Device::Cpu,
            ModelFormat::Compact,
        );

        match downloader.ensure(&entry).await {
            Err(MtError::Download(msg)) => assert!(msg.contains("not downloadable")),
            other => panic!("Expected Download error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path()).with_endpoint("http://127.0.0.1:9");
        let result = downloader.ensure(&m2m100_entry()).await;
        assert!(matches!(result, Err(MtError::Network(_))));
    }

    #[tokio::test]
    async fn test_ensure_fetches_only_missing_files() {
        let (endpoint, requests) = serve_fixed(b"fetched", 7).await;
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path()).with_endpoint(endpoint);
        let entry = m2m100_entry();
        let dir = downloader.model_dir(&entry);
        std_fs::create_dir_all(&dir).unwrap();
        std_fs::write(dir.join("model.bin"), b"weights").unwrap();

        assert_eq!(downloader.ensure(&entry).await.unwrap(), dir);

        let prefix = "/JustFrederik/m2m_100_418m_ct2_int8/resolve/main/";
        let requests = requests.lock().unwrap().clone();
        assert_eq!(requests.len(), entry.files.len() - 1);
        assert!(requests.iter().all(|r| r.starts_with(prefix)));
        assert!(!requests.iter().any(|r| r.ends_with("/model.bin")));

        assert_eq!(std_fs::read(dir.join("model.bin")).unwrap(), b"weights");
        for file in entry.files.iter().filter(|f| f.as_str() != "model.bin") {
            assert_eq!(std_fs::read(dir.join(file)).unwrap(), b"fetched");
        }
        assert!(part_files(&dir).is_empty());
        assert!(downloader.missing_files(&entry).is_empty());
    }

    #[tokio::test]
    async fn test_truncated_download_leaves_no_part_file() {
        // Announce more bytes than are sent, then close the connection
        let (endpoint, _) = serve_fixed(b"short", 1024).await;
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path()).with_endpoint(endpoint);
        let mut entry = m2m100_entry();
        entry.files = vec!["model.bin".to_string()];

        let result = downloader.ensure(&entry).await;
        assert!(matches!(result, Err(MtError::Network(_))));

        let dir = downloader.model_dir(&entry);
        assert!(!dir.join("model.bin").exists());
        assert!(part_files(&dir).is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_download_config_from_hub() {
        let root = TempDir::new().unwrap();
        let downloader = ModelDownloader::new(root.path());
        let mut entry = m2m100_entry();
        entry.files = vec!["config.json".to_string()];
        let dir = downloader.ensure(&entry).await.unwrap();
        assert!(dir.join("config.json").is_file());
    }
}
