use crate::builder::FaceModel;
use crate::detection::{RedactError, RedactResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub trait ModelRepository {
    fn get_model(&self, model: FaceModel, url: &str) -> RedactResult<PathBuf>;
}

fn download_file(url: &str, destination: &Path) -> RedactResult<()> {
    fn get_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers
    }

    let client = reqwest::blocking::Client::new();
    match client.get(url).headers(get_headers()).send() {
        Ok(mut response) => {
            if response.status().is_success() {
                // Written next to the destination and renamed once complete, so an
                // interrupted download is never picked up as a cached model.
                let partial = destination.with_extension("part");
                let mut writer = BufWriter::new(File::create(&partial)?);
                response.copy_to(&mut writer).map_err(|err| {
                    RedactError::Other(format!("Failed to download file: {}", err))
                })?;
                writer.flush()?;
                std::fs::rename(&partial, destination)?;
                Ok(())
            } else {
                Err(RedactError::Other(format!(
                    "Failed to download file: HTTP {}",
                    response.status()
                )))
            }
        }
        Err(err) => Err(RedactError::Other(format!(
            "Failed to download file: {}",
            err
        ))),
    }
}

fn get_cache_dir() -> RedactResult<PathBuf> {
    let home_dir = home::home_dir()
        .ok_or_else(|| RedactError::Other("Failed to get home directory.".to_string()))?;

    let cache_dir = home_dir.join(".face_redact/");
    std::fs::create_dir_all(&cache_dir)?;
    Ok(cache_dir)
}

/// Model files cached on disk, fetched over HTTP when missing.
pub struct HttpRepository {
    cache_dir: PathBuf,
}

impl HttpRepository {
    /// Repository caching into `~/.face_redact/`.
    pub fn new() -> RedactResult<HttpRepository> {
        Ok(HttpRepository {
            cache_dir: get_cache_dir()?,
        })
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> HttpRepository {
        HttpRepository {
            cache_dir: cache_dir.into(),
        }
    }
}

impl ModelRepository for HttpRepository {
    fn get_model(&self, model: FaceModel, url: &str) -> RedactResult<PathBuf> {
        let dest_filepath = self.cache_dir.join(model.file_name());
        if !dest_filepath.exists() {
            info!(url, destination = %dest_filepath.display(), "Downloading model");
            std::fs::create_dir_all(&self.cache_dir)?;
            download_file(url, &dest_filepath)?;
        }

        Ok(dest_filepath)
    }
}
