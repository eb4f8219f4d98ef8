//! Process configuration, read once at startup.

use std::path::PathBuf;

use crate::foundation::error::{FadeError, FadeResult};

/// Service-account JSON payload.
pub const ENV_CREDENTIALS: &str = "GCP_SA_CREDENTIALS";
/// Destination bucket.
pub const ENV_BUCKET: &str = "GCP_BUCKET_NAME";
/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// Font file used by both endpoints.
pub const ENV_FONT: &str = "FADETITLE_FONT";
/// Root of per-request scratch directories.
pub const ENV_WORK_DIR: &str = "FADETITLE_WORK_DIR";
/// `ffmpeg` executable.
pub const ENV_FFMPEG: &str = "FFMPEG_BIN";
/// `ffprobe` executable.
pub const ENV_FFPROBE: &str = "FFPROBE_BIN";

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Startup configuration of the service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Service-account JSON payload.
    pub credentials_json: String,
    /// Destination bucket.
    pub bucket: String,
    /// Listen port.
    pub port: u16,
    /// Font file.
    pub font_path: PathBuf,
    /// Root of per-request scratch directories.
    pub work_dir: PathBuf,
    /// `ffmpeg` executable.
    pub ffmpeg_bin: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe_bin: PathBuf,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("credentials_json", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("port", &self.port)
            .field("font_path", &self.font_path)
            .field("work_dir", &self.work_dir)
            .field("ffmpeg_bin", &self.ffmpeg_bin)
            .field("ffprobe_bin", &self.ffprobe_bin)
            .finish()
    }
}

impl ServiceConfig {
    /// Read the process environment.
    pub fn from_env() -> FadeResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FadeResult<Self> {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let required = |k: &str| {
            get(k).ok_or_else(|| FadeError::config(format!("{k} must be set")))
        };

        let credentials_json = required(ENV_CREDENTIALS)?;
        let bucket = required(ENV_BUCKET)?.trim().to_string();
        let font_path = PathBuf::from(required(ENV_FONT)?);
        let port = match get(ENV_PORT) {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| FadeError::config(format!("{ENV_PORT}='{v}' is not a port: {e}")))?,
            None => DEFAULT_PORT,
        };
        let work_dir = get(ENV_WORK_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("fadetitle"));

        Ok(Self {
            credentials_json,
            bucket,
            port,
            font_path,
            work_dir,
            ffmpeg_bin: get(ENV_FFMPEG).map_or_else(|| PathBuf::from("ffmpeg"), PathBuf::from),
            ffprobe_bin: get(ENV_FFPROBE).map_or_else(|| PathBuf::from("ffprobe"), PathBuf::from),
        })
    }
}
