use std::path::PathBuf;

use shelf_blob::BlobConfig;

struct ServerDefaults;

impl ServerDefaults {
    const HOST: &'static str = "0.0.0.0";
    const PORT: u16 = 5000;
    const UPLOAD_DIR: &'static str = "uploads";
    const STREAM_CHUNK_BYTES: u64 = 1024 * 1024;
    const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub stream_chunk_bytes: u64,
    /// 0 disables the limit
    pub max_upload_bytes: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: env_var_or(&lookup, "HTTP_HOST", ServerDefaults::HOST.to_string()),
            port: env_var_or(&lookup, "PORT", ServerDefaults::PORT),
            upload_dir: PathBuf::from(env_var_or(
                &lookup,
                "UPLOAD_DIR",
                ServerDefaults::UPLOAD_DIR.to_string(),
            )),
            stream_chunk_bytes: env_var_or(
                &lookup,
                "STREAM_CHUNK_BYTES",
                ServerDefaults::STREAM_CHUNK_BYTES,
            )
            .max(1),
            max_upload_bytes: env_var_or(
                &lookup,
                "MAX_UPLOAD_BYTES",
                ServerDefaults::MAX_UPLOAD_BYTES,
            ),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn blob_config(&self) -> BlobConfig {
        let config = BlobConfig::new().with_chunk_size(self.stream_chunk_bytes);
        match self.max_upload_bytes {
            0 => config.unlimited(),
            limit => config.with_max_blob_bytes(limit),
        }
    }
}

/// Typed env lookup; unset or unparsable values fall back to `default`
fn env_var_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).map(|raw| raw.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            tracing::warn!(key, "ignoring unparsable environment value");
            default
        }
        None => default,
    }
}
