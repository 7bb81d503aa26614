use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Command-line interface: a single positional config file path.
#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP gateway serving S3 bucket contents")]
pub struct Args {
    /// Path to the JSON configuration file
    pub config: PathBuf,
}

/// Gateway configuration, loaded once from a JSON file.
///
/// Field names in the file are kebab-case (`access-key-id`, ...). The value
/// is immutable after load and cloned into whatever needs it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GatewayConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub port: u16,
}

impl GatewayConfig {
    /// Read and parse the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config file `{}`", path.display()))?;
        let cfg = serde_json::from_str(&data)
            .with_context(|| format!("parsing config file `{}`", path.display()))?;
        Ok(cfg)
    }

    /// Listen address. The gateway only ever binds the loopback interface.
    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_kebab_case_fields() {
        let file = write_config(
            r#"{
                "access-key-id": "AKIDEXAMPLE",
                "access-key-secret": "wJalrXUtnFEMI",
                "endpoint": "minio.internal:9000",
                "region": "us-east-1",
                "bucket": "assets",
                "port": 8080
            }"#,
        );

        let cfg = GatewayConfig::load(file.path()).expect("config should parse");
        assert_eq!(cfg.access_key_id, "AKIDEXAMPLE");
        assert_eq!(cfg.access_key_secret, "wJalrXUtnFEMI");
        assert_eq!(cfg.endpoint, "minio.internal:9000");
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.bucket, "assets");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn addr_pins_loopback() {
        let file = write_config(
            r#"{
                "access-key-id": "a",
                "access-key-secret": "b",
                "endpoint": "s3.amazonaws.com",
                "region": "eu-west-1",
                "bucket": "media",
                "port": 9001
            }"#,
        );
        let cfg = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:9001");
    }

    #[test]
    fn rejects_malformed_json() {
        let file = write_config("{ not json");
        assert!(GatewayConfig::load(file.path()).is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        let file = write_config(r#"{"endpoint": "x", "port": 1}"#);
        assert!(GatewayConfig::load(file.path()).is_err());
    }

    #[test]
    fn rejects_missing_file() {
        assert!(GatewayConfig::load(Path::new("/nonexistent/gateway.json")).is_err());
    }
}
