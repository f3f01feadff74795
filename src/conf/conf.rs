use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use membership::EtcdConf;
use membership::EtcdUrls;
use membership::TlsFiles;
use membership::{DEFAULT_CLIENT_PORT, DEFAULT_PEER_PORT};
use roster::{DEFAULT_METADATA_TIMEOUT, DEFAULT_METADATA_URL};

use super::errors::ConfError;
use crate::envfile::{DEFAULT_ENV_FILE, DEFAULT_ENV_PREFIX};

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./tests/conf_tests.rs"]
mod tests;

/// TlsConf locates the PEM files used to talk to a secured cluster.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TlsConf {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

/// Conf is the sync config. Every field has a default, thus an empty yaml is a valid config.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Conf {
    pub peer_port: u16,
    pub client_port: u16,

    /// "http" or "https", used for both peer and client urls.
    pub scheme: String,

    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,

    /// Base url of the instance metadata service.
    pub metadata_url: String,

    /// Bounds each request to the metadata service.
    pub metadata_timeout_ms: u64,

    /// Yaml file mapping member name to address.
    pub roster_file: Option<PathBuf>,

    /// Prefix of every key written to the env file.
    pub env_prefix: String,

    /// Where the env file goes.
    pub out: PathBuf,

    pub tls: TlsConf,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            peer_port: DEFAULT_PEER_PORT,
            client_port: DEFAULT_CLIENT_PORT,
            scheme: "http".into(),
            request_timeout_ms: 5000,
            connect_timeout_ms: 2000,
            metadata_url: DEFAULT_METADATA_URL.into(),
            metadata_timeout_ms: DEFAULT_METADATA_TIMEOUT.as_millis() as u64,
            roster_file: None,
            env_prefix: DEFAULT_ENV_PREFIX.into(),
            out: PathBuf::from(DEFAULT_ENV_FILE),
            tls: TlsConf::default(),
        }
    }
}

impl Conf {
    /// from_file read conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Conf, ConfError> {
        let content = fs::read_to_string(path)?;
        Conf::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Conf, ConfError> {
        let conf: Conf = if content.trim().is_empty() {
            Conf::default()
        } else {
            serde_yaml::from_str(content)?
        };

        conf.check()?;
        Ok(conf)
    }

    /// check validates values serde can not.
    pub fn check(&self) -> Result<(), ConfError> {
        if self.peer_port == 0 {
            return Err(ConfError::Invalid("peer_port", "must not be 0".into()));
        }
        if self.client_port == 0 {
            return Err(ConfError::Invalid("client_port", "must not be 0".into()));
        }

        if self.scheme != "http" && self.scheme != "https" {
            return Err(ConfError::Invalid(
                "scheme",
                format!("{:?} is neither http nor https", self.scheme),
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfError::Invalid(
                "request_timeout_ms",
                "must be positive".into(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfError::Invalid(
                "connect_timeout_ms",
                "must be positive".into(),
            ));
        }

        if self.metadata_timeout_ms == 0 {
            return Err(ConfError::Invalid(
                "metadata_timeout_ms",
                "must be positive".into(),
            ));
        }

        if self.tls.cert_file.is_some() != self.tls.key_file.is_some() {
            return Err(ConfError::Invalid(
                "tls",
                "cert_file and key_file must be given together".into(),
            ));
        }

        if self.out.as_os_str().is_empty() {
            return Err(ConfError::Invalid("out", "must not be empty".into()));
        }

        Ok(())
    }

    pub fn urls(&self) -> EtcdUrls {
        EtcdUrls {
            scheme: self.scheme.clone(),
            peer_port: self.peer_port,
            client_port: self.client_port,
        }
    }

    pub fn etcd_conf(&self) -> EtcdConf {
        EtcdConf {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            tls: TlsFiles {
                ca_file: self.tls.ca_file.clone(),
                cert_file: self.tls.cert_file.clone(),
                key_file: self.tls.key_file.clone(),
            },
        }
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}
