use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::RosterError;

pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/latest";
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(2);

const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_SECS: &str = "60";

/// Ec2Metadata reads the identity of the local instance from the EC2 instance metadata service.
///
/// An IMDSv2 session token is requested before every lookup. If the service does not hand one
/// out, the lookup falls back to a plain IMDSv1 request.
pub struct Ec2Metadata {
    base_url: String,
    http: Client,
}

impl Ec2Metadata {
    /// new creates a client for the metadata service at `base_url`, e.g.
    /// "http://169.254.169.254/latest". Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Ec2Metadata, RosterError> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Ec2Metadata {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn instance_id(&self) -> Result<String, RosterError> {
        self.get("instance-id")
    }

    /// local_ipv4 returns the private address of the instance.
    pub fn local_ipv4(&self) -> Result<String, RosterError> {
        self.get("local-ipv4")
    }

    /// get returns the trimmed value of a metadata path, e.g. "placement/availability-zone".
    pub fn get(&self, path: &str) -> Result<String, RosterError> {
        let url = format!("{}/meta-data/{}", self.base_url, path);

        let mut req = self.http.get(&url);
        if let Some(token) = self.token() {
            req = req.header(TOKEN_HEADER, token);
        }

        let resp = req.send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RosterError::NotFound(format!("metadata {}", path)));
        }

        let value = resp.error_for_status()?.text()?;
        let value = value.trim();
        if value.is_empty() {
            return Err(RosterError::NotFound(format!("metadata {}", path)));
        }

        Ok(value.to_string())
    }

    fn token(&self) -> Option<String> {
        let url = format!("{}/api/token", self.base_url);

        let resp = self
            .http
            .put(&url)
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECS)
            .send()
            .ok()?;

        if !resp.status().is_success() {
            return None;
        }

        let token = resp.text().ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}
