use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{Certificate, Identity, StatusCode};
use serde::{Deserialize, Serialize};

use crate::ClusterMember;
use crate::MembershipClient;
use crate::MembershipError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// TlsFiles locates PEM encoded TLS material for talking to a secured cluster.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TlsFiles {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

/// EtcdConf is everything an `EtcdClient` needs. Nothing is read from the environment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EtcdConf {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub tls: TlsFiles,
}

impl Default for EtcdConf {
    fn default() -> Self {
        EtcdConf {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tls: TlsFiles::default(),
        }
    }
}

/// EtcdClient speaks the etcd v2 members API: `/v2/members`.
pub struct EtcdClient {
    http: Client,
}

#[derive(Deserialize)]
struct MemberList {
    #[serde(default)]
    members: Option<Vec<ClusterMember>>,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    #[serde(rename = "peerURLs")]
    peer_urls: [&'a str; 1],
}

impl EtcdClient {
    pub fn new(conf: &EtcdConf) -> Result<EtcdClient, MembershipError> {
        let mut builder = Client::builder()
            .connect_timeout(conf.connect_timeout)
            .timeout(conf.request_timeout);

        if let Some(ca) = &conf.tls.ca_file {
            let pem = fs::read(ca)?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| MembershipError::Tls(format!("{}: {}", ca.display(), e)))?;
            builder = builder.add_root_certificate(cert);
        }

        match (&conf.tls.cert_file, &conf.tls.key_file) {
            (Some(cert), Some(key)) => {
                // rustls wants key and certificate chain in one buffer
                let mut pem = fs::read(key)?;
                pem.push(b'\n');
                pem.extend(fs::read(cert)?);

                let id = Identity::from_pem(&pem)
                    .map_err(|e| MembershipError::Tls(format!("{}: {}", cert.display(), e)))?;
                builder = builder.identity(id);
            }
            (None, None) => {}
            _ => {
                return Err(MembershipError::Tls(
                    "cert_file and key_file must be given together".into(),
                ))
            }
        }

        Ok(EtcdClient {
            http: builder.build()?,
        })
    }
}

impl MembershipClient for EtcdClient {
    fn list(&self, endpoint: &str) -> Result<Vec<ClusterMember>, MembershipError> {
        let resp = self.http.get(&members_url(endpoint)).send()?;
        let body = expect_status(resp, StatusCode::OK)?.text()?;

        let list: MemberList = serde_json::from_str(&body)?;
        Ok(list.members.unwrap_or_default())
    }

    fn add(&self, endpoint: &str, peer_url: &str) -> Result<ClusterMember, MembershipError> {
        let req = AddRequest {
            peer_urls: [peer_url],
        };

        let resp = self.http.post(&members_url(endpoint)).json(&req).send()?;
        let body = expect_status(resp, StatusCode::CREATED)?.text()?;

        Ok(serde_json::from_str(&body)?)
    }

    fn remove(&self, endpoint: &str, id: &str) -> Result<(), MembershipError> {
        let url = format!("{}/{}", members_url(endpoint), id);

        let resp = self.http.delete(&url).send()?;
        expect_status(resp, StatusCode::NO_CONTENT)?;
        Ok(())
    }
}

fn members_url(endpoint: &str) -> String {
    format!("{}/v2/members", endpoint.trim_end_matches('/'))
}

fn expect_status(resp: Response, want: StatusCode) -> Result<Response, MembershipError> {
    let status = resp.status();
    if status == want {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    Err(MembershipError::Protocol(status.as_u16(), body))
}
