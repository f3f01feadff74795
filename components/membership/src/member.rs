use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::MembershipError;

/// MemberId is the opaque id a cluster assigns to a member, e.g. "8e9e05c52164694d".
pub type MemberId = String;

pub const DEFAULT_PEER_PORT: u16 = 2380;
pub const DEFAULT_CLIENT_PORT: u16 = 2379;

/// ClusterMember is a member as reported live by the membership API.
///
/// `name` stays empty until the member has started and completed its join handshake.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct ClusterMember {
    pub id: MemberId,

    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "peerURLs")]
    pub peer_urls: Vec<String>,

    #[serde(default, rename = "clientURLs")]
    pub client_urls: Vec<String>,
}

impl ClusterMember {
    /// is_started returns true once the member has joined and published its name.
    pub fn is_started(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn first_peer_url(&self) -> Result<&str, MembershipError> {
        self.peer_urls
            .first()
            .map(|u| u.as_str())
            .ok_or_else(|| MembershipError::NoPeerUrl(self.id.clone()))
    }

    /// peer_host returns the host part of the first peer url, without port, in the form
    /// `canonical_host` gives. An IPv6 host is returned without brackets.
    pub fn peer_host(&self) -> Result<String, MembershipError> {
        url_host(self.first_peer_url()?)
    }
}

/// canonical_host returns `addr` as the host of a url built from it would read: domain names
/// lowercased, IPv6 literals compressed and lowercased without brackets.
///
/// Compare an address with a `ClusterMember::peer_host` only in this form.
pub fn canonical_host(addr: &str) -> Result<String, MembershipError> {
    url_host(&EtcdUrls::default().peer_url(addr.trim()))
}

fn url_host(raw: &str) -> Result<String, MembershipError> {
    let url = Url::parse(raw).map_err(|e| MembershipError::BadUrl(raw.into(), e.to_string()))?;

    let host = url
        .host_str()
        .ok_or_else(|| MembershipError::BadUrl(raw.into(), "no host".into()))?;

    Ok(host.trim_start_matches('[').trim_end_matches(']').to_string())
}

/// EtcdUrls builds peer and client urls of a member from its address.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EtcdUrls {
    pub scheme: String,
    pub peer_port: u16,
    pub client_port: u16,
}

impl Default for EtcdUrls {
    fn default() -> Self {
        EtcdUrls {
            scheme: "http".into(),
            peer_port: DEFAULT_PEER_PORT,
            client_port: DEFAULT_CLIENT_PORT,
        }
    }
}

impl EtcdUrls {
    /// peer_url returns the url other members replicate to, e.g. "http://10.0.0.1:2380".
    pub fn peer_url(&self, addr: &str) -> String {
        self.url(addr, self.peer_port)
    }

    /// client_url returns the administrative endpoint, e.g. "http://10.0.0.1:2379".
    pub fn client_url(&self, addr: &str) -> String {
        self.url(addr, self.client_port)
    }

    fn url(&self, addr: &str, port: u16) -> String {
        if addr.contains(':') && !addr.starts_with('[') {
            format!("{}://[{}]:{}", self.scheme, addr, port)
        } else {
            format!("{}://{}:{}", self.scheme, addr, port)
        }
    }
}
