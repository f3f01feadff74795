use std::collections::BTreeMap;

use crate::Ec2Metadata;
use crate::RosterError;
use crate::RosterFile;

/// Roster maps the name of every intended cluster member to its address.
///
/// It is a `BTreeMap` so that every consumer sees members in name order.
pub type Roster = BTreeMap<String, String>;

/// LocalIdentity is the roster entry of the node this process runs on.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LocalIdentity {
    pub name: String,
    pub address: String,
}

impl LocalIdentity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        LocalIdentity {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// RosterProvider is the authoritative source of who should be in the cluster.
pub trait RosterProvider {
    /// local_instance_id returns the name of the local node.
    fn local_instance_id(&self) -> Result<String, RosterError>;

    /// local_address returns the address other members reach the local node at.
    fn local_address(&self) -> Result<String, RosterError>;

    /// roster returns all intended members, the local node included.
    fn roster(&self) -> Result<Roster, RosterError>;

    fn local_identity(&self) -> Result<LocalIdentity, RosterError> {
        Ok(LocalIdentity {
            name: self.local_instance_id()?,
            address: self.local_address()?,
        })
    }
}

/// StaticProvider serves an identity and a roster fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    pub identity: LocalIdentity,
    pub roster: Roster,
}

impl StaticProvider {
    pub fn new(identity: LocalIdentity, roster: Roster) -> Self {
        StaticProvider { identity, roster }
    }
}

impl RosterProvider for StaticProvider {
    fn local_instance_id(&self) -> Result<String, RosterError> {
        Ok(self.identity.name.clone())
    }

    fn local_address(&self) -> Result<String, RosterError> {
        Ok(self.identity.address.clone())
    }

    fn roster(&self) -> Result<Roster, RosterError> {
        if self.roster.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(self.roster.clone())
    }
}

/// IdentitySource tells a `FileProvider` where the local identity comes from.
pub enum IdentitySource {
    Metadata(Ec2Metadata),
    Fixed(LocalIdentity),
}

/// FileProvider reads the roster from a `RosterFile` on every call and takes the local identity
/// from an `IdentitySource`.
pub struct FileProvider {
    identity: IdentitySource,
    roster: RosterFile,
}

impl FileProvider {
    pub fn new(identity: IdentitySource, roster: RosterFile) -> Self {
        FileProvider { identity, roster }
    }
}

impl RosterProvider for FileProvider {
    fn local_instance_id(&self) -> Result<String, RosterError> {
        match &self.identity {
            IdentitySource::Metadata(m) => m.instance_id(),
            IdentitySource::Fixed(id) => Ok(id.name.clone()),
        }
    }

    fn local_address(&self) -> Result<String, RosterError> {
        match &self.identity {
            IdentitySource::Metadata(m) => m.local_ipv4(),
            IdentitySource::Fixed(id) => Ok(id.address.clone()),
        }
    }

    fn roster(&self) -> Result<Roster, RosterError> {
        self.roster.load()
    }
}
