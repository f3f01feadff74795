//! In-memory stand-ins for the membership API, shared by unit and integration tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::io;

use membership::ClusterMember;
use membership::MembershipClient;
use membership::MembershipError;
use roster::Roster;

/// Call records one request a `FakeCluster` received.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    List(String),
    Add(String, String),
    Remove(String, String),
}

/// FakeCluster is a running cluster whose members are reachable at the client endpoints in
/// `reachable`. Requests to any other endpoint fail as if the connection was refused.
#[derive(Debug, Default)]
pub struct FakeCluster {
    pub reachable: BTreeSet<String>,
    pub members: RefCell<Vec<ClusterMember>>,
    pub calls: RefCell<Vec<Call>>,

    /// ids whose removal is rejected
    pub fail_remove: BTreeSet<String>,
    pub fail_add: bool,

    next_id: Cell<u64>,
}

impl FakeCluster {
    pub fn new(reachable: &[&str], members: Vec<ClusterMember>) -> FakeCluster {
        FakeCluster {
            reachable: reachable.iter().map(|x| x.to_string()).collect(),
            members: RefCell::new(members),
            ..Default::default()
        }
    }

    /// unreachable is a cluster nobody can talk to.
    pub fn unreachable() -> FakeCluster {
        FakeCluster::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| match c {
                Call::List(_) => false,
                _ => true,
            })
            .collect()
    }

    fn check_reachable(&self, endpoint: &str) -> Result<(), MembershipError> {
        if self.reachable.contains(endpoint) {
            return Ok(());
        }

        Err(MembershipError::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("connect to {}", endpoint),
        )))
    }
}

impl MembershipClient for FakeCluster {
    fn list(&self, endpoint: &str) -> Result<Vec<ClusterMember>, MembershipError> {
        self.calls.borrow_mut().push(Call::List(endpoint.into()));
        self.check_reachable(endpoint)?;

        Ok(self.members.borrow().clone())
    }

    fn add(&self, endpoint: &str, peer_url: &str) -> Result<ClusterMember, MembershipError> {
        self.calls
            .borrow_mut()
            .push(Call::Add(endpoint.into(), peer_url.into()));
        self.check_reachable(endpoint)?;

        if self.fail_add {
            return Err(MembershipError::Protocol(500, "add rejected".into()));
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let m = ClusterMember {
            id: format!("new-{}", id),
            name: "".into(),
            peer_urls: vec![peer_url.into()],
            client_urls: vec![],
        };
        self.members.borrow_mut().push(m.clone());
        Ok(m)
    }

    fn remove(&self, endpoint: &str, id: &str) -> Result<(), MembershipError> {
        self.calls
            .borrow_mut()
            .push(Call::Remove(endpoint.into(), id.into()));
        self.check_reachable(endpoint)?;

        if self.fail_remove.contains(id) {
            return Err(MembershipError::Protocol(500, "remove rejected".into()));
        }

        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|m| m.id != id);

        if members.len() == before {
            return Err(MembershipError::Protocol(404, format!("member {} not found", id)));
        }
        Ok(())
    }
}

/// live_member builds a started member with the default peer port.
pub fn live_member(id: &str, name: &str, addr: &str) -> ClusterMember {
    ClusterMember {
        id: id.into(),
        name: name.into(),
        peer_urls: vec![format!("http://{}:2380", addr)],
        client_urls: vec![format!("http://{}:2379", addr)],
    }
}

pub fn roster_of(entries: &[(&str, &str)]) -> Roster {
    entries
        .iter()
        .map(|(n, a)| (n.to_string(), a.to_string()))
        .collect()
}
