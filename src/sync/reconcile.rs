use std::collections::BTreeSet;
use std::fmt;

use membership::canonical_host;
use membership::ClusterMember;
use membership::EtcdUrls;
use membership::MemberId;
use membership::MembershipClient;
use roster::LocalIdentity;
use roster::Roster;

use super::probe_candidates;
use super::probe_peers;
use super::Coordinator;
use crate::SyncError;

/// ClusterState tells the local member whether it bootstraps a cluster or joins one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ClusterState {
    New,
    Existing,
}

impl ClusterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterState::New => "new",
            ClusterState::Existing => "existing",
        }
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reconciliation is the outcome of one run: what the local member needs to start with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Reconciliation {
    cluster_state: ClusterState,
    initial_cluster: Vec<(String, String)>,
    local_name: String,
}

impl Reconciliation {
    pub fn new(
        cluster_state: ClusterState,
        initial_cluster: Vec<(String, String)>,
        local_name: impl Into<String>,
    ) -> Self {
        Reconciliation {
            cluster_state,
            initial_cluster,
            local_name: local_name.into(),
        }
    }

    pub fn cluster_state(&self) -> ClusterState {
        self.cluster_state
    }

    /// initial_cluster returns the (name, peer url) pairs in output order.
    pub fn initial_cluster(&self) -> &[(String, String)] {
        &self.initial_cluster
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// initial_cluster_str renders the pairs as "n1=url1,n2=url2".
    pub fn initial_cluster_str(&self) -> String {
        self.initial_cluster
            .iter()
            .map(|(n, u)| format!("{}={}", n, u))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Plan is what a run is going to do, decided by the probe outcome.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Plan {
    Bootstrap,
    Join(Coordinator),
}

/// is_member returns true if a live member carries the local name.
pub fn is_member(local_name: &str, members: &[ClusterMember]) -> bool {
    members.iter().any(|m| m.name == local_name)
}

/// classify joins an existing cluster only if one answered with a non-empty member list that
/// does not have the local node in it. Everything else bootstraps.
pub fn classify(local: &LocalIdentity, probed: Option<Coordinator>) -> Plan {
    match probed {
        Some(c) if !c.members.is_empty() && !is_member(&local.name, &c.members) => Plan::Join(c),
        _ => Plan::Bootstrap,
    }
}

/// stale_members returns the members whose peer host is not an address in the roster.
///
/// Both sides are compared by `canonical_host`, thus "FD00::2" in the roster matches a member
/// at "http://[fd00::2]:2380".
pub fn stale_members<'a>(
    roster: &Roster,
    members: &'a [ClusterMember],
) -> Result<Vec<&'a ClusterMember>, SyncError> {
    let addrs: BTreeSet<String> = roster.values().map(|a| roster_host(a)).collect();

    let mut stale = vec![];
    for m in members.iter() {
        let host = m
            .peer_host()
            .map_err(|e| SyncError::BadPeerUrl(m.id.clone(), e))?;

        if !addrs.contains(host.as_str()) {
            stale.push(m);
        }
    }

    Ok(stale)
}

/// roster_host is the canonical form of a roster address. An address no url can be built from
/// is kept as written: no live member can match it anyway.
fn roster_host(addr: &str) -> String {
    canonical_host(addr).unwrap_or_else(|_| addr.trim().to_string())
}

/// Reconciler brings cluster membership in line with a roster, through a `MembershipClient`.
pub struct Reconciler<'a, C: MembershipClient + ?Sized> {
    client: &'a C,
    urls: EtcdUrls,
}

impl<'a, C: MembershipClient + ?Sized> Reconciler<'a, C> {
    pub fn new(client: &'a C, urls: EtcdUrls) -> Self {
        Reconciler { client, urls }
    }

    /// reconcile probes the roster for a running cluster, then either bootstraps a new one or
    /// prunes stale members and joins the local node to it.
    ///
    /// Any membership error aborts the run. Changes already made stay in effect.
    pub fn reconcile(
        &self,
        local: &LocalIdentity,
        roster: &Roster,
    ) -> Result<Reconciliation, SyncError> {
        check_in_roster(local, roster)?;

        let candidates = probe_candidates(roster, &local.address);
        let probed = probe_peers(self.client, &self.urls, &candidates);

        match classify(local, probed) {
            Plan::Bootstrap => Ok(self.bootstrap(local, roster)),
            Plan::Join(coordinator) => self.join(local, roster, &coordinator),
        }
    }

    /// bootstrap describes a new cluster made of the whole roster, in name order.
    pub fn bootstrap(&self, local: &LocalIdentity, roster: &Roster) -> Reconciliation {
        info!("creating new cluster"; "members" => roster.len());

        let initial_cluster = roster
            .iter()
            .map(|(name, addr)| (name.clone(), self.urls.peer_url(addr)))
            .collect();

        Reconciliation::new(ClusterState::New, initial_cluster, local.name.as_str())
    }

    /// join removes stale members from the cluster behind `coordinator` and adds the local node.
    pub fn join(
        &self,
        local: &LocalIdentity,
        roster: &Roster,
        coordinator: &Coordinator,
    ) -> Result<Reconciliation, SyncError> {
        let endpoint = coordinator.endpoint.as_str();
        info!("joining existing cluster"; "endpoint" => endpoint);

        self.prune(endpoint, roster, &coordinator.members)?;

        let members = self.client.list(endpoint)?;

        let local_peer_url = self.urls.peer_url(&local.address);

        let mut initial_cluster: Vec<(String, String)> = vec![];
        for m in members.iter().filter(|m| m.is_started()) {
            let url = m
                .first_peer_url()
                .map_err(|e| SyncError::BadPeerUrl(m.id.clone(), e))?;
            initial_cluster.push((m.name.clone(), url.to_string()));
        }
        initial_cluster.push((local.name.clone(), local_peer_url.clone()));

        let registered = members
            .iter()
            .any(|m| m.peer_urls.iter().any(|u| u == &local_peer_url));

        if registered {
            info!("local peer url already registered, not adding again";
                "peer_url" => &local_peer_url);
        } else {
            info!("adding member"; "peer_url" => &local_peer_url);

            let added = self
                .client
                .add(endpoint, &local_peer_url)
                .map_err(|e| SyncError::Add(local_peer_url.clone(), e))?;

            info!("added member"; "id" => &added.id);
        }

        Ok(Reconciliation::new(
            ClusterState::Existing,
            initial_cluster,
            local.name.as_str(),
        ))
    }

    /// prune removes every member in `members` that is not backed by a roster address.
    /// It returns the ids of the removed members.
    pub fn prune(
        &self,
        endpoint: &str,
        roster: &Roster,
        members: &[ClusterMember],
    ) -> Result<Vec<MemberId>, SyncError> {
        let mut removed = vec![];

        for m in stale_members(roster, members)? {
            info!("removing stale member"; "id" => &m.id, "name" => &m.name);

            self.client
                .remove(endpoint, &m.id)
                .map_err(|e| SyncError::Remove(m.id.clone(), e))?;

            removed.push(m.id.clone());
        }

        Ok(removed)
    }
}

/// check_in_roster requires the roster to list the local node under its own name and address.
///
/// This is stricter than going on without it: such a run would write an initial cluster that
/// leaves the local node out, or prune the member it is about to become.
pub fn check_in_roster(local: &LocalIdentity, roster: &Roster) -> Result<(), SyncError> {
    match roster.get(&local.name) {
        Some(addr) if addr == &local.address => Ok(()),
        _ => Err(SyncError::NotInRoster(
            local.name.clone(),
            local.address.clone(),
        )),
    }
}
