use membership::ClusterMember;
use membership::EtcdUrls;
use membership::MembershipClient;
use roster::Roster;

/// Coordinator is the first cluster member that answered a probe.
/// All membership changes of a run are sent to its endpoint.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Coordinator {
    pub endpoint: String,
    pub members: Vec<ClusterMember>,
}

/// probe_candidates returns the addresses worth probing: every roster address except the local
/// one, ascending and without duplicates.
pub fn probe_candidates(roster: &Roster, local_addr: &str) -> Vec<String> {
    let mut addrs: Vec<String> = roster
        .values()
        .filter(|a| a.as_str() != local_addr)
        .cloned()
        .collect();

    addrs.sort();
    addrs.dedup();
    addrs
}

/// probe_peers asks each candidate in turn for the member list and returns the first that
/// answers. A candidate that fails is skipped.
///
/// `None` means no running cluster was found, which is how a new cluster is detected.
pub fn probe_peers<C>(client: &C, urls: &EtcdUrls, candidates: &[String]) -> Option<Coordinator>
where
    C: MembershipClient + ?Sized,
{
    for addr in candidates.iter() {
        let endpoint = urls.client_url(addr);

        match client.list(&endpoint) {
            Ok(members) => {
                info!("found running cluster";
                    "endpoint" => &endpoint,
                    "members" => members.len());

                return Some(Coordinator { endpoint, members });
            }
            Err(e) => {
                warn!("probe failed"; "endpoint" => &endpoint, "err" => %e);
            }
        }
    }

    None
}
