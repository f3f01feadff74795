use crate::ClusterMember;
use crate::MembershipError;

/// MembershipClient manages members through the administrative endpoint of one running member.
///
/// `endpoint` is a client url such as `http://10.0.0.1:2379`.
/// Every call is bounded by the request timeout of the implementation and is never retried.
pub trait MembershipClient {
    /// list returns all members the endpoint knows about, started or not.
    fn list(&self, endpoint: &str) -> Result<Vec<ClusterMember>, MembershipError>;

    /// add registers a new, not yet started member with a single peer url.
    fn add(&self, endpoint: &str, peer_url: &str) -> Result<ClusterMember, MembershipError>;

    /// remove evicts the member with the given id.
    fn remove(&self, endpoint: &str, id: &str) -> Result<(), MembershipError>;
}
