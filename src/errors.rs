use membership::MemberId;
use membership::MembershipError;
use roster::RosterError;

use crate::conf::ConfError;
use crate::envfile::EnvFileError;

quick_error! {
    /// SyncError is anything that aborts a sync run.
    ///
    /// Membership changes issued before the error are not rolled back.
    #[derive(Debug)]
    pub enum SyncError {
        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
            display("config: {}", e)
            cause(e)
        }

        Roster(e: RosterError) {
            from(e: RosterError) -> (e)
            display("roster: {}", e)
            cause(e)
        }

        Membership(e: MembershipError) {
            from(e: MembershipError) -> (e)
            display("membership: {}", e)
            cause(e)
        }

        EnvFile(e: EnvFileError) {
            from(e: EnvFileError) -> (e)
            display("env file: {}", e)
            cause(e)
        }

        /// The local node is missing from the roster or listed with another address.
        NotInRoster(name: String, address: String) {
            display("local node {}({}) is not in roster", name, address)
        }

        /// A live member reports a peer url that can not be interpreted.
        BadPeerUrl(id: MemberId, e: MembershipError) {
            display("member {} has bad peer url: {}", id, e)
            cause(e)
        }

        Remove(id: MemberId, e: MembershipError) {
            display("failed to remove member {}: {}", id, e)
            cause(e)
        }

        Add(peer_url: String, e: MembershipError) {
            display("failed to add member {}: {}", peer_url, e)
            cause(e)
        }
    }
}
