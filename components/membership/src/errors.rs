use crate::MemberId;

quick_error! {
    /// Errors occur when talking to the membership API of a cluster member.
    #[derive(Debug)]
    pub enum MembershipError {
        /// The endpoint is unreachable, timed out or the connection broke.
        Transport(e: reqwest::Error) {
            from(e: reqwest::Error) -> (e)
            display("transport error: {}", e)
        }

        /// The endpoint answered with a status this client does not expect.
        Protocol(status: u16, body: String) {
            display("unexpected status {}: {}", status, body.trim())
        }

        /// The endpoint answered with a body this client can not decode.
        BadBody(e: serde_json::Error) {
            from(e: serde_json::Error) -> (e)
            display("malformed membership response: {}", e)
        }

        BadUrl(url: String, reason: String) {
            display("bad url {:?}: {}", url, reason)
        }

        NoPeerUrl(id: MemberId) {
            display("member {} has no peer url", id)
        }

        Tls(msg: String) {
            display("tls: {}", msg)
        }

        Io(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
        }
    }
}

impl MembershipError {
    /// is_transport returns true if the request never got an answer.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            _ => false,
        }
    }
}
