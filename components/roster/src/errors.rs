quick_error! {
    /// Errors occur when looking up the local identity or the roster.
    #[derive(Debug)]
    pub enum RosterError {
        /// The metadata service or cloud API can not be reached.
        Transport(e: reqwest::Error) {
            from(e: reqwest::Error) -> (e)
            display("transport error: {}", e)
        }

        /// The backing source answered but does not have what was asked for.
        NotFound(what: String) {
            display("not found: {}", what)
        }

        Io(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
            display("bad roster yaml: {}", e)
        }

        Empty {
            display("roster has no member")
        }
    }
}
