quick_error! {
    /// Errors occur when persisting the env file.
    #[derive(Debug)]
    pub enum EnvFileError {
        Io(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
            cause(e)
        }

        /// Renaming the temp file into place failed. The temp file is removed already.
        Persist(e: std::io::Error) {
            from(e: tempfile::PersistError) -> (e.error)
            display("failed to rename into place: {}", e)
            cause(e)
        }
    }
}
