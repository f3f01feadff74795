use std::fs;
use std::path::{Path, PathBuf};

use crate::Roster;
use crate::RosterError;

/// RosterFile is a yaml mapping from member name to address, e.g.:
///
/// ```yaml
/// i-0a1b: 10.0.0.1
/// i-0c2d: 10.0.0.2
/// ```
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        RosterFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// load reads the file again. Nothing is cached between calls.
    pub fn load(&self) -> Result<Roster, RosterError> {
        let content = fs::read_to_string(&self.path)?;
        parse_roster(&content)
    }
}

/// parse_roster parses a yaml roster. Names and addresses are trimmed and entries with an empty
/// name or address are rejected.
pub fn parse_roster(content: &str) -> Result<Roster, RosterError> {
    if content.trim().is_empty() {
        return Err(RosterError::Empty);
    }

    let raw: Option<Roster> = serde_yaml::from_str(content)?;
    let raw = raw.unwrap_or_default();

    let mut roster = Roster::new();
    for (name, addr) in raw.into_iter() {
        let (name, addr) = (name.trim(), addr.trim());
        if name.is_empty() || addr.is_empty() {
            return Err(RosterError::NotFound(format!(
                "address of roster entry {:?}",
                name
            )));
        }
        roster.insert(name.to_string(), addr.to_string());
    }

    if roster.is_empty() {
        return Err(RosterError::Empty);
    }

    Ok(roster)
}
