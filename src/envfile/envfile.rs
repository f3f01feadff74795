use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::EnvFileError;
use crate::sync::Reconciliation;

pub const DEFAULT_ENV_FILE: &str = "/etc/sysconfig/etcd-peers";
pub const DEFAULT_ENV_PREFIX: &str = "ETCD_";

/// WriteOutcome tells whether `EnvFile::write` did anything.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteOutcome {
    Written,
    AlreadyPresent,
}

/// EnvFile is the environment file the consensus process bootstraps from, e.g.:
///
/// ```text
/// ETCD_NAME=i-1
/// ETCD_INITIAL_CLUSTER_STATE=new
/// ETCD_INITIAL_CLUSTER=i-1=http://10.0.0.1:2380,i-2=http://10.0.0.2:2380
/// ```
///
/// Once it exists it is never touched again: its presence marks the node as configured.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    prefix: String,
}

impl EnvFile {
    /// new creates an env file at `path` whose keys are prefixed with `prefix`.
    pub fn new<P: AsRef<Path>>(path: P, prefix: &str) -> Self {
        EnvFile {
            path: path.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_present(&self) -> bool {
        self.path.exists()
    }

    pub fn render(&self, rec: &Reconciliation) -> String {
        format!(
            "{p}NAME={}\n{p}INITIAL_CLUSTER_STATE={}\n{p}INITIAL_CLUSTER={}\n",
            rec.local_name(),
            rec.cluster_state(),
            rec.initial_cluster_str(),
            p = self.prefix
        )
    }

    /// write persists `rec` unless the file already exists, in which case it is not read.
    ///
    /// Content goes to a temp file in the same directory which is synced and renamed into
    /// place. Readers never see a partial file. On error the temp file is removed.
    pub fn write(&self, rec: &Reconciliation) -> Result<WriteOutcome, EnvFileError> {
        if self.is_present() {
            return Ok(WriteOutcome::AlreadyPresent);
        }

        write_atomic(&self.path, self.render(rec).as_bytes())?;
        Ok(WriteOutcome::Written)
    }
}

/// write_atomic replaces `path` with `content` through a temp file and a rename.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), EnvFileError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !dir.is_dir() {
        fs::create_dir_all(dir)?;
    }

    // removed on drop unless persisted
    let mut tmp = tempfile::Builder::new()
        .prefix(".peersync")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    tmp.write_all(content)?;
    tmp.flush()?;
    set_readable(tmp.as_file())?;
    tmp.as_file().sync_all()?;

    tmp.persist(path)?;

    sync_dir(dir)?;
    Ok(())
}

#[cfg(unix)]
fn set_readable(f: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    f.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_f: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// sync_dir makes the rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
