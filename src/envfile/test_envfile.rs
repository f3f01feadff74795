use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile;

use super::*;
use crate::sync::ClusterState;
use crate::sync::Reconciliation;

fn new_rec() -> Reconciliation {
    Reconciliation::new(
        ClusterState::New,
        vec![
            ("i-1".into(), "http://10.0.0.1:2380".into()),
            ("i-2".into(), "http://10.0.0.2:2380".into()),
        ],
        "i-1",
    )
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_envfile_render() {
    let rec = new_rec();

    let ef = EnvFile::new("/x", DEFAULT_ENV_PREFIX);
    assert_eq!(
        "ETCD_NAME=i-1
ETCD_INITIAL_CLUSTER_STATE=new
ETCD_INITIAL_CLUSTER=i-1=http://10.0.0.1:2380,i-2=http://10.0.0.2:2380
",
        ef.render(&rec)
    );

    let rec = Reconciliation::new(
        ClusterState::Existing,
        vec![("i-2".into(), "http://10.0.0.2:2380".into())],
        "i-2",
    );
    let ef = EnvFile::new("/x", "");
    assert_eq!(
        "NAME=i-2
INITIAL_CLUSTER_STATE=existing
INITIAL_CLUSTER=i-2=http://10.0.0.2:2380
",
        ef.render(&rec)
    );
}

#[test]
fn test_envfile_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etcd-peers");

    let ef = EnvFile::new(&path, DEFAULT_ENV_PREFIX);
    assert!(!ef.is_present());

    let outcome = ef.write(&new_rec()).unwrap();
    assert_eq!(WriteOutcome::Written, outcome);
    assert!(ef.is_present());

    let cont = fs::read_to_string(&path).unwrap();
    assert_eq!(ef.render(&new_rec()), cont);

    // no temp file left behind
    assert_eq!(vec!["etcd-peers".to_string()], dir_entries(dir.path()));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(0o644, mode & 0o777);
    }
}

#[test]
fn test_envfile_already_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etcd-peers");
    fs::write(&path, "stale, not even key=value").unwrap();

    let ef = EnvFile::new(&path, DEFAULT_ENV_PREFIX);
    assert!(ef.is_present());

    let outcome = ef.write(&new_rec()).unwrap();
    assert_eq!(WriteOutcome::AlreadyPresent, outcome);

    // untouched
    assert_eq!(
        "stale, not even key=value",
        fs::read_to_string(&path).unwrap()
    );
}

#[test]
fn test_envfile_create_parent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sysconfig").join("etcd-peers");

    let ef = EnvFile::new(&path, DEFAULT_ENV_PREFIX);
    assert_eq!(WriteOutcome::Written, ef.write(&new_rec()).unwrap());
    assert!(path.is_file());
}

#[test]
fn test_write_atomic_replace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f");

    write_atomic(&path, b"first\n").unwrap();
    write_atomic(&path, b"second\n").unwrap();

    assert_eq!("second\n", fs::read_to_string(&path).unwrap());
    assert_eq!(vec!["f".to_string()], dir_entries(dir.path()));
}

#[test]
fn test_write_atomic_rename_failure() {
    let dir = tempfile::tempdir().unwrap();

    // a non-empty directory can not be replaced by a file
    let path = dir.path().join("occupied");
    fs::create_dir(&path).unwrap();
    fs::write(path.join("x"), "x").unwrap();

    match write_atomic(&path, b"content\n") {
        Err(EnvFileError::Persist(_)) => {}
        other => panic!("expect Persist error, got {:?}", other),
    }

    // the temp file is cleaned up and the destination is left as it was
    assert_eq!(vec!["occupied".to_string()], dir_entries(dir.path()));
    assert!(path.join("x").is_file());
}
