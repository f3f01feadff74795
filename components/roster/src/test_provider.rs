use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile;

use crate::*;

fn roster_of(entries: &[(&str, &str)]) -> Roster {
    entries
        .iter()
        .map(|(n, a)| (n.to_string(), a.to_string()))
        .collect()
}

fn write_roster(cont: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(cont.as_bytes()).unwrap();
    f.as_file().sync_all().unwrap();
    f
}

#[test]
fn test_parse_roster() {
    let cont = "
i-2: 10.0.0.2
i-1: ' 10.0.0.1 '
i-3: fd00::3
";
    let r = parse_roster(cont).unwrap();
    assert_eq!(
        roster_of(&[("i-1", "10.0.0.1"), ("i-2", "10.0.0.2"), ("i-3", "fd00::3")]),
        r
    );

    // iteration is in name order regardless of the order in the file
    let names: Vec<_> = r.keys().cloned().collect();
    assert_eq!(vec!["i-1", "i-2", "i-3"], names);
}

#[test]
fn test_parse_roster_error() {
    match parse_roster("") {
        Err(RosterError::Empty) => {}
        other => panic!("expect Empty, got {:?}", other),
    }

    match parse_roster("{}") {
        Err(RosterError::Empty) => {}
        other => panic!("expect Empty, got {:?}", other),
    }

    match parse_roster("i-1: ''") {
        Err(RosterError::NotFound(_)) => {}
        other => panic!("expect NotFound, got {:?}", other),
    }

    match parse_roster("- 10.0.0.1\n- 10.0.0.2\n") {
        Err(RosterError::BadYaml(_)) => {}
        other => panic!("expect BadYaml, got {:?}", other),
    }
}

#[test]
fn test_roster_file() {
    let f = write_roster("i-1: 10.0.0.1\ni-2: 10.0.0.2\n");
    let rf = RosterFile::new(f.path());
    assert_eq!(f.path(), rf.path());

    let r = rf.load().unwrap();
    assert_eq!(roster_of(&[("i-1", "10.0.0.1"), ("i-2", "10.0.0.2")]), r);

    let missing = RosterFile::new("/nonexistent/roster.yaml");
    match missing.load() {
        Err(RosterError::Io(_)) => {}
        other => panic!("expect Io, got {:?}", other),
    }
}

#[test]
fn test_static_provider() {
    let p = StaticProvider::new(
        LocalIdentity::new("i-1", "10.0.0.1"),
        roster_of(&[("i-1", "10.0.0.1"), ("i-2", "10.0.0.2")]),
    );

    assert_eq!("i-1", p.local_instance_id().unwrap());
    assert_eq!("10.0.0.1", p.local_address().unwrap());
    assert_eq!(LocalIdentity::new("i-1", "10.0.0.1"), p.local_identity().unwrap());
    assert_eq!(2, p.roster().unwrap().len());

    let p = StaticProvider::new(LocalIdentity::new("i-1", "10.0.0.1"), Roster::new());
    match p.roster() {
        Err(RosterError::Empty) => {}
        other => panic!("expect Empty, got {:?}", other),
    }
}

#[test]
fn test_file_provider_fixed_identity() {
    let mut f = write_roster("i-1: 10.0.0.1\n");
    let p = FileProvider::new(
        IdentitySource::Fixed(LocalIdentity::new("i-1", "10.0.0.1")),
        RosterFile::new(f.path()),
    );

    assert_eq!(LocalIdentity::new("i-1", "10.0.0.1"), p.local_identity().unwrap());
    assert_eq!(roster_of(&[("i-1", "10.0.0.1")]), p.roster().unwrap());

    // roster is read again on every call
    f.write_all(b"i-2: 10.0.0.2\n").unwrap();
    f.as_file().sync_all().unwrap();
    assert_eq!(
        roster_of(&[("i-1", "10.0.0.1"), ("i-2", "10.0.0.2")]),
        p.roster().unwrap()
    );
}
