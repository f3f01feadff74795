use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::testutil::{read_request, write_response, HttpRequest};
use crate::EtcdClient;
use crate::EtcdConf;
use crate::MembershipClient;
use crate::MembershipError;
use crate::TlsFiles;

/// FakeEtcd answers each accepted connection with the next canned response and sends back the
/// request it received.
struct FakeEtcd {
    endpoint: String,
    reqs: mpsc::Receiver<HttpRequest>,
}

impl FakeEtcd {
    fn start(responses: Vec<(u16, &str)>) -> FakeEtcd {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let responses: Vec<(u16, String)> =
            responses.into_iter().map(|(s, b)| (s, b.to_string())).collect();

        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let req = read_request(&mut stream).unwrap();
                tx.send(req).unwrap();
                write_response(&mut stream, status, &body).unwrap();
            }
        });

        FakeEtcd { endpoint, reqs: rx }
    }

    /// next_req returns the request line and body of the next request.
    fn next_req(&self) -> (String, String) {
        let req = self.reqs.recv_timeout(Duration::from_secs(5)).unwrap();
        (req.request_line().to_string(), req.body)
    }
}

fn new_client() -> EtcdClient {
    EtcdClient::new(&EtcdConf {
        request_timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
        tls: TlsFiles::default(),
    })
    .unwrap()
}

#[test]
fn test_etcd_list() {
    let body = r#"{"members":[
        {"id":"a1","name":"i-1","peerURLs":["http://10.0.0.1:2380"],"clientURLs":["http://10.0.0.1:2379"]},
        {"id":"b2","name":"","peerURLs":["http://10.0.0.2:2380"],"clientURLs":[]}
    ]}"#;
    let etcd = FakeEtcd::start(vec![(200, body)]);

    let members = new_client().list(&etcd.endpoint).unwrap();

    let (req_line, _) = etcd.next_req();
    assert_eq!("GET /v2/members HTTP/1.1", req_line);

    assert_eq!(2, members.len());
    assert_eq!("a1", members[0].id);
    assert_eq!("i-1", members[0].name);
    assert_eq!("b2", members[1].id);
    assert!(!members[1].is_started());
}

#[test]
fn test_etcd_list_null_members() {
    let etcd = FakeEtcd::start(vec![(200, r#"{"members":null}"#)]);
    let members = new_client().list(&etcd.endpoint).unwrap();
    assert!(members.is_empty());
}

#[test]
fn test_etcd_list_bad_status_and_body() {
    let etcd = FakeEtcd::start(vec![(500, "boom"), (200, "not json")]);
    let c = new_client();

    match c.list(&etcd.endpoint) {
        Err(MembershipError::Protocol(status, body)) => {
            assert_eq!(500, status);
            assert_eq!("boom", body);
        }
        other => panic!("expect Protocol, got {:?}", other),
    }

    match c.list(&etcd.endpoint) {
        Err(MembershipError::BadBody(_)) => {}
        other => panic!("expect BadBody, got {:?}", other),
    }
}

#[test]
fn test_etcd_add() {
    let etcd = FakeEtcd::start(vec![(
        201,
        r#"{"id":"c3","name":"","peerURLs":["http://10.0.0.3:2380"],"clientURLs":[]}"#,
    )]);

    let m = new_client()
        .add(&etcd.endpoint, "http://10.0.0.3:2380")
        .unwrap();

    let (req_line, body) = etcd.next_req();
    assert_eq!("POST /v2/members HTTP/1.1", req_line);
    assert_eq!(r#"{"peerURLs":["http://10.0.0.3:2380"]}"#, body);

    assert_eq!("c3", m.id);
    assert_eq!(vec!["http://10.0.0.3:2380".to_string()], m.peer_urls);
}

#[test]
fn test_etcd_add_conflict() {
    let etcd = FakeEtcd::start(vec![(409, r#"{"message":"peerURL exists"}"#)]);

    match new_client().add(&etcd.endpoint, "http://10.0.0.3:2380") {
        Err(MembershipError::Protocol(status, _)) => assert_eq!(409, status),
        other => panic!("expect Protocol, got {:?}", other),
    }
}

#[test]
fn test_etcd_remove() {
    let etcd = FakeEtcd::start(vec![(204, ""), (404, r#"{"message":"not found"}"#)]);
    let c = new_client();

    // trailing slash of endpoint is tolerated
    let ep = format!("{}/", etcd.endpoint);
    c.remove(&ep, "a1").unwrap();

    let (req_line, _) = etcd.next_req();
    assert_eq!("DELETE /v2/members/a1 HTTP/1.1", req_line);

    match c.remove(&etcd.endpoint, "zz") {
        Err(MembershipError::Protocol(status, _)) => assert_eq!(404, status),
        other => panic!("expect Protocol, got {:?}", other),
    }
}

#[test]
fn test_etcd_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = new_client().list(&endpoint).unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);
}

#[test]
fn test_etcd_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    thread::spawn(move || {
        // accept and never answer
        let (_stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(3));
    });

    let err = new_client().list(&endpoint).unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);
}

#[test]
fn test_etcd_tls_conf() {
    let conf = EtcdConf {
        tls: TlsFiles {
            ca_file: None,
            cert_file: Some(PathBuf::from("/nonexistent/cert.pem")),
            key_file: None,
        },
        ..EtcdConf::default()
    };

    match EtcdClient::new(&conf) {
        Err(MembershipError::Tls(_)) => {}
        Err(e) => panic!("expect Tls, got {:?}", e),
        Ok(_) => panic!("expect Tls error"),
    }

    let conf = EtcdConf {
        tls: TlsFiles {
            ca_file: Some(PathBuf::from("/nonexistent/ca.pem")),
            cert_file: None,
            key_file: None,
        },
        ..EtcdConf::default()
    };

    match EtcdClient::new(&conf) {
        Err(MembershipError::Io(_)) => {}
        Err(e) => panic!("expect Io, got {:?}", e),
        Ok(_) => panic!("expect Io error"),
    }
}

#[test]
fn test_http_request_fields() {
    let req = HttpRequest {
        head: "PUT /latest/api/token HTTP/1.1\r\nHost: x\r\nX-Aws-Ec2-Metadata-Token-Ttl-Seconds: 60"
            .into(),
        body: "".into(),
    };

    assert_eq!("PUT /latest/api/token HTTP/1.1", req.request_line());
    assert_eq!("PUT /latest/api/token", req.route());
    assert_eq!(
        Some("60".to_string()),
        req.header("x-aws-ec2-metadata-token-ttl-seconds")
    );
    assert_eq!(None, req.header("content-length"));
}
