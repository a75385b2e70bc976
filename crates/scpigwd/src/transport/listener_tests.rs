//! Tests for the socket listeners.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::{
    Connection, ConnectionHandler, CountingHandler, SessionIds, SocketListener, TlsFixture,
    TransportKind, load_server_config,
};

#[derive(Clone)]
struct CountingFixture {
    count: Arc<AtomicUsize>,
    handler: Arc<CountingHandler>,
}

#[fixture]
fn counting_fixture() -> CountingFixture {
    let (count, handler) = CountingHandler::new();
    CountingFixture { count, handler }
}

#[fixture]
fn ids() -> Arc<SessionIds> {
    Arc::new(SessionIds::new())
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// Completes the handshake, records the session, and replies with the
/// transport name.
#[derive(Default)]
struct AnnouncingHandler {
    seen: Mutex<Vec<(u64, TransportKind)>>,
}

impl ConnectionHandler for AnnouncingHandler {
    fn handle(&self, mut connection: Connection) {
        if connection.stream.complete_handshake().is_err() {
            return;
        }
        let kind = connection.stream.kind();
        self.seen
            .lock()
            .expect("seen lock")
            .push((connection.id, kind));
        write!(connection.stream, "{kind}\r\n").expect("announce transport");
        connection.stream.flush().expect("flush announcement");
        connection.stream.shutdown().expect("shut down connection");
    }
}

#[rstest]
fn plain_listener_accepts_connections(counting_fixture: CountingFixture, ids: Arc<SessionIds>) {
    let listener = SocketListener::bind_plain("127.0.0.1", 0, 0).expect("bind plain listener");
    let addr = listener
        .local_addr()
        .expect("listener should report local address");
    let CountingFixture { count, handler } = counting_fixture;
    let handle = listener
        .start(handler as Arc<dyn ConnectionHandler>, ids)
        .expect("start listener");

    TcpStream::connect(addr).expect("connect first client");
    TcpStream::connect(addr).expect("connect second client");

    assert!(wait_for_count(&count, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn plain_listener_falls_back_when_port_is_taken() {
    let occupied = TcpListener::bind(("0.0.0.0", 0)).expect("occupy port");
    let taken = occupied.local_addr().expect("occupied addr").port();
    let spare = TcpListener::bind(("0.0.0.0", 0)).expect("find spare port");
    let fallback = spare.local_addr().expect("spare addr").port();
    drop(spare);

    let listener =
        SocketListener::bind_plain("0.0.0.0", taken, fallback).expect("bind fallback listener");
    let bound = listener.local_addr().expect("local addr");
    assert_eq!(bound.port(), fallback);
}

#[rstest]
fn plain_listener_reports_taken_port_without_fallback() {
    let occupied = TcpListener::bind(("0.0.0.0", 0)).expect("occupy port");
    let taken = occupied.local_addr().expect("occupied addr").port();
    let error = SocketListener::bind_plain("0.0.0.0", taken, taken).expect_err("port is taken");
    assert!(error.is_addr_in_use(), "{error}");
}

#[rstest]
fn session_ids_ascend_across_listeners(ids: Arc<SessionIds>) {
    let handler = Arc::new(AnnouncingHandler::default());
    let first_listener = SocketListener::bind_plain("127.0.0.1", 0, 0).expect("bind first");
    let second_listener = SocketListener::bind_plain("127.0.0.1", 0, 0).expect("bind second");
    let first_addr = first_listener.local_addr().expect("first addr");
    let second_addr = second_listener.local_addr().expect("second addr");
    let first = first_listener
        .start(Arc::clone(&handler) as Arc<dyn ConnectionHandler>, Arc::clone(&ids))
        .expect("start first");
    let second = second_listener
        .start(Arc::clone(&handler) as Arc<dyn ConnectionHandler>, ids)
        .expect("start second");

    for addr in [first_addr, second_addr, first_addr] {
        let stream = TcpStream::connect(addr).expect("connect");
        let mut line = String::new();
        BufReader::new(stream)
            .read_line(&mut line)
            .expect("read announcement");
        assert_eq!(line, "TCP\r\n");
    }

    let mut seen: Vec<u64> = handler
        .seen
        .lock()
        .expect("seen lock")
        .iter()
        .map(|(id, _)| *id)
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3]);
    first.shutdown();
    second.shutdown();
    first.join().expect("join first");
    second.join().expect("join second");
}

#[rstest]
fn tls_listener_completes_handshake(ids: Arc<SessionIds>) {
    let fixture = TlsFixture::generate();
    let config =
        load_server_config(&fixture.cert_path(), &fixture.key_path()).expect("server config");
    let listener = SocketListener::bind_tls("127.0.0.1", 0, config).expect("bind tls listener");
    let addr = listener.local_addr().expect("local addr");
    let handler = Arc::new(AnnouncingHandler::default());
    let handle = listener
        .start(Arc::clone(&handler) as Arc<dyn ConnectionHandler>, ids)
        .expect("start listener");

    let client = fixture.connect(addr);
    let mut line = String::new();
    BufReader::new(client)
        .read_line(&mut line)
        .expect("read announcement");
    assert_eq!(line, "SSL\r\n");
    assert_eq!(
        handler.seen.lock().expect("seen lock").as_slice(),
        &[(1, TransportKind::Ssl)]
    );

    handle.shutdown();
    handle.join().expect("join listener");
}
