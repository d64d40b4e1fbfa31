//! A tiny HTTPS server for browser-driven tests.
//!
//! Serves one static plaintext page on an OS-assigned port and raises
//! a [`PageServed`] signal once the page has actually been fetched.
//! The accept loop runs on a detached background thread for the life
//! of the process.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ServerConfig, ServerConnection, Stream};
use tracing::{debug, info, warn};

use super::latch::PageServed;
use crate::error::{FoxtrapError, Result};

/// Self-signed identity served to test clients, kept next to this file.
const FIXTURE_PEM: &[u8] = include_bytes!("fixture.pem");

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Content-Type: text/plain\r\n\
    Content-Length: 12\r\n\
    Connection: close\r\n\
    \r\n\
    Hello world!";

const NOT_IMPLEMENTED_RESPONSE: &[u8] = b"HTTP/1.1 501 Not Implemented\r\n\
    Content-Length: 0\r\n\
    Connection: close\r\n\
    \r\n";

/// Handle to a running fixture server.
///
/// Obtained from [`FixtureServer::run`]; the server itself lives on a
/// background thread and cannot be stopped short of process exit.
pub struct FixtureServer {
    url: String,
    port: u16,
    served: PageServed,
}

impl FixtureServer {
    /// Bind to an ephemeral local port, start serving in the
    /// background, and return once the URL is connectable.
    ///
    /// A broken bundled certificate fails here, loudly, rather than
    /// surfacing as per-connection handshake noise later.
    pub fn run() -> Result<Self> {
        let config = Arc::new(tls_config()?);
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let addr = listener.local_addr()?;
        let served = PageServed::new();

        let loop_served = served.clone();
        thread::Builder::new()
            .name("fixture-https".to_string())
            .spawn(move || accept_loop(listener, config, loop_served))?;

        let url = format!("https://{}:{}/", addr.ip(), addr.port());
        info!("Fixture server listening at {}", url);
        Ok(Self {
            url,
            port: addr.port(),
            served,
        })
    }

    /// Fully formed `https://host:port/` URL for this server.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This server's page-served signal.
    pub fn served(&self) -> &PageServed {
        &self.served
    }
}

fn tls_config() -> Result<ServerConfig> {
    let identity = load_identity(FIXTURE_PEM)?;
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(identity.certs, identity.key)?;
    Ok(config)
}

#[derive(Debug)]
struct Identity {
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

fn load_identity(pem: &[u8]) -> Result<Identity> {
    let certs = rustls_pemfile::certs(&mut &pem[..]).collect::<io::Result<Vec<_>>>()?;
    if certs.is_empty() {
        return Err(FoxtrapError::Fixture(
            "bundled PEM contains no certificate".to_string(),
        ));
    }
    let key = rustls_pemfile::private_key(&mut &pem[..])?.ok_or_else(|| {
        FoxtrapError::Fixture("bundled PEM contains no private key".to_string())
    })?;
    Ok(Identity { certs, key })
}

/// Serve connections one at a time until the process exits.
fn accept_loop(listener: TcpListener, config: Arc<ServerConfig>, served: PageServed) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_client(stream, &config, &served) {
                    // An unexpected EOF is a client bailing mid-handshake.
                    if is_tls_error(&e) || e.kind() == io::ErrorKind::UnexpectedEof {
                        debug!("TLS noise on fixture port: {}", e);
                    } else {
                        warn!("Fixture connection failed: {}", e);
                    }
                }
            }
            Err(e) => warn!("Fixture accept failed: {}", e),
        }
    }
}

fn handle_client(
    mut tcp: TcpStream,
    config: &Arc<ServerConfig>,
    served: &PageServed,
) -> io::Result<()> {
    let mut conn = ServerConnection::new(Arc::clone(config)).map_err(io::Error::other)?;
    let mut tls = Stream::new(&mut conn, &mut tcp);

    let head = read_request_head(&mut tls)?;
    if head.trim().is_empty() {
        return Ok(());
    }

    if is_get(&head) {
        tls.write_all(OK_RESPONSE)?;
        tls.flush()?;
        // The signal must only fire once the body is on the wire.
        served.set();
    } else {
        tls.write_all(NOT_IMPLEMENTED_RESPONSE)?;
        tls.flush()?;
    }

    conn.send_close_notify();
    let _ = conn.complete_io(&mut tcp);
    Ok(())
}

/// Read until the blank line ending the request head, bounded at 8 KiB.
///
/// The first read also drives the TLS handshake, so a plain-HTTP probe
/// fails here with a TLS-layer error.
fn read_request_head(stream: &mut impl Read) -> io::Result<String> {
    const MAX_HEAD: usize = 8 * 1024;

    let mut head = Vec::new();
    let mut chunk = [0u8; 512];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        if head.len() >= MAX_HEAD {
            break;
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

fn is_get(head: &str) -> bool {
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .map(|method| method == "GET")
        .unwrap_or(false)
}

/// Failures raised by the TLS layer itself, as opposed to socket or
/// HTTP handling. Plain-HTTP probes and aborted handshakes land here.
fn is_tls_error(e: &io::Error) -> bool {
    e.get_ref()
        .is_some_and(|inner| inner.is::<rustls::Error>())
}
