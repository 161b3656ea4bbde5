//! TCP control node.
//!
//! One accept thread plus one thread per live client. The accept loop polls
//! a non-blocking listener on a 100 ms cadence so it observes the stop flag
//! promptly; client reads use a 100 ms timeout for the same reason. Each
//! connection runs an independent [`ControlFramer`] and answers one command
//! at a time in request-reply order.
//!
//! [`ControlServer::stop`] shuts down the listener and every live client
//! socket, then joins the accept and client threads before returning. Stop
//! is idempotent.

use crate::control::command::{CommandHandler, ControlState};
use crate::control::framing::{self, ControlFramer};
use crate::error::{Result, SentinelError};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

const ACCEPT_POLL: Duration = Duration::from_millis(100);
const CLIENT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Accept-and-fan-out server hosting the framed command channel.
pub struct ControlServer {
    port: u16,
    state: Arc<ControlState>,
    local_port: Option<u16>,
    should_stop: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
    shared: Arc<SharedConns>,
}

/// Live connections and their worker threads, shared with the accept loop.
#[derive(Default)]
struct SharedConns {
    clients: Mutex<Vec<TcpStream>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ControlServer {
    pub fn new(port: u16, state: Arc<ControlState>) -> Self {
        Self {
            port,
            state,
            local_port: None,
            should_stop: Arc::new(AtomicBool::new(false)),
            accept_thread: None,
            shared: Arc::new(SharedConns::default()),
        }
    }

    /// Bind the listener and spawn the accept thread. Non-blocking.
    pub fn start(&mut self) -> Result<()> {
        if self.accept_thread.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(("0.0.0.0", self.port))
            .and_then(|l| l.set_nonblocking(true).map(|()| l))
            .map_err(|source| SentinelError::Bind { port: self.port, source })?;
        self.local_port = listener.local_addr().ok().map(|a| a.port());
        info!(port = ?self.local_port, "control node listening");

        self.should_stop.store(false, Ordering::SeqCst);
        let should_stop = Arc::clone(&self.should_stop);
        let state = Arc::clone(&self.state);
        let shared = Arc::clone(&self.shared);

        self.accept_thread = Some(std::thread::spawn(move || {
            accept_loop(listener, state, shared, should_stop);
        }));
        Ok(())
    }

    /// The bound port (useful after starting on port 0).
    pub fn local_port(&self) -> Option<u16> {
        self.local_port
    }

    /// Shut everything down and join all workers. Idempotent.
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);

        {
            let mut clients = self.shared.clients.lock().unwrap_or_else(|e| e.into_inner());
            for stream in clients.drain(..) {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }

        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }

        let workers: Vec<JoinHandle<()>> = {
            let mut workers = self.shared.workers.lock().unwrap_or_else(|e| e.into_inner());
            workers.drain(..).collect()
        };
        for handle in workers {
            let _ = handle.join();
        }
        info!("control node stopped");
    }

    pub fn is_running(&self) -> bool {
        self.accept_thread.is_some()
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(
    listener: TcpListener,
    state: Arc<ControlState>,
    shared: Arc<SharedConns>,
    should_stop: Arc<AtomicBool>,
) {
    while !should_stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "control client connected");
                if stream.set_read_timeout(Some(CLIENT_READ_TIMEOUT)).is_err() {
                    continue;
                }
                let Ok(tracked) = stream.try_clone() else {
                    continue;
                };
                shared.clients.lock().unwrap_or_else(|e| e.into_inner()).push(tracked);

                let handler = CommandHandler::new(Arc::clone(&state));
                let stop = Arc::clone(&should_stop);
                let conns = Arc::clone(&shared);
                let worker = std::thread::spawn(move || {
                    client_loop(stream, handler, conns, stop);
                });
                shared.workers.lock().unwrap_or_else(|e| e.into_inner()).push(worker);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                if should_stop.load(Ordering::SeqCst) {
                    break;
                }
                warn!(error = %e, "accept failed");
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

fn client_loop(
    mut stream: TcpStream,
    mut handler: CommandHandler,
    shared: Arc<SharedConns>,
    should_stop: Arc<AtomicBool>,
) {
    let peer = stream.peer_addr().ok();
    let mut framer = ControlFramer::new();
    let mut buf = [0u8; 4096];

    'conn: while !should_stop.load(Ordering::SeqCst) {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(_) => break,
        };

        framer.feed(&buf[..n]);
        while let Some(request) = framer.pop_frame() {
            let request = String::from_utf8_lossy(&request);
            let reply = handler.handle(&request);
            let encoded = framing::encode(reply.as_bytes());
            if stream.write_all(&encoded).is_err() {
                break 'conn;
            }
        }
    }

    let _ = stream.shutdown(Shutdown::Both);
    debug!(peer = ?peer, "control client disconnected");

    // Prune this connection from the shared list so stop() only shuts down
    // sockets that are still live.
    if let Some(peer) = peer {
        let mut clients = shared.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.retain(|c| c.peer_addr().map(|a| a != peer).unwrap_or(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Journal;
    use crate::stats::StatsRegistry;

    fn test_state() -> Arc<ControlState> {
        Arc::new(ControlState::new(
            Arc::new(StatsRegistry::new()),
            Arc::new(Journal::with_output(Box::new(std::io::sink()))),
            Arc::new(AtomicBool::new(true)),
        ))
    }

    #[test]
    fn start_assigns_ephemeral_port() {
        let mut server = ControlServer::new(0, test_state());
        server.start().unwrap();
        assert!(server.local_port().unwrap() > 0);
        server.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let mut server = ControlServer::new(0, test_state());
        server.start().unwrap();
        server.stop();
        server.stop();
    }

    #[test]
    fn start_twice_is_a_noop() {
        let mut server = ControlServer::new(0, test_state());
        server.start().unwrap();
        let port = server.local_port();
        server.start().unwrap();
        assert_eq!(server.local_port(), port);
        server.stop();
    }
}
