//! Control node over real TCP: framed request/reply, concurrent clients,
//! live reconfiguration, clean shutdown.

use anyhow::Result;
use sentinel::{ControlClient, ControlServer, ControlState, Journal, Severity, StatsRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Fixture {
    server: ControlServer,
    port: u16,
    state: Arc<ControlState>,
}

fn start_server() -> Result<Fixture> {
    let state = Arc::new(ControlState::new(
        Arc::new(StatsRegistry::new()),
        Arc::new(Journal::with_output(Box::new(std::io::sink()))),
        Arc::new(AtomicBool::new(true)),
    ));
    let mut server = ControlServer::new(0, Arc::clone(&state));
    server.start()?;
    let port = server.local_port().expect("bound port");
    Ok(Fixture { server, port, state })
}

#[test]
fn health_round_trip() -> Result<()> {
    let mut fixture = start_server()?;

    let mut client = ControlClient::connect("127.0.0.1", fixture.port)?;
    assert_eq!(client.send_command("GET HEALTH")?, "HEALTH OK");

    fixture.state.stats.record_gap(1, 4);
    assert_eq!(client.send_command("GET HEALTH")?, "HEALTH DEGRADED");

    fixture.server.stop();
    Ok(())
}

#[test]
fn stats_round_trip() -> Result<()> {
    let mut fixture = start_server()?;
    fixture.state.stats.record_rx(1, 0, 0);
    fixture.state.stats.record_rx(1, 1, 0);
    fixture.state.stats.record_duplicate(1);

    let mut client = ControlClient::connect("127.0.0.1", fixture.port)?;
    let reply = client.send_command("GET STATS")?;
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines[0], "STATS");
    assert!(lines.contains(&"rx_total=2"));
    assert!(lines.contains(&"duplicate_total=1"));

    fixture.server.stop();
    Ok(())
}

#[test]
fn set_commands_reconfigure_shared_state() -> Result<()> {
    let mut fixture = start_server()?;
    let mut client = ControlClient::connect("127.0.0.1", fixture.port)?;

    assert_eq!(client.send_command("SET CRC=OFF")?, "OK CRC=OFF");
    assert!(!fixture.state.crc_policy.load(Ordering::SeqCst));

    assert_eq!(client.send_command("SET LOG_LEVEL=DEBUG")?, "OK LOG_LEVEL=DEBUG");
    assert_eq!(fixture.state.journal.level(), Severity::Debug);

    assert_eq!(client.send_command("SET SITE=ridge-7")?, "OK SITE=ridge-7");
    assert_eq!(fixture.state.setting("SITE").as_deref(), Some("ridge-7"));

    fixture.server.stop();
    Ok(())
}

#[test]
fn errors_keep_the_connection_open() -> Result<()> {
    let mut fixture = start_server()?;
    let mut client = ControlClient::connect("127.0.0.1", fixture.port)?;

    assert_eq!(client.send_command("")?, "ERR EMPTY_COMMAND");
    assert_eq!(client.send_command("FROB")?, "ERR UNKNOWN_COMMAND");
    assert_eq!(client.send_command("SET CRC OFF")?, "ERR INVALID_SET_SYNTAX");
    assert_eq!(client.send_command("SET LOG_LEVEL=LOUD")?, "ERR INVALID_LOG_LEVEL");

    // Still serviceable after a string of errors.
    assert_eq!(client.send_command("GET HEALTH")?, "HEALTH OK");

    fixture.server.stop();
    Ok(())
}

#[test]
fn concurrent_clients_get_their_own_replies() -> Result<()> {
    let mut fixture = start_server()?;
    let port = fixture.port;

    let mut handles = Vec::new();
    for i in 0..4 {
        handles.push(std::thread::spawn(move || -> Result<()> {
            let mut client = ControlClient::connect("127.0.0.1", port)?;
            for _ in 0..10 {
                let reply = client.send_command(&format!("SET CLIENT_{i}={i}"))?;
                assert_eq!(reply, format!("OK CLIENT_{i}={i}"));
                assert_eq!(client.send_command("GET HEALTH")?, "HEALTH OK");
            }
            Ok(())
        }));
    }
    for handle in handles {
        handle.join().expect("client thread panicked")?;
    }

    fixture.server.stop();
    Ok(())
}

#[test]
fn stop_disconnects_live_clients() -> Result<()> {
    let mut fixture = start_server()?;
    let mut client = ControlClient::connect("127.0.0.1", fixture.port)?;
    assert_eq!(client.send_command("GET HEALTH")?, "HEALTH OK");

    fixture.server.stop();

    // The server shut the socket down; the next exchange must fail.
    assert!(client.send_command("GET HEALTH").is_err());
    Ok(())
}
