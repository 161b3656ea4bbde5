//! Live-path smoke test: a gateway thread bound to a real UDP socket,
//! fed by the synthetic sensor over loopback, stopped via its flag.

use anyhow::Result;
use sentinel::sim::MeasurementGenerator;
use sentinel::{FrameSink, Gateway, GatewayConfig, Journal, UdpFrameSink, UdpFrameSource};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn frames_flow_from_sink_to_gateway() -> Result<()> {
    // Reserve an ephemeral port first so the test does not race other suites.
    let probe = UdpFrameSource::bind(0)?;
    let port = probe.local_port().expect("bound port");
    drop(probe);

    let journal = Arc::new(Journal::with_output(Box::new(std::io::sink())));
    let config = GatewayConfig { udp_port: port, crc_enabled: false, ..Default::default() };
    let mut gateway = Gateway::new(config, journal);
    let stats = gateway.stats();
    let stop = gateway.stop_handle();

    let worker = std::thread::spawn(move || gateway.run());

    // Send a clean 20-frame sequence at the gateway.
    let mut measurer = MeasurementGenerator::new(3, 5);
    let mut sink = UdpFrameSink::connect("127.0.0.1", port)?;
    for i in 0..20u64 {
        let frame = measurer.generate_heartbeat(i * 1_000_000);
        assert!(sink.send(&frame));
        std::thread::sleep(Duration::from_millis(2));
    }

    // Wait for ingestion, then stop the loop.
    let deadline = Instant::now() + Duration::from_secs(5);
    while stats.global().rx_total < 20 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    stop.store(true, Ordering::SeqCst);
    worker.join().expect("gateway thread panicked")?;

    let global = stats.global();
    assert_eq!(global.rx_total, 20, "{global:?}");
    assert_eq!(global.gap_total, 0);
    assert_eq!(global.malformed_total, 0);
    assert_eq!(stats.source(3).rx_count, 20);
    Ok(())
}

#[test]
fn malformed_datagrams_are_counted_not_fatal() -> Result<()> {
    let probe = UdpFrameSource::bind(0)?;
    let port = probe.local_port().expect("bound port");
    drop(probe);

    let journal = Arc::new(Journal::with_output(Box::new(std::io::sink())));
    let config = GatewayConfig { udp_port: port, crc_enabled: false, ..Default::default() };
    let mut gateway = Gateway::new(config, journal);
    let stats = gateway.stats();
    let stop = gateway.stop_handle();

    let worker = std::thread::spawn(move || gateway.run());

    let mut sink = UdpFrameSink::connect("127.0.0.1", port)?;
    // Garbage, then a valid frame: the loop must survive the garbage.
    assert!(sink.send(&[0xFF; 7]));
    let mut measurer = MeasurementGenerator::new(1, 1);
    assert!(sink.send(&measurer.generate_heartbeat(0)));

    let deadline = Instant::now() + Duration::from_secs(5);
    while stats.global().rx_total < 1 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    stop.store(true, Ordering::SeqCst);
    worker.join().expect("gateway thread panicked")?;

    let global = stats.global();
    assert_eq!(global.malformed_total, 1);
    assert_eq!(global.rx_total, 1);
    Ok(())
}
