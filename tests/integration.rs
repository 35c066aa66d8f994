//! End-to-end tests driving the registry with a scripted transport.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use snmp2::Oid;
use tokio_util::sync::CancellationToken;

use snmplog::collector::Collector;
use snmplog::config::DeviceConfig;
use snmplog::poller::DevicePoller;
use snmplog::registry::Registry;
use snmplog::sink::CsvSink;
use snmplog::transport::{QueryResponse, QueryTransport};

const HEADER: &str = "Timestamp,System Name,System Description,CPU Load";

/// Transport double: answers from a script, counts attempts per device.
#[derive(Clone, Default)]
struct ScriptedTransport {
    attempts: Arc<Mutex<HashMap<String, usize>>>,
    failing: Arc<HashSet<String>>,
    delay: Duration,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn failing_hosts(hosts: &[&str]) -> Self {
        Self {
            failing: Arc::new(hosts.iter().map(|h| h.to_string()).collect()),
            ..Self::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn attempts_for(&self, device: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(device)
            .copied()
            .unwrap_or(0)
    }
}

impl QueryTransport for ScriptedTransport {
    async fn query(
        &self,
        device: &DeviceConfig,
        _oids: &[Oid<'static>],
    ) -> anyhow::Result<QueryResponse> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(device.name.clone())
            .or_insert(0) += 1;

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(&device.host) {
            return Err(anyhow!("no response before timeout"));
        }

        Ok(QueryResponse {
            error_status: 0,
            error_index: 0,
            values: vec![
                format!("{}-sys", device.name),
                "Linux 5.10".to_string(),
                "12".to_string(),
            ],
        })
    }
}

fn device(name: &str, output: &Path, poll_interval_secs: u64) -> DeviceConfig {
    DeviceConfig {
        name: name.to_string(),
        host: name.to_string(),
        port: 161,
        community: "public".to_string(),
        output: output.to_path_buf(),
        poll_interval_secs,
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn sink_accumulates_one_row_per_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("router1.csv");

    let transport = ScriptedTransport::new();
    let mut registry = Registry::new(transport.clone());
    registry.add(device("router1", &output, 1));

    let handle = registry.handle();
    let runner = tokio::spawn(registry.start());

    tokio::time::sleep(Duration::from_millis(2300)).await;
    handle.stop();
    tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let attempts = transport.attempts_for("router1");
    assert!(attempts >= 2, "expected at least two cycles, got {attempts}");

    let lines = read_lines(&output);
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.len(), 1 + attempts);
    for row in &lines[1..] {
        assert_eq!(row.split(',').count(), 4);
        assert!(row.ends_with(",router1-sys,Linux 5.10,12"), "row: {row}");
    }
}

#[tokio::test]
async fn concurrent_devices_write_independent_sinks() {
    let dir = tempfile::tempdir().unwrap();
    let out_a = dir.path().join("a.csv");
    let out_b = dir.path().join("b.csv");

    let transport = ScriptedTransport::new();
    let mut registry = Registry::new(transport.clone());
    registry.add(device("alpha", &out_a, 1));
    registry.add(device("beta", &out_b, 1));

    let handle = registry.handle();
    let runner = tokio::spawn(registry.start());

    tokio::time::sleep(Duration::from_millis(2300)).await;
    handle.stop();
    tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    for (name, output) in [("alpha", &out_a), ("beta", &out_b)] {
        let attempts = transport.attempts_for(name);
        assert!(attempts >= 2);

        let lines = read_lines(output);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 1 + attempts);
        for row in &lines[1..] {
            // No cross-device bleed: every row belongs to this device.
            assert!(row.contains(&format!(",{name}-sys,")), "row: {row}");
        }
    }
}

#[tokio::test]
async fn transport_failure_skips_cycles_but_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let out_flaky = dir.path().join("flaky.csv");
    let out_steady = dir.path().join("steady.csv");

    let transport = ScriptedTransport::failing_hosts(&["flaky"]);
    let mut registry = Registry::new(transport.clone());
    registry.add(device("flaky", &out_flaky, 1));
    registry.add(device("steady", &out_steady, 1));

    let handle = registry.handle();
    let runner = tokio::spawn(registry.start());

    tokio::time::sleep(Duration::from_millis(2300)).await;
    handle.stop();
    tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    // The flaky device kept being polled, but never produced a row.
    assert!(transport.attempts_for("flaky") >= 2);
    assert_eq!(read_lines(&out_flaky), vec![HEADER.to_string()]);

    // Its failures did not disturb the healthy device.
    let steady_lines = read_lines(&out_steady);
    assert_eq!(steady_lines.len(), 1 + transport.attempts_for("steady"));
    assert!(steady_lines.len() > 1);
}

#[tokio::test]
async fn stop_waits_for_in_flight_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("slow.csv");

    let transport = ScriptedTransport::new().with_delay(Duration::from_millis(700));
    let mut registry = Registry::new(transport.clone());
    registry.add(device("slow", &output, 1));

    let handle = registry.handle();
    let runner = tokio::spawn(registry.start());

    // Second cycle starts at ~1.0s and is still in flight at 1.5s.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    handle.stop();
    tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    // The in-flight cycle finished and its row was persisted before start()
    // returned; nothing was cut short and nothing extra ran.
    let attempts = transport.attempts_for("slow");
    assert_eq!(attempts, 2);
    assert_eq!(read_lines(&output).len(), 1 + attempts);
}

#[tokio::test]
async fn pre_cancelled_poller_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("idle.csv");

    let transport = ScriptedTransport::new();
    let collector = Collector::new(transport.clone()).unwrap();
    let sink = CsvSink::create(&output).await.unwrap();
    let poller = DevicePoller::new(device("idle", &output, 1), collector, sink)
        .with_period(Duration::from_millis(50));

    let cancel = CancellationToken::new();
    cancel.cancel();
    poller.run(cancel).await.unwrap();

    assert_eq!(transport.attempts_for("idle"), 0);
    assert_eq!(read_lines(&output), vec![HEADER.to_string()]);
}
