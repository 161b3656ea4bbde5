//! Operator command grammar.
//!
//! Requests are single-line ASCII with a case-insensitive verb:
//!
//! - `GET HEALTH` → `HEALTH OK|DEGRADED|ERROR`
//! - `GET STATS`  → a `STATS` header line plus one `k=v` line per counter
//! - `SET KEY=VALUE` → `OK KEY=VALUE` or an `ERR …` reply
//!
//! `SET LOG_LEVEL` reconfigures the journal and `SET CRC` flips the shared
//! CRC policy; any other key lands in the process-local settings map. Keys
//! are uppercased, key and value are whitespace-trimmed. Errors reply with
//! `ERR …` and leave the connection open.
//!
//! A handler instance is owned by one client thread; the pieces it touches
//! (stats, journal, CRC flag, settings map) are the shared ones.

use crate::events::Severity;
use crate::journal::Journal;
use crate::stats::StatsRegistry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mutable runtime settings shared by every control connection.
pub struct ControlState {
    pub stats: Arc<StatsRegistry>,
    pub journal: Arc<Journal>,
    pub crc_policy: Arc<AtomicBool>,
    settings: Mutex<HashMap<String, String>>,
}

impl ControlState {
    pub fn new(
        stats: Arc<StatsRegistry>,
        journal: Arc<Journal>,
        crc_policy: Arc<AtomicBool>,
    ) -> Self {
        Self { stats, journal, crc_policy, settings: Mutex::new(HashMap::new()) }
    }

    /// Look up a stored setting (uppercased key).
    pub fn setting(&self, key: &str) -> Option<String> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn store_setting(&self, key: String, value: String) {
        self.settings.lock().unwrap_or_else(|e| e.into_inner()).insert(key, value);
    }
}

/// Parses one request at a time and renders the reply.
pub struct CommandHandler {
    state: Arc<ControlState>,
}

impl CommandHandler {
    pub fn new(state: Arc<ControlState>) -> Self {
        Self { state }
    }

    /// Whether the CRC policy is currently enabled.
    pub fn crc_enabled(&self) -> bool {
        self.state.crc_policy.load(Ordering::SeqCst)
    }

    /// Process one request line and produce the reply.
    pub fn handle(&mut self, command: &str) -> String {
        if command.is_empty() {
            return "ERR EMPTY_COMMAND".to_string();
        }

        let mut parts = command.trim_start().splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();
        let rest = parts.next().unwrap_or("").trim_start();

        match verb.as_str() {
            "GET" => self.handle_get(rest),
            "SET" => self.handle_set(rest),
            _ => "ERR UNKNOWN_COMMAND".to_string(),
        }
    }

    fn handle_get(&self, args: &str) -> String {
        match args.trim().to_ascii_uppercase().as_str() {
            "HEALTH" => format!("HEALTH {}", self.state.stats.health()),
            "STATS" => {
                let g = self.state.stats.global();
                format!(
                    "STATS\n\
                     rx_total={}\n\
                     malformed_total={}\n\
                     gap_total={}\n\
                     reorder_total={}\n\
                     duplicate_total={}\n\
                     crc_fail_total={}",
                    g.rx_total,
                    g.malformed_total,
                    g.gap_total,
                    g.reorder_total,
                    g.duplicate_total,
                    g.crc_fail_total
                )
            }
            _ => "ERR UNKNOWN_COMMAND".to_string(),
        }
    }

    fn handle_set(&mut self, args: &str) -> String {
        let Some((raw_key, raw_value)) = args.split_once('=') else {
            return "ERR INVALID_SET_SYNTAX".to_string();
        };
        let key = raw_key.trim().to_ascii_uppercase();
        let value = raw_value.trim();

        match key.as_str() {
            "LOG_LEVEL" => {
                let upper = value.to_ascii_uppercase();
                match Severity::parse(&upper) {
                    Some(level) => {
                        self.state.journal.set_level(level);
                        self.state.store_setting(key, upper.clone());
                        format!("OK LOG_LEVEL={upper}")
                    }
                    None => "ERR INVALID_LOG_LEVEL".to_string(),
                }
            }
            "CRC" => match value.to_ascii_uppercase().as_str() {
                "ON" => {
                    self.state.crc_policy.store(true, Ordering::SeqCst);
                    self.state.store_setting(key, "ON".to_string());
                    "OK CRC=ON".to_string()
                }
                "OFF" => {
                    self.state.crc_policy.store(false, Ordering::SeqCst);
                    self.state.store_setting(key, "OFF".to_string());
                    "OK CRC=OFF".to_string()
                }
                _ => "ERR INVALID_CRC_VALUE".to_string(),
            },
            _ => {
                let reply = format!("OK {key}={value}");
                self.state.store_setting(key, value.to_string());
                reply
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> (CommandHandler, Arc<ControlState>) {
        let state = Arc::new(ControlState::new(
            Arc::new(StatsRegistry::new()),
            Arc::new(Journal::with_output(Box::new(std::io::sink()))),
            Arc::new(AtomicBool::new(true)),
        ));
        (CommandHandler::new(Arc::clone(&state)), state)
    }

    #[test]
    fn empty_command() {
        let (mut handler, _) = handler();
        assert_eq!(handler.handle(""), "ERR EMPTY_COMMAND");
    }

    #[test]
    fn unknown_verb() {
        let (mut handler, _) = handler();
        assert_eq!(handler.handle("PING"), "ERR UNKNOWN_COMMAND");
        assert_eq!(handler.handle("GET WEATHER"), "ERR UNKNOWN_COMMAND");
    }

    #[test]
    fn get_health_reflects_stats() {
        let (mut handler, state) = handler();
        assert_eq!(handler.handle("GET HEALTH"), "HEALTH OK");

        state.stats.record_gap(1, 2);
        assert_eq!(handler.handle("GET HEALTH"), "HEALTH DEGRADED");

        state.stats.record_malformed(1);
        assert_eq!(handler.handle("GET HEALTH"), "HEALTH ERROR");
    }

    #[test]
    fn verbs_are_case_insensitive() {
        let (mut handler, _) = handler();
        assert_eq!(handler.handle("get health"), "HEALTH OK");
        assert_eq!(handler.handle("Get Stats").lines().next(), Some("STATS"));
    }

    #[test]
    fn get_stats_lists_every_counter() {
        let (mut handler, state) = handler();
        state.stats.record_rx(1, 0, 0);
        state.stats.record_rx(1, 1, 0);
        state.stats.record_gap(1, 3);
        state.stats.record_crc_fail(1);

        let reply = handler.handle("GET STATS");
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(
            lines,
            vec![
                "STATS",
                "rx_total=2",
                "malformed_total=0",
                "gap_total=3",
                "reorder_total=0",
                "duplicate_total=0",
                "crc_fail_total=1",
            ]
        );
    }

    #[test]
    fn set_log_level() {
        let (mut handler, state) = handler();
        assert_eq!(handler.handle("SET LOG_LEVEL=DEBUG"), "OK LOG_LEVEL=DEBUG");
        assert_eq!(state.journal.level(), Severity::Debug);

        // Value is case-folded before validation.
        assert_eq!(handler.handle("SET log_level=warn"), "OK LOG_LEVEL=WARN");
        assert_eq!(state.journal.level(), Severity::Warn);

        assert_eq!(handler.handle("SET LOG_LEVEL=LOUD"), "ERR INVALID_LOG_LEVEL");
        assert_eq!(state.journal.level(), Severity::Warn);
    }

    #[test]
    fn set_crc_toggles_shared_policy() {
        let (mut handler, state) = handler();
        assert!(handler.crc_enabled());

        assert_eq!(handler.handle("SET CRC=OFF"), "OK CRC=OFF");
        assert!(!state.crc_policy.load(Ordering::SeqCst));

        assert_eq!(handler.handle("SET CRC=on"), "OK CRC=ON");
        assert!(state.crc_policy.load(Ordering::SeqCst));

        assert_eq!(handler.handle("SET CRC=MAYBE"), "ERR INVALID_CRC_VALUE");
        assert!(state.crc_policy.load(Ordering::SeqCst));
    }

    #[test]
    fn set_generic_key_stores_trimmed_value() {
        let (mut handler, state) = handler();
        assert_eq!(handler.handle("SET  station_name =  north-ridge "), "OK STATION_NAME=north-ridge");
        assert_eq!(state.setting("STATION_NAME").as_deref(), Some("north-ridge"));
    }

    #[test]
    fn set_without_equals() {
        let (mut handler, _) = handler();
        assert_eq!(handler.handle("SET CRC ON"), "ERR INVALID_SET_SYNTAX");
    }

    #[test]
    fn settings_map_is_shared_between_handlers() {
        let (mut first, state) = handler();
        first.handle("SET MODE=night");
        let mut second = CommandHandler::new(Arc::clone(&state));
        assert_eq!(second.handle("SET MODE=day"), "OK MODE=day");
        assert_eq!(state.setting("MODE").as_deref(), Some("day"));
    }
}
