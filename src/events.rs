//! Category-filtered event pub/sub.
//!
//! The bus fans one [`EventRecord`] out to every matching subscriber,
//! synchronously in the publisher's thread. The subscriber list lives behind
//! a mutex, but matching callbacks are copied out and invoked *after* the
//! lock is released, so a callback may subscribe, unsubscribe or publish
//! without deadlocking.

use std::sync::{Arc, Mutex};

/// Event identifiers, grouped by the 0x0X00 category blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventId {
    TrackNew = 0x0100,
    TrackUpdate = 0x0101,
    TrackLost = 0x0102,
    TrackClassify = 0x0103,
    ThreatEval = 0x0200,
    ThreatCritical = 0x0201,
    IffResponse = 0x0300,
    IffFoe = 0x0301,
    EngageStart = 0x0400,
    EngageCease = 0x0401,
    WeaponStatus = 0x0402,
    AmmoLow = 0x0403,
    SeqGap = 0x0500,
    SeqReorder = 0x0501,
    FrameMalformed = 0x0502,
    CrcFail = 0x0503,
    SourceOnline = 0x0504,
    SourceTimeout = 0x0505,
    HeartbeatOk = 0x0600,
    HeartbeatDegrade = 0x0601,
    HeartbeatError = 0x0602,
    ConfigChange = 0x0700,
}

impl EventId {
    /// Wire/journal spelling of the event name.
    pub fn name(self) -> &'static str {
        match self {
            EventId::TrackNew => "EVT_TRACK_NEW",
            EventId::TrackUpdate => "EVT_TRACK_UPDATE",
            EventId::TrackLost => "EVT_TRACK_LOST",
            EventId::TrackClassify => "EVT_TRACK_CLASSIFY",
            EventId::ThreatEval => "EVT_THREAT_EVAL",
            EventId::ThreatCritical => "EVT_THREAT_CRITICAL",
            EventId::IffResponse => "EVT_IFF_RESPONSE",
            EventId::IffFoe => "EVT_IFF_FOE",
            EventId::EngageStart => "EVT_ENGAGE_START",
            EventId::EngageCease => "EVT_ENGAGE_CEASE",
            EventId::WeaponStatus => "EVT_WEAPON_STATUS",
            EventId::AmmoLow => "EVT_AMMO_LOW",
            EventId::SeqGap => "EVT_SEQ_GAP",
            EventId::SeqReorder => "EVT_SEQ_REORDER",
            EventId::FrameMalformed => "EVT_FRAME_MALFORMED",
            EventId::CrcFail => "EVT_CRC_FAIL",
            EventId::SourceOnline => "EVT_SOURCE_ONLINE",
            EventId::SourceTimeout => "EVT_SOURCE_TIMEOUT",
            EventId::HeartbeatOk => "EVT_HEARTBEAT_OK",
            EventId::HeartbeatDegrade => "EVT_HEARTBEAT_DEGRADE",
            EventId::HeartbeatError => "EVT_HEARTBEAT_ERROR",
            EventId::ConfigChange => "EVT_CONFIG_CHANGE",
        }
    }
}

/// Event categories used for subscription filtering and journal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Tracking,
    Threat,
    Iff,
    Engagement,
    Network,
    Health,
    Control,
}

impl EventCategory {
    /// Journal column, padded to exactly 10 characters.
    pub fn padded_label(self) -> &'static str {
        match self {
            EventCategory::Tracking => "TRACKING  ",
            EventCategory::Threat => "THREAT    ",
            EventCategory::Iff => "IFF       ",
            EventCategory::Engagement => "ENGAGEMENT",
            EventCategory::Network => "NETWORK   ",
            EventCategory::Health => "HEALTH    ",
            EventCategory::Control => "CONTROL   ",
        }
    }
}

/// Severity levels, ordered DEBUG < INFO < WARN < ALARM < ERROR < FATAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Alarm = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    /// Journal column, padded to exactly 5 characters.
    pub fn padded_label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO ",
            Severity::Warn => "WARN ",
            Severity::Alarm => "ALARM",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse a severity name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ALARM" => Some(Severity::Alarm),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }
}

/// One published event.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub id: EventId,
    pub category: EventCategory,
    pub severity: Severity,
    pub timestamp_ns: u64,
    pub detail: String,
}

/// Subscriber callback. Invoked synchronously, outside any bus lock.
pub type EventCallback = Arc<dyn Fn(&EventRecord) + Send + Sync>;

struct Subscription {
    id: u32,
    category: Option<EventCategory>,
    callback: EventCallback,
}

#[derive(Default)]
struct BusInner {
    subscriptions: Vec<Subscription>,
    next_id: u32,
}

/// Thread-safe fan-out of [`EventRecord`]s to category-filtered subscribers.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { inner: Mutex::new(BusInner { subscriptions: Vec::new(), next_id: 1 }) }
    }

    /// Subscribe to one category. Returns the subscription id.
    pub fn subscribe(&self, category: EventCategory, callback: EventCallback) -> u32 {
        self.register(Some(category), callback)
    }

    /// Subscribe to every category. Returns the subscription id.
    pub fn subscribe_all(&self, callback: EventCallback) -> u32 {
        self.register(None, callback)
    }

    fn register(&self, category: Option<EventCategory>, callback: EventCallback) -> u32 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscriptions.push(Subscription { id, category, callback });
        id
    }

    /// Remove a subscription. Unknown ids are a no-op.
    pub fn unsubscribe(&self, subscription_id: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscriptions.retain(|s| s.id != subscription_id);
    }

    /// Deliver `event` to every matching subscriber, in subscription order.
    pub fn publish(&self, event: &EventRecord) {
        let matching: Vec<EventCallback> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner
                .subscriptions
                .iter()
                .filter(|s| s.category.is_none() || s.category == Some(event.category))
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };
        for callback in matching {
            callback(event);
        }
    }
}
