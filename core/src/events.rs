//! Package lifecycle events.
//!
//! The manager emits one event per state change so hosts can re-render,
//! persist, or log without polling. Dispatch is synchronous and in
//! subscription order; a slow listener slows the emitting call.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PackageEventKind {
    PackageRegistered,
    PackageUpdated,
    PackageUnregistered,
    PackageLoaded,
    PackageValidated,
    Error,
}

impl PackageEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageEventKind::PackageRegistered => "packageRegistered",
            PackageEventKind::PackageUpdated => "packageUpdated",
            PackageEventKind::PackageUnregistered => "packageUnregistered",
            PackageEventKind::PackageLoaded => "packageLoaded",
            PackageEventKind::PackageValidated => "packageValidated",
            PackageEventKind::Error => "error",
        }
    }
}

impl fmt::Display for PackageEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEvent {
    pub kind: PackageEventKind,
    /// Id of the package the event is about.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form context: a validation summary, an error message, the
    /// outcome of a load.
    pub detail: String,
}

impl PackageEvent {
    pub fn new(
        kind: PackageEventKind,
        id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        PackageEvent {
            kind,
            id: id.into(),
            timestamp: Utc::now(),
            detail: detail.into(),
        }
    }
}

/// Callback invoked for every emitted event.
pub type PackageListener = Box<dyn Fn(&PackageEvent) + Send>;

/// Token returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// Listener registry backing the manager's subscribe/unsubscribe surface.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(u64, PackageListener)>,
    next_handle: u64,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&PackageEvent) + Send + 'static) -> ListenerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.listeners.push((handle, Box::new(listener)));
        ListenerHandle(handle)
    }

    /// Removes a listener. Returns `false` when the handle was already
    /// removed, so double unsubscribe stays harmless.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != handle.0);
        self.listeners.len() != before
    }

    pub fn emit(&self, event: &PackageEvent) {
        log::trace!(
            "Event {kind} for '{id}': {detail}",
            kind = event.kind,
            id = event.id,
            detail = event.detail
        );
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
