/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Notification bus owned by a [`MediaDeviceManager`](crate::MediaDeviceManager).
//!
//! Handlers registered with [`EventBus::on`] run synchronously, in registration order,
//! before [`EventBus::emit`] returns. Every event is also mirrored to a broadcast channel
//! so async consumers can [`subscribe`](EventBus::subscribe) the same way they subscribe to
//! client events.
//!
//! # Example
//!
//! ```
//! use videocall_devices::{DeviceEvent, DeviceEventKind, EventBus};
//!
//! let bus = EventBus::new();
//! let subscription = bus.on(DeviceEventKind::PermissionHint, |_event| {
//!     // re-enumerate
//! });
//! bus.emit(DeviceEvent::PermissionHint);
//! assert!(bus.off(&subscription));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender};

use crate::constants::EVENT_BUS_CAPACITY;
use crate::events::{DeviceEvent, DeviceEventKind};

type Handler = Rc<dyn Fn(&DeviceEvent)>;

/// Handle returned by [`EventBus::on`]; pass it to [`EventBus::off`] to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    kind: DeviceEventKind,
}

impl Subscription {
    pub fn kind(&self) -> DeviceEventKind {
        self.kind
    }
}

struct HandlerEntry {
    id: u64,
    kind: DeviceEventKind,
    handler: Handler,
}

struct BusInner {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<HandlerEntry>>,
    sender: Sender<DeviceEvent>,
    // Keeps the channel open while no async subscriber exists.
    _inactive: InactiveReceiver<DeviceEvent>,
}

/// A typed, single-threaded publish/subscribe channel.
///
/// Cloning the bus yields another handle to the same set of handlers.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (mut sender, receiver) = broadcast(EVENT_BUS_CAPACITY);
        sender.set_overflow(true);
        Self {
            inner: Rc::new(BusInner {
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
                sender,
                _inactive: receiver.deactivate(),
            }),
        }
    }

    /// Register `handler` for events of `kind`.
    pub fn on<F>(&self, kind: DeviceEventKind, handler: F) -> Subscription
    where
        F: Fn(&DeviceEvent) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push(HandlerEntry {
            id,
            kind,
            handler: Rc::new(handler),
        });
        Subscription { id, kind }
    }

    /// Remove the handler behind `subscription`. Returns `false` if it was already removed.
    pub fn off(&self, subscription: &Subscription) -> bool {
        let mut handlers = self.inner.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|entry| entry.id != subscription.id);
        handlers.len() != before
    }

    /// Dispatch `event` to every handler registered for its kind, then to async subscribers.
    ///
    /// The handler list is captured before dispatch: handlers added while dispatching
    /// only see later events, and handlers may call back into the bus.
    pub fn emit(&self, event: DeviceEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.handler))
            .collect();
        for handler in handlers {
            handler(&event);
        }
        // Err only when nobody is listening asynchronously.
        let _ = self.inner.sender.try_broadcast(event);
    }

    /// Subscribe to every future event asynchronously.
    pub fn subscribe(&self) -> Receiver<DeviceEvent> {
        self.inner.sender.new_receiver()
    }

    /// Number of handlers currently registered for `kind`.
    pub fn handler_count(&self, kind: DeviceEventKind) -> usize {
        self.inner
            .handlers
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;

    fn manual(id: &str) -> DeviceEvent {
        DeviceEvent::ManuallySelected {
            kind: DeviceKind::Camera,
            device_id: id.to_string(),
        }
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let calls = calls.clone();
            bus.on(DeviceEventKind::PermissionHint, move |_| calls.borrow_mut().push(n));
        }
        bus.emit(DeviceEvent::PermissionHint);
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_handlers_only_receive_their_kind() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        bus.on(DeviceEventKind::ManuallySelected, move |event| {
            assert!(matches!(event, DeviceEvent::ManuallySelected { .. }));
            hits_clone.set(hits_clone.get() + 1);
        });
        bus.emit(DeviceEvent::PermissionHint);
        bus.emit(DeviceEvent::InitFailed("boom".to_string()));
        bus.emit(manual("cam-1"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_off_removes_only_that_handler() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let a = {
            let hits = hits.clone();
            bus.on(DeviceEventKind::PermissionHint, move |_| hits.borrow_mut().push("a"))
        };
        {
            let hits = hits.clone();
            bus.on(DeviceEventKind::PermissionHint, move |_| hits.borrow_mut().push("b"));
        }
        assert!(bus.off(&a));
        assert!(!bus.off(&a));
        bus.emit(DeviceEvent::PermissionHint);
        assert_eq!(*hits.borrow(), vec!["b"]);
        assert_eq!(bus.handler_count(DeviceEventKind::PermissionHint), 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself_during_dispatch() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let subscription = {
            let bus = bus.clone();
            let hits = hits.clone();
            let slot = slot.clone();
            bus.clone().on(DeviceEventKind::PermissionHint, move |_| {
                hits.set(hits.get() + 1);
                if let Some(subscription) = slot.borrow_mut().take() {
                    bus.off(&subscription);
                }
            })
        };
        *slot.borrow_mut() = Some(subscription);
        bus.emit(DeviceEvent::PermissionHint);
        bus.emit(DeviceEvent::PermissionHint);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.emit(DeviceEvent::PermissionHint);
        bus.emit(manual("cam-1"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn test_async_subscriber_receives_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.emit(manual("cam-2"));
        match rx.recv().await.unwrap() {
            DeviceEvent::ManuallySelected { kind, device_id } => {
                assert_eq!(kind, DeviceKind::Camera);
                assert_eq!(device_id, "cam-2");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn test_async_subscriber_overflow_drops_oldest() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        for n in 0..(EVENT_BUS_CAPACITY + 1) {
            bus.emit(manual(&format!("cam-{n}")));
        }
        // The first receive reports the overflow, the next one yields the oldest kept event.
        let first = rx.recv().await;
        let event = match first {
            Err(async_broadcast::RecvError::Overflowed(_)) => rx.recv().await.unwrap(),
            Ok(event) => event,
            Err(e) => panic!("unexpected error {e:?}"),
        };
        match event {
            DeviceEvent::ManuallySelected { device_id, .. } => assert_eq!(device_id, "cam-1"),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
