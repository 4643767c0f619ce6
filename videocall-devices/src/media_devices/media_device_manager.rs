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

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::device_registry::{Authorization, DeviceList, DeviceRegistry};
use super::selection_store::{SelectionStore, StoredSelection};
use crate::constants::{DEFAULT_DEVICE_ID, UNRECOGNIZED_LABEL_PREFIX};
use crate::device::{DeviceKind, MediaDevice};
use crate::error::DeviceError;
use crate::event_bus::{EventBus, Subscription};
use crate::events::{DeviceEvent, DeviceEventKind};
use crate::options::DeviceManagerOptions;
use crate::platform;
use crate::source::DeviceSource;
use crate::storage::KeyValueStorage;

/// The active device id of every category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSelection {
    pub microphone: String,
    pub speaker: String,
    pub camera: String,
}

impl Default for ActiveSelection {
    fn default() -> Self {
        Self {
            microphone: DEFAULT_DEVICE_ID.to_string(),
            speaker: DEFAULT_DEVICE_ID.to_string(),
            camera: DEFAULT_DEVICE_ID.to_string(),
        }
    }
}

impl ActiveSelection {
    pub fn get(&self, kind: DeviceKind) -> &str {
        match kind {
            DeviceKind::Microphone => &self.microphone,
            DeviceKind::Speaker => &self.speaker,
            DeviceKind::Camera => &self.camera,
        }
    }

    pub fn set(&mut self, kind: DeviceKind, device_id: String) {
        match kind {
            DeviceKind::Microphone => self.microphone = device_id,
            DeviceKind::Speaker => self.speaker = device_id,
            DeviceKind::Camera => self.camera = device_id,
        }
    }
}

/// Everything a UI needs to render device pickers: the lists and the active ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub microphones: DeviceList,
    pub speakers: DeviceList,
    pub cameras: DeviceList,
    pub active_microphone: String,
    pub active_speaker: String,
    pub active_camera: String,
}

impl DeviceSnapshot {
    fn new(registry: &DeviceRegistry, active: &ActiveSelection) -> Self {
        Self {
            microphones: registry.microphones.clone(),
            speakers: registry.speakers.clone(),
            cameras: registry.cameras.clone(),
            active_microphone: active.microphone.clone(),
            active_speaker: active.speaker.clone(),
            active_camera: active.camera.clone(),
        }
    }

    pub fn list(&self, kind: DeviceKind) -> &DeviceList {
        match kind {
            DeviceKind::Microphone => &self.microphones,
            DeviceKind::Speaker => &self.speakers,
            DeviceKind::Camera => &self.cameras,
        }
    }

    pub fn active(&self, kind: DeviceKind) -> &str {
        match kind {
            DeviceKind::Microphone => &self.active_microphone,
            DeviceKind::Speaker => &self.active_speaker,
            DeviceKind::Camera => &self.active_camera,
        }
    }

    /// The active device of `kind`, if it is in the list.
    pub fn active_device(&self, kind: DeviceKind) -> Option<&MediaDevice> {
        self.list(kind).get(self.active(kind))
    }
}

/// Pick the active id of one category after a rebuild.
///
/// In order: the stored choice if its device is present (or, with `match_stored_label`,
/// a device carrying the stored label), then the previously active id if still present,
/// then the first id of the list. The list always holds `"default"`, so the last step
/// cannot come up empty.
pub fn reconcile_active(
    list: &DeviceList,
    stored: Option<&StoredSelection>,
    previous: &str,
    match_stored_label: bool,
) -> String {
    if let Some(stored) = stored {
        if list.contains(&stored.device_id) {
            return stored.device_id.clone();
        }
        // Placeholder labels say nothing about the device, so never match on them.
        if match_stored_label
            && !stored.label.is_empty()
            && !stored.label.starts_with(UNRECOGNIZED_LABEL_PREFIX)
        {
            if let Some(device) = list.find_by_label(&stored.label) {
                debug!(
                    "stored {} {:?} reappeared as {:?}",
                    device.kind, stored.device_id, device.device_id
                );
                return device.device_id.clone();
            }
        }
    }
    if list.contains(previous) {
        return previous.to_string();
    }
    list.first_id().unwrap_or(DEFAULT_DEVICE_ID).to_string()
}

struct ManagerState {
    registry: DeviceRegistry,
    active: ActiveSelection,
    authorization: Authorization,
    init_complete: bool,
    permission_hint_subscription: Option<Subscription>,
}

struct Inner {
    source: Rc<dyn DeviceSource>,
    store: SelectionStore,
    options: DeviceManagerOptions,
    bus: EventBus,
    state: RefCell<ManagerState>,
}

/// Result of one enumeration cycle.
struct Cycle {
    snapshot: DeviceSnapshot,
    newly_authorized: bool,
    error: Option<DeviceError>,
}

/// [MediaDeviceManager] keeps the list of microphones, speakers and cameras in sync with
/// the platform and decides which device of each category is active.
///
/// It does *not* switch devices on the capture pipeline itself; the calling app listens
/// for [`DeviceEvent`]s and forwards the active ids to its encoders.
///
/// Outline of usage is:
///
/// ```no_run
/// # use std::rc::Rc;
/// # use videocall_devices::*;
/// # async fn run(source: Rc<dyn DeviceSource>, storage: Rc<dyn KeyValueStorage>) {
/// let manager = MediaDeviceManager::new(source, storage, DeviceManagerOptions::default());
/// let _subscription = manager.on(DeviceEventKind::DevicesChanged, |event| {
///     // re-render the device pickers
/// });
///
/// manager.init().await;
///
/// let snapshot = manager.snapshot();
/// let microphones: Vec<_> = snapshot.microphones.iter().collect();
/// manager.manually_select_microphone(&microphones[1].device_id).ok();
/// # }
/// ```
///
/// Cloning yields another handle to the same manager. State is single-threaded
/// (`Rc`/`RefCell`); background cycles are spawned with [`platform::spawn_local`].
#[derive(Clone)]
pub struct MediaDeviceManager {
    inner: Rc<Inner>,
}

impl MediaDeviceManager {
    pub fn new(
        source: Rc<dyn DeviceSource>,
        storage: Rc<dyn KeyValueStorage>,
        options: DeviceManagerOptions,
    ) -> Self {
        let (registry, _) = DeviceRegistry::build(&[], &options.default_device_label);
        let store = SelectionStore::new(storage, options.strict_selection);
        Self {
            inner: Rc::new(Inner {
                source,
                store,
                options,
                bus: EventBus::new(),
                state: RefCell::new(ManagerState {
                    registry,
                    active: ActiveSelection::default(),
                    authorization: Authorization::default(),
                    init_complete: false,
                    permission_hint_subscription: None,
                }),
            }),
        }
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Subscribe to device changes, run the first enumeration and report it.
    ///
    /// Emits [`DeviceEvent::InitSucceeded`] or [`DeviceEvent::InitFailed`]; either way the
    /// manager is initialized afterwards and keeps following device changes. Calling it
    /// again re-subscribes and re-enumerates.
    ///
    /// # Panics
    ///
    /// On native targets, device-change notifications and permission hints received after
    /// `init` spawn their cycles with [`platform::spawn_local`], which panics unless the
    /// notifying code runs inside a `tokio::task::LocalSet`.
    pub async fn init(&self) {
        info!("initializing media device manager");
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .source
            .set_device_change_handler(Rc::new(move || {
                if let Some(manager) = Self::upgrade(&weak) {
                    debug!("device change reported, re-enumerating");
                    platform::spawn_local(async move {
                        manager.refresh().await;
                    });
                }
            }));

        let cycle = self.run_cycle().await;
        self.inner.state.borrow_mut().init_complete = true;
        match cycle.error {
            None => {
                info!(
                    "media devices ready: {} microphones, {} speakers, {} cameras",
                    cycle.snapshot.microphones.len(),
                    cycle.snapshot.speakers.len(),
                    cycle.snapshot.cameras.len()
                );
                self.inner.bus.emit(DeviceEvent::InitSucceeded(cycle.snapshot));
            }
            Some(e) => {
                error!("media device initialization failed: {e}");
                self.inner.bus.emit(DeviceEvent::InitFailed(e.to_string()));
            }
        }

        let weak = Rc::downgrade(&self.inner);
        let subscription = self
            .inner
            .bus
            .on(DeviceEventKind::PermissionHint, move |_| {
                if let Some(manager) = Self::upgrade(&weak) {
                    platform::spawn_local(async move {
                        manager.handle_permission_hint().await;
                    });
                }
            });
        let previous = self
            .inner
            .state
            .borrow_mut()
            .permission_hint_subscription
            .replace(subscription);
        if let Some(previous) = previous {
            self.inner.bus.off(&previous);
        }
    }

    /// Re-enumerate and emit [`DeviceEvent::DevicesChanged`].
    ///
    /// This is what a platform device-change notification triggers. A failing query is
    /// logged and treated as an empty device list.
    pub async fn refresh(&self) -> DeviceSnapshot {
        let cycle = self.run_cycle().await;
        self.inner
            .bus
            .emit(DeviceEvent::DevicesChanged(cycle.snapshot.clone()));
        cycle.snapshot
    }

    /// Announce that access permission may just have been granted.
    ///
    /// After [`init`](Self::init) this schedules [`handle_permission_hint`](Self::handle_permission_hint).
    ///
    /// # Panics
    ///
    /// On native targets, after `init`, when not called from within a `tokio::task::LocalSet`.
    pub fn notify_permission_granted(&self) {
        self.inner.bus.emit(DeviceEvent::PermissionHint);
    }

    /// Re-enumerate while microphone or camera access is still unconfirmed.
    ///
    /// Emits [`DeviceEvent::DevicesChanged`] and returns `true` only if the enumeration
    /// confirmed a permission that was not confirmed before.
    pub async fn handle_permission_hint(&self) -> bool {
        if self.authorization().all_granted() {
            return false;
        }
        let cycle = self.run_cycle().await;
        if cycle.newly_authorized {
            self.inner.bus.emit(DeviceEvent::DevicesChanged(cycle.snapshot));
            true
        } else {
            false
        }
    }

    async fn run_cycle(&self) -> Cycle {
        let enumeration = self
            .inner
            .source
            .enumerate_devices(self.inner.options.request_permission);
        let (raw, error) = match enumeration.await {
            Ok(raw) => (raw, None),
            Err(e) => {
                error!("device enumeration failed: {e}");
                (Vec::new(), Some(e))
            }
        };
        let devices: Vec<MediaDevice> = raw
            .into_iter()
            .filter_map(|raw| match MediaDevice::try_from(raw) {
                Ok(device) => Some(device),
                Err(e) => {
                    debug!("{e}");
                    None
                }
            })
            .collect();
        let (snapshot, newly_authorized) = self.apply(&devices);
        Cycle {
            snapshot,
            newly_authorized,
            error,
        }
    }

    /// Rebuild the registry and reconcile the active ids in one synchronous step.
    fn apply(&self, devices: &[MediaDevice]) -> (DeviceSnapshot, bool) {
        let options = &self.inner.options;
        let (registry, seen) = DeviceRegistry::build(devices, &options.default_device_label);

        let mut state = self.inner.state.borrow_mut();
        let mut active = ActiveSelection::default();
        for kind in DeviceKind::ALL {
            let stored = self.inner.store.get(kind);
            let device_id = reconcile_active(
                registry.list(kind),
                stored.as_ref(),
                state.active.get(kind),
                options.match_stored_label,
            );
            if device_id != state.active.get(kind) {
                debug!("active {kind} is now {device_id:?}");
            }
            active.set(kind, device_id);
        }

        let before = state.authorization;
        let after = before.merge(seen);
        let newly_authorized =
            (!before.microphone && after.microphone) || (!before.camera && after.camera);

        state.registry = registry;
        state.active = active;
        state.authorization = after;
        (DeviceSnapshot::new(&state.registry, &state.active), newly_authorized)
    }

    /// Make `device_id` the active `kind` and remember it across sessions.
    ///
    /// An explicit choice always wins over reconciliation. If the device is not in the
    /// current list the selection is not persisted; with
    /// [`strict_selection`](DeviceManagerOptions::strict_selection) the call fails and
    /// nothing changes, otherwise the in-memory selection is still updated and
    /// [`DeviceEvent::ManuallySelected`] is emitted.
    pub fn manually_select(&self, kind: DeviceKind, device_id: &str) -> Result<(), DeviceError> {
        let persisted = {
            let state = self.inner.state.borrow();
            self.inner.store.set(kind, device_id, &state.registry)
        };
        if let Err(e) = persisted {
            warn!("manual {kind} selection rejected: {e}");
            return Err(e);
        }

        self.inner
            .state
            .borrow_mut()
            .active
            .set(kind, device_id.to_string());
        info!("{kind} {device_id:?} selected manually");
        self.inner.bus.emit(DeviceEvent::ManuallySelected {
            kind,
            device_id: device_id.to_string(),
        });
        Ok(())
    }

    pub fn manually_select_microphone(&self, device_id: &str) -> Result<(), DeviceError> {
        self.manually_select(DeviceKind::Microphone, device_id)
    }

    pub fn manually_select_speaker(&self, device_id: &str) -> Result<(), DeviceError> {
        self.manually_select(DeviceKind::Speaker, device_id)
    }

    pub fn manually_select_camera(&self, device_id: &str) -> Result<(), DeviceError> {
        self.manually_select(DeviceKind::Camera, device_id)
    }

    /// Resolves with the current snapshot once initialization has completed.
    ///
    /// Returns immediately if [`init`](Self::init) already ran (whatever its outcome),
    /// otherwise waits for the next init-succeeded / init-failed event.
    pub async fn watch_init_complete(&self) -> Result<DeviceSnapshot, DeviceError> {
        if self.is_init_complete() {
            return Ok(self.snapshot());
        }

        let (sender, receiver) = oneshot::channel();
        let sender = Rc::new(RefCell::new(Some(sender)));
        let on_success = {
            let sender = sender.clone();
            self.on(DeviceEventKind::InitSucceeded, move |event| {
                if let (Some(sender), Some(snapshot)) = (sender.borrow_mut().take(), event.snapshot()) {
                    let _ = sender.send(Ok(snapshot.clone()));
                }
            })
        };
        let on_failure = self.on(DeviceEventKind::InitFailed, move |event| {
            if let (Some(sender), DeviceEvent::InitFailed(message)) = (sender.borrow_mut().take(), event) {
                let _ = sender.send(Err(DeviceError::InitFailed(message.clone())));
            }
        });

        // Both senders live in handlers owned by the bus, which outlives this borrow.
        let result = receiver
            .await
            .unwrap_or_else(|_| {
                Err(DeviceError::InitFailed(
                    "init event channel closed".to_string(),
                ))
            });
        self.off(&on_success);
        self.off(&on_failure);
        result
    }

    /// The current lists and active ids.
    pub fn snapshot(&self) -> DeviceSnapshot {
        let state = self.inner.state.borrow();
        DeviceSnapshot::new(&state.registry, &state.active)
    }

    pub fn active(&self, kind: DeviceKind) -> String {
        self.inner.state.borrow().active.get(kind).to_string()
    }

    /// The persisted choice for `kind`, if any.
    pub fn stored_selection(&self, kind: DeviceKind) -> Option<StoredSelection> {
        self.inner.store.get(kind)
    }

    /// Forget the persisted choice for `kind`. The active device is left as is.
    pub fn clear_stored_selection(&self, kind: DeviceKind) -> Result<(), DeviceError> {
        self.inner.store.clear(kind)
    }

    pub fn is_init_complete(&self) -> bool {
        self.inner.state.borrow().init_complete
    }

    pub fn authorization(&self) -> Authorization {
        self.inner.state.borrow().authorization
    }

    pub fn options(&self) -> &DeviceManagerOptions {
        &self.inner.options
    }

    pub(crate) fn source(&self) -> Rc<dyn DeviceSource> {
        Rc::clone(&self.inner.source)
    }

    pub fn on<F>(&self, kind: DeviceEventKind, handler: F) -> Subscription
    where
        F: Fn(&DeviceEvent) + 'static,
    {
        self.inner.bus.on(kind, handler)
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.inner.bus.off(subscription)
    }

    /// Receive every event asynchronously.
    pub fn subscribe(&self) -> async_broadcast::Receiver<DeviceEvent> {
        self.inner.bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }
}
