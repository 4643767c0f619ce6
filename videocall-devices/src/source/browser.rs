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
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_utils::window;
use js_sys::Array;
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Event, MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream, MediaStreamConstraints,
    MediaStreamTrack,
};

use super::{DeviceChangeHandler, DeviceSource};
use crate::device::RawDeviceInfo;
use crate::error::DeviceError;

/// [`DeviceSource`] backed by `navigator.mediaDevices`.
#[derive(Clone, Default)]
pub struct BrowserDeviceSource {
    // The closure must outlive its registration as `ondevicechange`.
    device_change_closure: Rc<RefCell<Option<Closure<dyn FnMut(Event)>>>>,
}

impl BrowserDeviceSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn media_devices() -> Result<MediaDevices, DeviceError> {
        window()
            .navigator()
            .media_devices()
            .map_err(|e| DeviceError::Enumeration(format!("navigator.mediaDevices: {e:?}")))
    }

    async fn grant() -> Result<(), DeviceError> {
        let media_devices = Self::media_devices()?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::from_bool(true));
        constraints.set_video(&JsValue::from_bool(true));

        let promise = media_devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| DeviceError::PermissionDenied(format!("{e:?}")))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| DeviceError::PermissionDenied(format!("{e:?}")))?
            .unchecked_into::<MediaStream>();

        // Only the grant is needed; release the capture right away.
        for track in stream.get_tracks().iter() {
            track.unchecked_into::<MediaStreamTrack>().stop();
        }
        Ok(())
    }

    async fn enumerate(request_permission: bool) -> Result<Vec<RawDeviceInfo>, DeviceError> {
        if request_permission {
            Self::grant().await?;
        }
        let media_devices = Self::media_devices()?;
        let promise = media_devices
            .enumerate_devices()
            .map_err(|e| DeviceError::Enumeration(format!("{e:?}")))?;
        let devices = JsFuture::from(promise)
            .await
            .map_err(|e| DeviceError::Enumeration(format!("{e:?}")))?
            .unchecked_into::<Array>();

        let devices = devices
            .iter()
            .filter_map(|d| d.dyn_into::<MediaDeviceInfo>().ok())
            .filter_map(|info| {
                let kind = match info.kind() {
                    MediaDeviceKind::Audioinput => "audioinput",
                    MediaDeviceKind::Audiooutput => "audiooutput",
                    MediaDeviceKind::Videoinput => "videoinput",
                    _ => {
                        debug!("skipping device {} of unknown kind", info.device_id());
                        return None;
                    }
                };
                Some(RawDeviceInfo {
                    kind: kind.to_string(),
                    device_id: info.device_id(),
                    label: info.label(),
                    group_id: info.group_id(),
                })
            })
            .collect();
        Ok(devices)
    }
}

impl DeviceSource for BrowserDeviceSource {
    fn enumerate_devices(
        &self,
        request_permission: bool,
    ) -> LocalBoxFuture<'static, Result<Vec<RawDeviceInfo>, DeviceError>> {
        Box::pin(Self::enumerate(request_permission))
    }

    fn set_device_change_handler(&self, handler: DeviceChangeHandler) {
        let media_devices = match Self::media_devices() {
            Ok(media_devices) => media_devices,
            Err(e) => {
                log::error!("cannot listen for device changes: {e}");
                return;
            }
        };
        let closure = Closure::wrap(Box::new(move |_event: Event| handler()) as Box<dyn FnMut(Event)>);
        media_devices.set_ondevicechange(Some(closure.as_ref().unchecked_ref()));
        *self.device_change_closure.borrow_mut() = Some(closure);
    }

    fn request_permission(&self) -> LocalBoxFuture<'static, Result<(), DeviceError>> {
        Box::pin(Self::grant())
    }
}
