// SPDX-License-Identifier: MPL-2.0

//! Discovery of the device's display resources.

use kms_uapi::ioctl_defs::{DrmIoctlModeGetResources, DrmModeGetResources};
use log::debug;

use crate::{
    device::KmsDevice,
    error::{Error, Result},
};

pub mod connector;
pub mod crtc;
pub mod encoder;
pub mod path;

/// Snapshot of the connectors, encoders and CRTCs a device exposes.
///
/// The identifiers are only meaningful for the device they were read from
/// and go stale on hotplug, which is not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    fbs: Vec<u32>,
    crtcs: Vec<u32>,
    connectors: Vec<u32>,
    encoders: Vec<u32>,

    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl ResourceSet {
    /// Connector ids, in the order the driver reported them.
    pub fn connectors(&self) -> &[u32] {
        &self.connectors
    }

    pub fn encoders(&self) -> &[u32] {
        &self.encoders
    }

    pub fn crtcs(&self) -> &[u32] {
        &self.crtcs
    }

    pub fn framebuffers(&self) -> &[u32] {
        &self.fbs
    }

    /// Whether a `width` x `height` framebuffer is within the device limits.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        (self.min_width..=self.max_width).contains(&width)
            && (self.min_height..=self.max_height).contains(&height)
    }
}

/// Reads the device's display resources.
pub fn get_resources<D: KmsDevice>(dev: &D) -> Result<ResourceSet> {
    const REQUEST: &str = "MODE_GETRESOURCES";

    let mut user_data = DrmModeGetResources::default();
    dev.ioctl::<DrmIoctlModeGetResources>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    let mut fbs = vec![0u32; user_data.count_fbs as usize];
    let mut crtcs = vec![0u32; user_data.count_crtcs as usize];
    let mut connectors = vec![0u32; user_data.count_connectors as usize];
    let mut encoders = vec![0u32; user_data.count_encoders as usize];

    user_data.fb_id_ptr = array_ptr(&mut fbs);
    user_data.crtc_id_ptr = array_ptr(&mut crtcs);
    user_data.connector_id_ptr = array_ptr(&mut connectors);
    user_data.encoder_id_ptr = array_ptr(&mut encoders);

    dev.ioctl::<DrmIoctlModeGetResources>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    // The kernel leaves an array untouched when it no longer fits, so a
    // count that grew between the two calls means the snapshot is torn.
    for (array, count) in [
        (&mut fbs, user_data.count_fbs),
        (&mut crtcs, user_data.count_crtcs),
        (&mut connectors, user_data.count_connectors),
        (&mut encoders, user_data.count_encoders),
    ] {
        if count as usize > array.len() {
            return Err(Error::query(REQUEST, resources_changed()));
        }
        array.truncate(count as usize);
    }

    debug!(
        "drm: {} connectors, {} encoders, {} crtcs, {} fbs",
        connectors.len(),
        encoders.len(),
        crtcs.len(),
        fbs.len()
    );

    Ok(ResourceSet {
        fbs,
        crtcs,
        connectors,
        encoders,
        min_width: user_data.min_width,
        max_width: user_data.max_width,
        min_height: user_data.min_height,
        max_height: user_data.max_height,
    })
}

/// Releases a resource snapshot.
pub fn free_resources(resources: ResourceSet) {
    drop(resources);
}

pub(crate) fn resources_changed() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Interrupted,
        "display resources changed while being read",
    )
}

/// Address of a request array as the kernel expects it, 0 when empty.
pub(crate) fn array_ptr<T>(array: &mut [T]) -> u64 {
    if array.is_empty() {
        0
    } else {
        array.as_mut_ptr() as u64
    }
}
