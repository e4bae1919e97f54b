// SPDX-License-Identifier: MPL-2.0

use std::io;

use kms_uapi::ioctl_defs::{DrmIoctlModeSetCrtc, DrmModeCrtc};
use log::info;

use crate::{
    device::KmsDevice,
    error::{Error, Result},
    mode_config::{connector::Connector, crtc::Crtc},
};

/// Shows framebuffer `fb_id` on `connector` through `crtc`.
///
/// Scanout starts at (0, 0) of the framebuffer and uses the mode the CRTC
/// reported when it was read. The kernel applies the change atomically: on
/// error the previous configuration is still in place. Repeating the call
/// with the same arguments leaves the display in the same state.
pub fn set_crtc<D: KmsDevice>(
    dev: &D,
    crtc: &Crtc,
    fb_id: u32,
    connector: &Connector,
) -> Result<()> {
    let Some(mode) = crtc.mode() else {
        return Err(Error::ModeSet {
            source: io::Error::new(io::ErrorKind::InvalidInput, "crtc has no active mode"),
        });
    };

    let connectors = [connector.id()];
    let mut user_data = DrmModeCrtc {
        set_connectors_ptr: connectors.as_ptr() as u64,
        count_connectors: connectors.len() as u32,
        crtc_id: crtc.id(),
        fb_id,
        x: 0,
        y: 0,
        gamma_size: 0,
        mode_valid: 1,
        mode: *mode,
    };
    dev.ioctl::<DrmIoctlModeSetCrtc>(&mut user_data)
        .map_err(|source| Error::ModeSet { source })?;

    info!(
        "drm: crtc {} scanning out framebuffer {fb_id} on connector {} ({}x{})",
        crtc.id(),
        connector.id(),
        mode.hdisplay,
        mode.vdisplay
    );
    Ok(())
}
