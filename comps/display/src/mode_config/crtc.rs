// SPDX-License-Identifier: MPL-2.0

use std::io;

use kms_uapi::{
    DrmModeModeInfo,
    ioctl_defs::{DrmIoctlModeGetCrtc, DrmModeCrtc},
};

use super::encoder::Encoder;
use crate::{
    device::KmsDevice,
    error::{Error, Result},
};

const REQUEST: &str = "MODE_GETCRTC";

/// A display controller and the state it was in when read.
///
/// The mode is the controller's, not ours: it is read here and used by at
/// most one mode-set. Query again rather than keeping it around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crtc {
    id: u32,
    fb_id: u32,
    x: u32,
    y: u32,
    gamma_size: u32,
    mode: Option<DrmModeModeInfo>,
}

impl Crtc {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Framebuffer being scanned out, 0 when none.
    pub fn fb_id(&self) -> u32 {
        self.fb_id
    }

    /// Scanout position on the framebuffer.
    pub fn xy(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn gamma_size(&self) -> u32 {
        self.gamma_size
    }

    /// The active display mode, `None` when the controller is disabled.
    pub fn mode(&self) -> Option<&DrmModeModeInfo> {
        self.mode.as_ref()
    }

    pub fn release(self) {}
}

/// Reads CRTC `crtc_id`.
pub fn query_crtc<D: KmsDevice>(dev: &D, crtc_id: u32) -> Result<Crtc> {
    if crtc_id == 0 {
        return Err(Error::query(
            REQUEST,
            io::Error::new(io::ErrorKind::NotFound, "encoder is not bound to a crtc"),
        ));
    }

    let mut user_data = DrmModeCrtc {
        crtc_id,
        ..Default::default()
    };
    dev.ioctl::<DrmIoctlModeGetCrtc>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    Ok(Crtc {
        id: user_data.crtc_id,
        fb_id: user_data.fb_id,
        x: user_data.x,
        y: user_data.y,
        gamma_size: user_data.gamma_size,
        mode: (user_data.mode_valid != 0).then_some(user_data.mode),
    })
}

/// Resolves the CRTC `encoder` is bound to.
pub fn get_crtc<D: KmsDevice>(dev: &D, encoder: &Encoder) -> Result<Crtc> {
    query_crtc(dev, encoder.crtc_id())
}
