// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use crate::{
    error::{Error, Result},
    mode_config::{ResourceSet, crtc::Crtc},
};

/// Device node opened when no other is configured.
pub const DEFAULT_DEVICE: &str = "/dev/dri/card0";

/// What [`DrmDisplay`](crate::DrmDisplay) should bring up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Path of the DRM primary node.
    pub device: PathBuf,
    /// Framebuffer size in pixels. `None` sizes it to the CRTC's active mode.
    pub resolution: Option<(u32, u32)>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            resolution: None,
        }
    }
}

impl DisplayConfig {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    /// The framebuffer size to allocate for `crtc`, checked against the
    /// device limits.
    pub(crate) fn framebuffer_size(
        &self,
        resources: &ResourceSet,
        crtc: &Crtc,
    ) -> Result<(u32, u32)> {
        let (width, height) = match self.resolution {
            Some(size) => size,
            None => crtc
                .mode()
                .map(|m| m.size())
                .ok_or(Error::InvalidConfig("no resolution given and the crtc has no mode"))?,
        };

        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig("resolution must be non-zero"));
        }
        if !resources.fits(width, height) {
            return Err(Error::InvalidConfig("resolution outside the device limits"));
        }
        Ok((width, height))
    }
}
