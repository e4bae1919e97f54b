// SPDX-License-Identifier: MPL-2.0

use log::warn;

use crate::{
    blit::send_to_fb,
    config::DisplayConfig,
    device::{DrmCard, KmsDevice, open_device},
    error::{Error, Result},
    framebuffer::{FramebufferInfo, create_framebuffer, destroy_framebuffer},
    mode_config::{
        ResourceSet, get_resources,
        path::{DisplayPath, resolve_display_path},
    },
    modeset::set_crtc,
};

/// A device with one framebuffer shown on its first connected output.
///
/// Dropping the display closes the device but leaves the framebuffer on
/// screen until the driver reclaims it; [`DrmDisplay::teardown`] removes it
/// explicitly.
#[derive(Debug)]
pub struct DrmDisplay<D: KmsDevice = DrmCard> {
    dev: D,
    resources: ResourceSet,
    path: DisplayPath,
    fb: FramebufferInfo,
}

impl DrmDisplay<DrmCard> {
    /// Opens `config.device` and brings up the display.
    pub fn open(config: &DisplayConfig) -> Result<Self> {
        let card = open_device(&config.device)?;
        Self::with_device(card, config)
    }
}

impl<D: KmsDevice> DrmDisplay<D> {
    /// Brings up the display on an already open device.
    ///
    /// Anything acquired before a failing step is released before the error
    /// is returned.
    pub fn with_device(dev: D, config: &DisplayConfig) -> Result<Self> {
        let resources = get_resources(&dev)?;
        let path = resolve_display_path(&dev, &resources)?;
        let (width, height) = config.framebuffer_size(&resources, &path.crtc)?;
        let fb = create_framebuffer(&dev, width, height)?;

        if let Err(e) = set_crtc(&dev, &path.crtc, fb.fb_id, &path.connector) {
            if let Err(cleanup) = destroy_framebuffer(&dev, fb) {
                warn!("drm: leaking framebuffer {}: {cleanup}", fb.fb_id);
            }
            return Err(e);
        }

        Ok(Self {
            dev,
            resources,
            path,
            fb,
        })
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn path(&self) -> &DisplayPath {
        &self.path
    }

    pub fn framebuffer(&self) -> &FramebufferInfo {
        &self.fb
    }

    /// Replaces the whole framebuffer with `data`, `width * height` packed
    /// pixels in framebuffer order.
    pub fn send_full_image(&self, data: &[u8]) -> Result<()> {
        let fb = &self.fb;
        send_to_fb(
            &self.dev,
            fb.handle,
            fb.size,
            data,
            fb.width,
            fb.height,
            0,
            0,
            fb.pitch,
        )
    }

    /// Writes a `width` x `height` block with its top-left corner at
    /// (`x`, `y`).
    ///
    /// The block must lie within the framebuffer's visible area. Row padding
    /// past the last visible column is not addressable here.
    pub fn send_partial_image(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
    ) -> Result<()> {
        let fb = &self.fb;
        let fits = |start: u32, len: u32, limit: u32| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        let empty = width == 0 || height == 0;
        if !empty && (!fits(x, width, fb.width) || !fits(y, height, fb.height)) {
            return Err(Error::Blit("rectangle outside the visible framebuffer"));
        }

        send_to_fb(
            &self.dev,
            fb.handle,
            fb.size,
            data,
            width,
            height,
            x,
            y,
            fb.pitch,
        )
    }

    /// Paints the whole framebuffer black.
    pub fn clear(&self) -> Result<()> {
        let mut region = self.fb.map(&self.dev)?;
        region.fill(0);
        Ok(())
    }

    /// Removes the framebuffer from the device and hands the device back.
    pub fn teardown(self) -> Result<D> {
        destroy_framebuffer(&self.dev, self.fb)?;
        Ok(self.dev)
    }
}
