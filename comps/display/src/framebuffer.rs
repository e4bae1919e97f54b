// SPDX-License-Identifier: MPL-2.0

use std::io;

use kms_uapi::{
    DUMB_BPP, DUMB_DEPTH,
    ioctl_defs::{DrmIoctlModeAddFB, DrmIoctlModeRmFB, DrmModeFBCmd},
};
use log::{debug, info};

use crate::{
    device::KmsDevice,
    error::{AllocStage, Error, Result},
    gem::{DumbBuffer, MappedRegion, destroy_dumb, map_dumb},
};

/// A dumb buffer registered as a scanout framebuffer.
///
/// The dimensions, pitch and size are what the driver reported, which may be
/// larger than what was asked for. The all-zero value
/// ([`FramebufferInfo::default`]) stands for "no framebuffer" and is never
/// returned by a successful [`create_framebuffer`].
///
/// The kernel objects behind this value are not reference counted and are
/// not freed on drop: they live until [`destroy_framebuffer`] is called or
/// the device is closed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferInfo {
    pub fb_id: u32,
    pub handle: u32,
    /// Bytes per row, at least `width * 4`.
    pub pitch: u32,
    /// Total bytes, at least `pitch * height`.
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

impl FramebufferInfo {
    /// Whether this describes a live framebuffer rather than the sentinel.
    pub fn is_usable(&self) -> bool {
        self.fb_id != 0
            && self.handle != 0
            && self.pitch != 0
            && self.size != 0
            && self.width != 0
            && self.height != 0
    }

    /// Maps the whole buffer.
    pub fn map<'a, D: KmsDevice>(&self, dev: &'a D) -> Result<MappedRegion<'a>> {
        MappedRegion::map(dev, self.handle, self.byte_len()?)
    }

    pub(crate) fn byte_len(&self) -> Result<usize> {
        usize::try_from(self.size).map_err(|_| Error::Map {
            handle: self.handle,
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        })
    }
}

/// Allocates a `width` x `height` 32 bpp buffer, clears it to zero and
/// registers it as a framebuffer.
///
/// Each step owns what it acquired until the next one succeeds: when
/// registration fails the mapping is dropped and the dumb buffer destroyed
/// before the error is returned.
pub fn create_framebuffer<D: KmsDevice>(
    dev: &D,
    width: u32,
    height: u32,
) -> Result<FramebufferInfo> {
    let dumb = DumbBuffer::create(dev, width, height)?;

    let offset =
        map_dumb(dev, dumb.handle()).map_err(|e| Error::alloc(AllocStage::MapDumb, e))?;
    let len = usize::try_from(dumb.size())
        .map_err(|_| Error::alloc(AllocStage::Mmap, io::ErrorKind::OutOfMemory.into()))?;

    let mut region = MappedRegion::at_offset(dev, offset, len)
        .map_err(|e| Error::alloc(AllocStage::Mmap, e))?;
    region.fill(0);
    region.unmap();

    let mut user_data = DrmModeFBCmd {
        width: dumb.width(),
        height: dumb.height(),
        pitch: dumb.pitch(),
        bpp: DUMB_BPP,
        depth: DUMB_DEPTH,
        handle: dumb.handle(),
        ..Default::default()
    };
    dev.ioctl::<DrmIoctlModeAddFB>(&mut user_data)
        .map_err(|e| Error::alloc(AllocStage::AddFb, e))?;

    let info = FramebufferInfo {
        fb_id: user_data.fb_id,
        pitch: dumb.pitch(),
        size: dumb.size(),
        width: dumb.width(),
        height: dumb.height(),
        handle: dumb.into_handle(),
    };

    info!(
        "drm: framebuffer {} {}x{} pitch {} (buffer {})",
        info.fb_id, info.width, info.height, info.pitch, info.handle
    );
    Ok(info)
}

/// Unregisters the framebuffer and frees its buffer.
///
/// Removing a framebuffer that is being scanned out turns the CRTC off.
pub fn destroy_framebuffer<D: KmsDevice>(dev: &D, info: FramebufferInfo) -> Result<()> {
    let mut fb_id = info.fb_id;
    dev.ioctl::<DrmIoctlModeRmFB>(&mut fb_id)
        .map_err(|e| Error::query("MODE_RMFB", e))?;
    debug!("drm: removed framebuffer {}", info.fb_id);

    destroy_dumb(dev, info.handle).map_err(|e| Error::query("MODE_DESTROY_DUMB", e))
}
