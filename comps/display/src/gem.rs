// SPDX-License-Identifier: MPL-2.0

//! Dumb buffer objects and their CPU mappings.

use std::{
    io,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use kms_uapi::{
    DUMB_BPP,
    ioctl_defs::{
        DrmIoctlModeCreateDumb, DrmIoctlModeDestroyDumb, DrmIoctlModeMapDumb, DrmModeCreateDumb,
        DrmModeDestroyDumb, DrmModeMapDumb,
    },
};
use log::{debug, warn};
use memmap2::MmapMut;

use crate::{
    device::KmsDevice,
    error::{AllocStage, Error, Result},
};

/// A freshly created dumb buffer that has not been handed to a caller yet.
///
/// The buffer is destroyed again when this value is dropped, so an
/// allocation that fails half-way leaves nothing behind in the driver.
/// [`DumbBuffer::into_handle`] disarms that once the buffer is fully set up.
#[derive(Debug)]
pub(crate) struct DumbBuffer<'a, D: KmsDevice> {
    dev: &'a D,
    handle: u32,
    width: u32,
    height: u32,
    pitch: u32,
    size: u64,
    armed: bool,
}

impl<'a, D: KmsDevice> DumbBuffer<'a, D> {
    /// Asks the driver for a `width` x `height` buffer at 32 bits per pixel.
    pub fn create(dev: &'a D, width: u32, height: u32) -> Result<Self> {
        let mut user_data = DrmModeCreateDumb {
            width,
            height,
            bpp: DUMB_BPP,
            ..Default::default()
        };
        dev.ioctl::<DrmIoctlModeCreateDumb>(&mut user_data)
            .map_err(|e| Error::alloc(AllocStage::CreateDumb, e))?;

        debug!(
            "drm: dumb buffer {} {}x{} pitch {} size {}",
            user_data.handle, user_data.width, user_data.height, user_data.pitch, user_data.size
        );

        Ok(Self {
            dev,
            handle: user_data.handle,
            width: user_data.width,
            height: user_data.height,
            pitch: user_data.pitch,
            size: user_data.size,
            armed: true,
        })
    }

    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Keeps the buffer alive past this value and returns its handle.
    pub fn into_handle(mut self) -> u32 {
        self.armed = false;
        self.handle
    }
}

impl<D: KmsDevice> Drop for DumbBuffer<'_, D> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = destroy_dumb(self.dev, self.handle) {
            warn!("drm: failed to destroy dumb buffer {}: {e}", self.handle);
        }
    }
}

/// Returns the fake offset under which `handle` can be mapped.
pub fn map_dumb<D: KmsDevice>(dev: &D, handle: u32) -> io::Result<u64> {
    let mut user_data = DrmModeMapDumb {
        handle,
        ..Default::default()
    };
    dev.ioctl::<DrmIoctlModeMapDumb>(&mut user_data)?;
    Ok(user_data.offset)
}

/// Frees a dumb buffer handle.
pub fn destroy_dumb<D: KmsDevice>(dev: &D, handle: u32) -> io::Result<()> {
    let mut user_data = DrmModeDestroyDumb { handle };
    dev.ioctl::<DrmIoctlModeDestroyDumb>(&mut user_data)?;
    debug!("drm: destroyed dumb buffer {handle}");
    Ok(())
}

/// Process-visible memory backing a buffer handle.
///
/// The region is unmapped when dropped and cannot outlive the device it was
/// mapped from. Unmapping one region does not affect other mappings of the
/// same handle.
#[derive(Debug)]
pub struct MappedRegion<'a> {
    map: MmapMut,
    _dev: PhantomData<&'a ()>,
}

impl<'a> MappedRegion<'a> {
    /// Maps `len` bytes of buffer `handle`.
    pub fn map<D: KmsDevice>(dev: &'a D, handle: u32, len: usize) -> Result<Self> {
        let map_err = |source| Error::Map { handle, source };
        let offset = map_dumb(dev, handle).map_err(map_err)?;
        Self::at_offset(dev, offset, len).map_err(map_err)
    }

    pub(crate) fn at_offset<D: KmsDevice>(dev: &'a D, offset: u64, len: usize) -> io::Result<Self> {
        let map = dev.map(offset, len)?;
        Ok(Self {
            map,
            _dev: PhantomData,
        })
    }

    /// Unmaps the region.
    pub fn unmap(self) {}
}

impl Deref for MappedRegion<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.map
    }
}

impl DerefMut for MappedRegion<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.map
    }
}
