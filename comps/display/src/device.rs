// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::{File, OpenOptions},
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use kms_uapi::{
    IoctlCmd,
    ioctl_defs::{DrmGetCap, DrmIoctlGetCap, cap},
};
use log::debug;
use memmap2::{MmapMut, MmapOptions};
use zerocopy::IntoBytes;

use crate::error::{Error, Result};

/// The kernel-interface surface the pipeline is written against.
///
/// [`DrmCard`] forwards to a real `/dev/dri/card*` node. Everything else in
/// this crate is generic over the trait so it can run against any device
/// that answers the same requests.
pub trait KmsDevice {
    /// Issues one request. `arg` holds the request structure and is updated
    /// in place with the kernel's reply.
    fn ioctl_raw(&self, code: u32, arg: &mut [u8]) -> io::Result<()>;

    /// Maps `len` bytes of the device at `offset` read-write and shared.
    ///
    /// `offset` is a fake offset previously handed out by `MODE_MAP_DUMB`.
    fn map(&self, offset: u64, len: usize) -> io::Result<MmapMut>;

    fn ioctl<C: IoctlCmd>(&self, data: &mut C::Data) -> io::Result<()>
    where
        Self: Sized,
    {
        self.ioctl_raw(C::CODE, data.as_mut_bytes())
    }
}

impl<T: KmsDevice> KmsDevice for &T {
    fn ioctl_raw(&self, code: u32, arg: &mut [u8]) -> io::Result<()> {
        (**self).ioctl_raw(code, arg)
    }

    fn map(&self, offset: u64, len: usize) -> io::Result<MmapMut> {
        (**self).map(offset, len)
    }
}

/// An open DRM primary node.
///
/// The descriptor is opened close-on-exec and closed exactly once, when the
/// value is dropped. Every object obtained through the card (resource
/// snapshots, buffer handles, framebuffer ids) is meaningless after that.
#[derive(Debug)]
pub struct DrmCard {
    file: File,
    path: PathBuf,
}

impl DrmCard {
    /// Opens `path` for read-write and checks that it is a mode-setting
    /// device able to allocate dumb buffers.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| Error::DeviceOpen {
            path: path.clone(),
            source,
        };

        // std opens with O_CLOEXEC.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(open_err)?;
        let card = Self {
            file,
            path: path.clone(),
        };

        let dumb = card.get_cap(cap::DUMB_BUFFER).map_err(open_err)?;
        if dumb == 0 {
            return Err(open_err(io::Error::new(
                io::ErrorKind::Unsupported,
                "driver does not support dumb buffers",
            )));
        }

        debug!("drm: opened {}", card.path.display());
        Ok(card)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queries one `DRM_CAP_*` value.
    pub fn get_cap(&self, capability: u64) -> io::Result<u64> {
        let mut data = DrmGetCap {
            capability,
            value: 0,
        };
        self.ioctl::<DrmIoctlGetCap>(&mut data)?;
        Ok(data.value)
    }
}

impl KmsDevice for DrmCard {
    fn ioctl_raw(&self, code: u32, arg: &mut [u8]) -> io::Result<()> {
        // SAFETY: `arg` is exactly the structure the request code encodes,
        // and every pointer field inside it was set by this crate to a live
        // buffer of the advertised length.
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), code as _, arg.as_mut_ptr()) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn map(&self, offset: u64, len: usize) -> io::Result<MmapMut> {
        // SAFETY: the mapping covers a dumb buffer that only this process
        // writes through the returned slice; the display engine only reads it.
        unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(len)
                .map_mut(&self.file)
        }
    }
}

/// Opens the display device at `path`.
///
/// The handle is released when the returned card is dropped.
pub fn open_device(path: impl AsRef<Path>) -> Result<DrmCard> {
    DrmCard::open(path)
}
