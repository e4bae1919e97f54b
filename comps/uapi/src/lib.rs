// SPDX-License-Identifier: MPL-2.0

//! Request layouts of the Linux DRM mode-setting interface.
//!
//! Every structure here is exchanged with the kernel bit-for-bit through an
//! ioctl, so field order, width and padding follow `drm.h`/`drm_mode.h`
//! exactly. The request codes are built with [`ioc!`] from the same
//! direction/type/number/size tuple the kernel headers use.

#![no_std]

pub mod ioctl;
pub mod ioctl_defs;
pub mod mode;
pub mod object;

pub use ioctl::{InData, InOutData, IoctlCmd, Pod};
pub use mode::{DrmModeModeInfo, ModeType};
pub use object::{ConnectorStatus, DrmModeConnType, EncoderType};

/// Bits per pixel of every buffer this layer allocates (packed XRGB/ARGB8888).
pub const DUMB_BPP: u32 = 32;
/// Colour depth announced when registering a 32 bpp framebuffer.
pub const DUMB_DEPTH: u32 = 24;
/// Bytes occupied by one pixel at [`DUMB_BPP`].
pub const BYTES_PER_PIXEL: u32 = DUMB_BPP / 8;
