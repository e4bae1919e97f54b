// SPDX-License-Identifier: MPL-2.0

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const DRM_DISPLAY_MODE_LEN: usize = 32;

/// A display timing as reported by connectors and CRTCs (`drm_mode_modeinfo`).
#[repr(C)]
#[derive(
    Debug, Default, Clone, Copy, Hash, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct DrmModeModeInfo {
    /// Pixel clock in kHz.
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub hskew: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub vscan: u16,

    pub vrefresh: u32,

    pub flags: u32,
    pub type_: u32,

    pub name: [u8; DRM_DISPLAY_MODE_LEN],
}

impl DrmModeModeInfo {
    /// Visible area in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.hdisplay as u32, self.vdisplay as u32)
    }

    /// The mode name up to its NUL terminator, if it is valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DRM_DISPLAY_MODE_LEN);
        core::str::from_utf8(&self.name[..len]).ok()
    }

    pub fn mode_type(&self) -> ModeType {
        ModeType::from_bits_truncate(self.type_)
    }

    pub fn is_preferred(&self) -> bool {
        self.mode_type().contains(ModeType::PREFERRED)
    }
}

bitflags::bitflags! {
    /// `DRM_MODE_TYPE_*`
    pub struct ModeType: u32 {
        const BUILTIN   = 1 << 0;
        const CLOCK_C   = (1 << 1) | (1 << 0);
        const CRTC_C    = (1 << 2) | (1 << 0);
        const PREFERRED = 1 << 3;
        const DEFAULT   = 1 << 4;
        const USERDEF   = 1 << 5;
        const DRIVER    = 1 << 6;
    }
}
