// SPDX-License-Identifier: MPL-2.0

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    ioc,
    ioctl::InOutData,
    mode::DrmModeModeInfo,
};

#[rustfmt::skip]
mod codes {
    use super::*;

    pub type DrmIoctlGetCap                 = ioc!(DRM_IOCTL_GET_CAP,               b'd', 0x0c, InOutData<DrmGetCap>);
    pub type DrmIoctlModeGetResources       = ioc!(DRM_IOCTL_MODE_GETRESOURCES,     b'd', 0xa0, InOutData<DrmModeGetResources>);
    pub type DrmIoctlModeGetCrtc            = ioc!(DRM_IOCTL_MODE_GETCRTC,          b'd', 0xa1, InOutData<DrmModeCrtc>);
    pub type DrmIoctlModeSetCrtc            = ioc!(DRM_IOCTL_MODE_SETCRTC,          b'd', 0xa2, InOutData<DrmModeCrtc>);
    pub type DrmIoctlModeGetEncoder         = ioc!(DRM_IOCTL_MODE_GETENCODER,       b'd', 0xa6, InOutData<DrmModeGetEncoder>);
    pub type DrmIoctlModeGetConnector       = ioc!(DRM_IOCTL_MODE_GETCONNECTOR,     b'd', 0xa7, InOutData<DrmModeGetConnector>);
    pub type DrmIoctlModeAddFB              = ioc!(DRM_IOCTL_MODE_ADDFB,            b'd', 0xae, InOutData<DrmModeFBCmd>);
    pub type DrmIoctlModeRmFB               = ioc!(DRM_IOCTL_MODE_RMFB,             b'd', 0xaf, InOutData<u32>);
    pub type DrmIoctlModeCreateDumb         = ioc!(DRM_IOCTL_MODE_CREATE_DUMB,      b'd', 0xb2, InOutData<DrmModeCreateDumb>);
    pub type DrmIoctlModeMapDumb            = ioc!(DRM_IOCTL_MODE_MAP_DUMB,         b'd', 0xb3, InOutData<DrmModeMapDumb>);
    pub type DrmIoctlModeDestroyDumb        = ioc!(DRM_IOCTL_MODE_DESTROY_DUMB,     b'd', 0xb4, InOutData<DrmModeDestroyDumb>);
}

pub use codes::*;

/// Capability identifiers accepted by `DRM_IOCTL_GET_CAP`.
pub mod cap {
    pub const DUMB_BUFFER: u64 = 0x1;
    pub const DUMB_PREFERRED_DEPTH: u64 = 0x3;
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmGetCap {
    pub capability: u64,
    pub value: u64,
}

/// `drm_mode_card_res`.
///
/// Queried twice: once with null array pointers to learn the counts, then
/// with arrays sized from those counts.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeGetResources {
    pub fb_id_ptr: u64,
    pub crtc_id_ptr: u64,
    pub connector_id_ptr: u64,
    pub encoder_id_ptr: u64,

    pub count_fbs: u32,
    pub count_crtcs: u32,
    pub count_connectors: u32,
    pub count_encoders: u32,

    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl DrmModeGetResources {
    pub fn is_first_call(&self) -> bool {
        self.fb_id_ptr == 0
            && self.crtc_id_ptr == 0
            && self.connector_id_ptr == 0
            && self.encoder_id_ptr == 0
    }
}

/// `drm_mode_crtc`, shared by GETCRTC and SETCRTC.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeCrtc {
    /// Pointer to a `u32` array of connector ids (SETCRTC only).
    pub set_connectors_ptr: u64,
    pub count_connectors: u32,

    pub crtc_id: u32,
    /// Id of the framebuffer being scanned out.
    pub fb_id: u32,

    /// Position of the scanout on the framebuffer.
    pub x: u32,
    pub y: u32,

    pub gamma_size: u32,
    pub mode_valid: u32,
    pub mode: DrmModeModeInfo,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeGetEncoder {
    pub encoder_id: u32,
    pub encoder_type: u32,

    /// Id of the CRTC currently driven by this encoder, 0 when unbound.
    pub crtc_id: u32,
    pub possible_crtcs: u32,
    pub possible_clones: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeGetConnector {
    /// Pointer to array of encoder IDs.
    pub encoders_ptr: u64,
    /// Pointer to array of drm_mode_modeinfo.
    pub modes_ptr: u64,
    /// Pointer to array of property IDs.
    pub props_ptr: u64,
    /// Pointer to array of property values.
    pub prop_values_ptr: u64,

    pub count_modes: u32,
    pub count_props: u32,
    pub count_encoders: u32,

    /// ID of the current encoder.
    pub encoder_id: u32,
    /// ID of the connector.
    pub connector_id: u32,

    /// See [`DrmModeConnType`](crate::DrmModeConnType).
    pub connector_type: u32,

    /// This is a per-type connector number.
    pub connector_type_id: u32,

    /// See [`ConnectorStatus`](crate::ConnectorStatus).
    pub connection: u32,
    /// Width of the connected sink in millimeters.
    pub mm_width: u32,
    /// Height of the connected sink in millimeters.
    pub mm_height: u32,

    pub subpixel: u32,

    /// Padding, must be zero.
    pub pad: u32,
}

impl DrmModeGetConnector {
    pub fn is_first_call(&self) -> bool {
        self.encoders_ptr == 0
            && self.modes_ptr == 0
            && self.props_ptr == 0
            && self.prop_values_ptr == 0
    }
}

/// `drm_mode_fb_cmd`, the legacy single-plane framebuffer registration.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeFBCmd {
    pub fb_id: u32,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bpp: u32,
    pub depth: u32,
    /* driver specific handle */
    pub handle: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeCreateDumb {
    pub height: u32,
    pub width: u32,
    pub bpp: u32,
    pub flags: u32,
    /* handle, pitch, size will be returned */
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeMapDumb {
    /** Handle for the object being mapped. */
    pub handle: u32,
    pub pad: u32,
    /**
     * Fake offset to use for subsequent mmap call
     *
     * This is a fixed-size type for 32/64 compatibility.
     */
    pub offset: u64,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct DrmModeDestroyDumb {
    pub handle: u32,
}
