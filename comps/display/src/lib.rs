// SPDX-License-Identifier: MPL-2.0

//! A single-output display pipeline on top of DRM kernel mode-setting.
//!
//! The pipeline opens a DRM primary node, walks its resources to the first
//! connected output (connector → encoder → CRTC), allocates a 32 bpp dumb
//! buffer, registers it as a framebuffer and points the CRTC at it. Pixels
//! are copied in with [`send_to_fb`], which maps the buffer only for the
//! duration of each copy.
//!
//! ```no_run
//! use kms_display::{DisplayConfig, DrmDisplay};
//!
//! let display = DrmDisplay::open(&DisplayConfig::default())?;
//! let fb = display.framebuffer();
//! let white = vec![0xff; (fb.width * fb.height * 4) as usize];
//! display.send_full_image(&white)?;
//! # Ok::<(), kms_display::Error>(())
//! ```
//!
//! All calls block and none of them may run concurrently against the same
//! device or CRTC without outside serialization.

pub mod blit;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod gem;
pub mod mode_config;
pub mod modeset;

pub use blit::{blit_region, send_to_fb};
pub use config::DisplayConfig;
pub use device::{DrmCard, KmsDevice, open_device};
pub use display::DrmDisplay;
pub use error::{AllocStage, Error, Result};
pub use framebuffer::{FramebufferInfo, create_framebuffer, destroy_framebuffer};
pub use gem::MappedRegion;
pub use kms_uapi as uapi;
pub use mode_config::{
    ResourceSet,
    connector::{Connector, get_connector},
    crtc::{Crtc, get_crtc},
    encoder::{Encoder, get_encoder},
    free_resources, get_resources,
    path::{DisplayPath, resolve_display_path},
};
pub use modeset::set_crtc;
