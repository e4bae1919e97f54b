// SPDX-License-Identifier: MPL-2.0

use log::info;

use super::{
    ResourceSet,
    connector::{Connector, get_connector},
    crtc::{Crtc, get_crtc},
    encoder::{Encoder, get_encoder},
};
use crate::{device::KmsDevice, error::Result};

/// The connector → encoder → CRTC chain that reaches one physical output.
///
/// Either the whole chain resolves or nothing is returned; the parts are
/// released together when the path is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPath {
    pub connector: Connector,
    pub encoder: Encoder,
    pub crtc: Crtc,
}

impl DisplayPath {
    pub fn release(self) {}
}

/// Resolves the output path of the first connected connector.
pub fn resolve_display_path<D: KmsDevice>(dev: &D, resources: &ResourceSet) -> Result<DisplayPath> {
    let connector = get_connector(dev, resources)?;
    let encoder = get_encoder(dev, &connector)?;
    let crtc = get_crtc(dev, &encoder)?;

    info!(
        "drm: display path connector {} -> encoder {} -> crtc {}",
        connector.id(),
        encoder.id(),
        crtc.id()
    );

    Ok(DisplayPath {
        connector,
        encoder,
        crtc,
    })
}
