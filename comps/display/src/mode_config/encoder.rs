// SPDX-License-Identifier: MPL-2.0

use std::io;

use kms_uapi::{
    EncoderType,
    ioctl_defs::{DrmIoctlModeGetEncoder, DrmModeGetEncoder},
};

use super::connector::Connector;
use crate::{
    device::KmsDevice,
    error::{Error, Result},
};

const REQUEST: &str = "MODE_GETENCODER";

/// Converts the CRTC's pixel stream into the signal a connector needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    id: u32,
    type_: EncoderType,
    crtc_id: u32,
    possible_crtcs: u32,
    possible_clones: u32,
}

impl Encoder {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn type_(&self) -> EncoderType {
        self.type_
    }

    /// Id of the CRTC this encoder is bound to, 0 when unbound.
    pub fn crtc_id(&self) -> u32 {
        self.crtc_id
    }

    /// Bitmask of CRTC indices (positions in the resource list) usable with
    /// this encoder.
    pub fn possible_crtcs(&self) -> u32 {
        self.possible_crtcs
    }

    pub fn possible_clones(&self) -> u32 {
        self.possible_clones
    }

    pub fn release(self) {}
}

/// Reads encoder `encoder_id`.
pub fn query_encoder<D: KmsDevice>(dev: &D, encoder_id: u32) -> Result<Encoder> {
    if encoder_id == 0 {
        return Err(Error::query(
            REQUEST,
            io::Error::new(io::ErrorKind::NotFound, "no encoder attached"),
        ));
    }

    let mut user_data = DrmModeGetEncoder {
        encoder_id,
        ..Default::default()
    };
    dev.ioctl::<DrmIoctlModeGetEncoder>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    Ok(Encoder {
        id: user_data.encoder_id,
        type_: EncoderType::try_from(user_data.encoder_type).unwrap_or(EncoderType::None),
        crtc_id: user_data.crtc_id,
        possible_crtcs: user_data.possible_crtcs,
        possible_clones: user_data.possible_clones,
    })
}

/// Resolves the encoder currently attached to `connector`.
pub fn get_encoder<D: KmsDevice>(dev: &D, connector: &Connector) -> Result<Encoder> {
    query_encoder(dev, connector.encoder_id())
}
