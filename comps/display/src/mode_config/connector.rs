// SPDX-License-Identifier: MPL-2.0

use kms_uapi::{
    ConnectorStatus, DrmModeConnType, DrmModeModeInfo,
    ioctl_defs::{DrmIoctlModeGetConnector, DrmModeGetConnector},
};
use log::{debug, warn};

use super::{ResourceSet, array_ptr, resources_changed};
use crate::{
    device::KmsDevice,
    error::{Error, Result},
};

const REQUEST: &str = "MODE_GETCONNECTOR";

/// A physical output as last reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    id: u32,
    encoder_id: u32,
    type_: DrmModeConnType,
    type_id: u32,
    status: ConnectorStatus,

    mm_width: u32,
    mm_height: u32,
    subpixel: u32,

    modes: Vec<DrmModeModeInfo>,
    encoders: Vec<u32>,
    properties: Vec<(u32, u64)>,
}

impl Connector {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Id of the encoder currently attached, 0 when none is.
    pub fn encoder_id(&self) -> u32 {
        self.encoder_id
    }

    pub fn type_(&self) -> DrmModeConnType {
        self.type_
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn status(&self) -> ConnectorStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectorStatus::Connected
    }

    /// Physical size of the sink in millimeters.
    pub fn mm_size(&self) -> (u32, u32) {
        (self.mm_width, self.mm_height)
    }

    pub fn subpixel_order(&self) -> u32 {
        self.subpixel
    }

    pub fn modes(&self) -> &[DrmModeModeInfo] {
        &self.modes
    }

    /// The mode the sink prefers, falling back to the first one listed.
    pub fn preferred_mode(&self) -> Option<&DrmModeModeInfo> {
        self.modes
            .iter()
            .find(|m| m.is_preferred())
            .or_else(|| self.modes.first())
    }

    /// Encoders this connector can be driven by.
    pub fn possible_encoders(&self) -> &[u32] {
        &self.encoders
    }

    pub fn properties(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.properties.iter().copied()
    }

    /// Releases this view of the connector.
    pub fn release(self) {}
}

/// Reads one connector, modes and property values included.
pub fn query_connector<D: KmsDevice>(dev: &D, connector_id: u32) -> Result<Connector> {
    let mut user_data = DrmModeGetConnector {
        connector_id,
        ..Default::default()
    };
    dev.ioctl::<DrmIoctlModeGetConnector>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    let mut modes = vec![DrmModeModeInfo::default(); user_data.count_modes as usize];
    let mut encoders = vec![0u32; user_data.count_encoders as usize];
    let mut prop_ids = vec![0u32; user_data.count_props as usize];
    let mut prop_values = vec![0u64; user_data.count_props as usize];

    user_data.modes_ptr = array_ptr(&mut modes);
    user_data.encoders_ptr = array_ptr(&mut encoders);
    user_data.props_ptr = array_ptr(&mut prop_ids);
    user_data.prop_values_ptr = array_ptr(&mut prop_values);

    dev.ioctl::<DrmIoctlModeGetConnector>(&mut user_data)
        .map_err(|e| Error::query(REQUEST, e))?;

    if user_data.count_modes as usize > modes.len()
        || user_data.count_encoders as usize > encoders.len()
        || user_data.count_props as usize > prop_ids.len()
    {
        return Err(Error::query(REQUEST, resources_changed()));
    }
    modes.truncate(user_data.count_modes as usize);
    encoders.truncate(user_data.count_encoders as usize);
    prop_ids.truncate(user_data.count_props as usize);
    prop_values.truncate(user_data.count_props as usize);

    Ok(Connector {
        id: user_data.connector_id,
        encoder_id: user_data.encoder_id,
        type_: DrmModeConnType::try_from(user_data.connector_type)
            .unwrap_or(DrmModeConnType::Unknown),
        type_id: user_data.connector_type_id,
        status: ConnectorStatus::try_from(user_data.connection)
            .unwrap_or(ConnectorStatus::Unknown),
        mm_width: user_data.mm_width,
        mm_height: user_data.mm_height,
        subpixel: user_data.subpixel,
        modes,
        encoders,
        properties: prop_ids.into_iter().zip(prop_values).collect(),
    })
}

/// Returns the first connected connector, in the order `resources` lists
/// them.
///
/// There is deliberately no preference among several connected outputs:
/// the pipeline drives a single display and takes whichever the driver
/// reports first. Connectors looked at and rejected are released before the
/// next one is queried, and scanning stops at the first match.
///
/// A connector that cannot be read is skipped. If no connected connector
/// turns up afterwards, the first such read error is returned instead of
/// [`Error::NoConnectedDisplay`], which is reserved for the case where every
/// connector was read and none is connected.
pub fn get_connector<D: KmsDevice>(dev: &D, resources: &ResourceSet) -> Result<Connector> {
    let mut first_err = None;

    for &id in resources.connectors() {
        let conn = match query_connector(dev, id) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("drm: skipping connector {id}: {e}");
                first_err.get_or_insert(e);
                continue;
            }
        };

        if conn.is_connected() {
            debug!("drm: connector {id} ({:?}) is connected", conn.type_());
            return Ok(conn);
        }

        debug!("drm: connector {id} is {:?}", conn.status());
        conn.release();
    }

    Err(first_err.unwrap_or(Error::NoConnectedDisplay))
}
