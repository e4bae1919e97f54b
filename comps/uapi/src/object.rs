// SPDX-License-Identifier: MPL-2.0

//! Enumerations carried in connector and encoder replies.

/// Declares a `#[repr(u32)]` enum together with a `TryFrom<u32>` that
/// rejects values the kernel headers do not define.
macro_rules! c_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)*
        }

        impl TryFrom<u32> for $name {
            type Error = u32;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok(Self::$variant),)*
                    other => Err(other),
                }
            }
        }
    };
}

c_enum! {
    /// Connection state of a connector.
    pub enum ConnectorStatus {
        // DRM_MODE_CONNECTED
        Connected = 1,
        // DRM_MODE_DISCONNECTED
        Disconnected = 2,
        // DRM_MODE_UNKNOWNCONNECTION
        Unknown = 3,
    }
}

c_enum! {
    /// `DRM_MODE_CONNECTOR_*`
    pub enum DrmModeConnType {
        Unknown = 0,
        Vga = 1,
        DviI = 2,
        DviD = 3,
        DviA = 4,
        Composite = 5,
        SVideo = 6,
        Lvds = 7,
        Component = 8,
        NinePinDin = 9,
        DisplayPort = 10,
        HdmiA = 11,
        HdmiB = 12,
        Tv = 13,
        Edp = 14,
        Virtual = 15,
        Dsi = 16,
        Dpi = 17,
        Writeback = 18,
        Spi = 19,
        Usb = 20,
    }
}

c_enum! {
    /// `DRM_MODE_ENCODER_*`
    pub enum EncoderType {
        None = 0,
        Dac = 1,
        Tmds = 2,
        Lvds = 3,
        TvDac = 4,
        Virtual = 5,
        Dsi = 6,
        DpMst = 7,
        Dpi = 8,
    }
}
