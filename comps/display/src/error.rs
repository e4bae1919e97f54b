// SPDX-License-Identifier: MPL-2.0

use std::{io, path::PathBuf};

/// Step of [`create_framebuffer`](crate::create_framebuffer) that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocStage {
    CreateDumb,
    MapDumb,
    Mmap,
    AddFb,
}

impl core::fmt::Display for AllocStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            AllocStage::CreateDumb => "MODE_CREATE_DUMB",
            AllocStage::MapDumb => "MODE_MAP_DUMB",
            AllocStage::Mmap => "mmap",
            AllocStage::AddFb => "MODE_ADDFB",
        };
        f.write_str(name)
    }
}

/// Errors reported by the display pipeline.
///
/// Every variant is raised where the failure happens and is never retried.
/// Requests rejected by the kernel carry the OS error in `source`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open DRM device {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("DRM request {request} failed: {source}")]
    ResourceQuery {
        request: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("no connected display found")]
    NoConnectedDisplay,
    #[error("dumb buffer allocation failed at {stage}: {source}")]
    BufferAllocation {
        stage: AllocStage,
        #[source]
        source: io::Error,
    },
    #[error("mode-set rejected: {source}")]
    ModeSet {
        #[source]
        source: io::Error,
    },
    #[error("cannot map buffer handle {handle}: {source}")]
    Map {
        handle: u32,
        #[source]
        source: io::Error,
    },
    #[error("blit rectangle does not fit the buffer: {0}")]
    Blit(&'static str),
    #[error("invalid display configuration: {0}")]
    InvalidConfig(&'static str),
}

impl Error {
    pub(crate) fn query(request: &'static str, source: io::Error) -> Self {
        Error::ResourceQuery { request, source }
    }

    pub(crate) fn alloc(stage: AllocStage, source: io::Error) -> Self {
        Error::BufferAllocation { stage, source }
    }

    /// The OS error number behind this failure, if the kernel reported one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::DeviceOpen { source, .. }
            | Error::ResourceQuery { source, .. }
            | Error::BufferAllocation { source, .. }
            | Error::ModeSet { source }
            | Error::Map { source, .. } => source.raw_os_error(),
            Error::NoConnectedDisplay | Error::Blit(_) | Error::InvalidConfig(_) => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

