// SPDX-License-Identifier: MPL-2.0

//! An in-process DRM card that answers requests the way a simple driver
//! does. Dumb buffers live in anonymous temp files so that every mapping of
//! a handle sees the same bytes, as with a real shared mapping.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    fs::File,
    io,
    os::unix::fs::FileExt,
};

use hashbrown::HashMap;
use kms_display::{
    KmsDevice,
    uapi::{
        ConnectorStatus, DrmModeConnType, DrmModeModeInfo, EncoderType, IoctlCmd, ModeType, Pod,
        ioctl_defs::*,
    },
};
use memmap2::{MmapMut, MmapOptions};
use zerocopy::FromBytes;

/// Row alignment the fake driver applies to dumb buffers.
pub const PITCH_ALIGN: u32 = 64;

const DUMB_OFFSET_BASE: u64 = 0x1_0000_0000;
const FB_ID_BASE: u32 = 0x100;

#[derive(Debug, Clone)]
pub struct FakeConnector {
    pub id: u32,
    pub encoder_id: u32,
    pub status: ConnectorStatus,
    pub modes: Vec<DrmModeModeInfo>,
}

#[derive(Debug, Clone)]
pub struct FakeEncoder {
    pub id: u32,
    pub crtc_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCrtc {
    pub id: u32,
    pub fb_id: u32,
    pub mode: Option<DrmModeModeInfo>,
    pub connectors: Vec<u32>,
}

#[derive(Debug)]
struct FakeDumb {
    file: File,
    width: u32,
    height: u32,
    pitch: u32,
    size: u64,
    offset: u64,
}

#[derive(Debug)]
struct FakeState {
    connectors: Vec<FakeConnector>,
    encoders: Vec<FakeEncoder>,
    crtcs: Vec<FakeCrtc>,

    gem_table: HashMap<u32, FakeDumb>,
    next_handle: u32,
    framebuffers: HashMap<u32, DrmModeFBCmd>,
    next_fb_id: u32,

    failures: HashMap<u32, i32>,
    map_failure: Option<i32>,
    hotplug_pending: bool,
    mode_added_pending: bool,
    connector_queries: Vec<u32>,
    setcrtc_calls: usize,
}

#[derive(Debug)]
pub struct FakeCard {
    state: RefCell<FakeState>,
    maps: Cell<usize>,
}

pub fn mode(width: u16, height: u16) -> DrmModeModeInfo {
    let mut mode = DrmModeModeInfo {
        clock: 148_500,
        hdisplay: width,
        hsync_start: width + 88,
        hsync_end: width + 132,
        htotal: width + 280,
        vdisplay: height,
        vsync_start: height + 4,
        vsync_end: height + 9,
        vtotal: height + 45,
        vrefresh: 60,
        type_: (ModeType::PREFERRED | ModeType::DRIVER).bits(),
        ..Default::default()
    };
    let name = format!("{width}x{height}");
    mode.name[..name.len()].copy_from_slice(name.as_bytes());
    mode
}

impl FakeCard {
    /// One output per entry of `statuses`, each with its own encoder and an
    /// active CRTC running `width` x `height`.
    pub fn with_connectors(statuses: &[ConnectorStatus], width: u16, height: u16) -> Self {
        let mut connectors = Vec::new();
        let mut encoders = Vec::new();
        let mut crtcs = Vec::new();

        for (i, &status) in statuses.iter().enumerate() {
            let i = i as u32;
            connectors.push(FakeConnector {
                id: 10 + i,
                encoder_id: 40 + i,
                status,
                modes: vec![mode(width, height)],
            });
            encoders.push(FakeEncoder {
                id: 40 + i,
                crtc_id: 70 + i,
            });
            crtcs.push(FakeCrtc {
                id: 70 + i,
                fb_id: 0,
                mode: Some(mode(width, height)),
                connectors: Vec::new(),
            });
        }

        Self {
            state: RefCell::new(FakeState {
                connectors,
                encoders,
                crtcs,
                gem_table: HashMap::new(),
                next_handle: 1,
                framebuffers: HashMap::new(),
                next_fb_id: FB_ID_BASE,
                failures: HashMap::new(),
                map_failure: None,
                hotplug_pending: false,
                mode_added_pending: false,
                connector_queries: Vec::new(),
                setcrtc_calls: 0,
            }),
            maps: Cell::new(0),
        }
    }

    pub fn single_output(width: u16, height: u16) -> Self {
        Self::with_connectors(&[ConnectorStatus::Connected], width, height)
    }

    /// Makes every later request with `code` fail with `errno`.
    pub fn fail_request(&self, code: u32, errno: i32) {
        self.state.borrow_mut().failures.insert(code, errno);
    }

    /// Makes every later `map` fail with `errno`.
    pub fn fail_map(&self, errno: i32) {
        self.state.borrow_mut().map_failure = Some(errno);
    }

    /// Plugs in one more connected output right after the next count-only
    /// GETRESOURCES call has been answered.
    pub fn hotplug_after_count(&self) {
        self.state.borrow_mut().hotplug_pending = true;
    }

    /// Gives the queried connector one more mode right after the next
    /// count-only GETCONNECTOR call has been answered.
    pub fn add_mode_after_count(&self) {
        self.state.borrow_mut().mode_added_pending = true;
    }

    pub fn detach_encoder(&self, connector_index: usize) {
        self.state.borrow_mut().connectors[connector_index].encoder_id = 0;
    }

    pub fn disable_crtc(&self, crtc_index: usize) {
        self.state.borrow_mut().crtcs[crtc_index].mode = None;
    }

    /// Connector ids in the order they were queried.
    pub fn connector_queries(&self) -> Vec<u32> {
        self.state.borrow().connector_queries.clone()
    }

    pub fn crtc(&self, crtc_id: u32) -> Option<FakeCrtc> {
        self.state
            .borrow()
            .crtcs
            .iter()
            .find(|c| c.id == crtc_id)
            .cloned()
    }

    pub fn setcrtc_calls(&self) -> usize {
        self.state.borrow().setcrtc_calls
    }

    pub fn dumb_count(&self) -> usize {
        self.state.borrow().gem_table.len()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    /// Number of successful mappings handed out so far.
    pub fn map_count(&self) -> usize {
        self.maps.get()
    }

    /// Contents of dumb buffer `handle`, read without mapping it.
    pub fn buffer_contents(&self, handle: u32) -> Vec<u8> {
        let state = self.state.borrow();
        let dumb = &state.gem_table[&handle];
        let mut bytes = vec![0u8; dumb.size as usize];
        dumb.file.read_exact_at(&mut bytes, 0).unwrap();
        bytes
    }

    /// Scribbles over a buffer so tests can tell whether it was cleared.
    pub fn fill_buffer(&self, handle: u32, byte: u8) {
        let state = self.state.borrow();
        let dumb = &state.gem_table[&handle];
        dumb.file
            .write_all_at(&vec![byte; dumb.size as usize], 0)
            .unwrap();
    }
}

fn errno(code: i32) -> io::Error {
    io::Error::from_raw_os_error(code)
}

fn user_data<C: IoctlCmd>(arg: &mut [u8]) -> io::Result<&mut C::Data> {
    <C::Data>::mut_from_bytes(arg).map_err(|_| errno(libc::EFAULT))
}

fn is<C: IoctlCmd>(code: u32) -> bool {
    code == C::CODE
}

/// Stores `val` at element `index` of a caller-provided array.
fn write_user<T: Pod>(ptr: u64, index: usize, val: T) {
    // SAFETY: the pipeline sized the array from the counts reported by the
    // previous call, and this fake writes no more than those counts.
    unsafe { (ptr as *mut T).add(index).write_unaligned(val) }
}

fn read_user<T: Pod>(ptr: u64, index: usize) -> T {
    // SAFETY: `ptr` points to at least `index + 1` elements per the request.
    unsafe { (ptr as *const T).add(index).read_unaligned() }
}

impl KmsDevice for FakeCard {
    fn ioctl_raw(&self, code: u32, arg: &mut [u8]) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(&e) = state.failures.get(&code) {
            return Err(errno(e));
        }

        if is::<DrmIoctlGetCap>(code) {
            let data = user_data::<DrmIoctlGetCap>(arg)?;
            data.value = match data.capability {
                cap::DUMB_BUFFER => 1,
                cap::DUMB_PREFERRED_DEPTH => 24,
                _ => 0,
            };
            Ok(())
        } else if is::<DrmIoctlModeGetResources>(code) {
            let data = user_data::<DrmIoctlModeGetResources>(arg)?;
            let count_connectors = state.connectors.len() as u32;
            let count_encoders = state.encoders.len() as u32;
            let count_crtcs = state.crtcs.len() as u32;
            let count_fbs = state.framebuffers.len() as u32;

            let first_call = data.is_first_call();
            if !first_call {
                if data.count_connectors >= count_connectors {
                    for (i, c) in state.connectors.iter().enumerate() {
                        write_user(data.connector_id_ptr, i, c.id);
                    }
                }
                if data.count_encoders >= count_encoders {
                    for (i, e) in state.encoders.iter().enumerate() {
                        write_user(data.encoder_id_ptr, i, e.id);
                    }
                }
                if data.count_crtcs >= count_crtcs {
                    for (i, c) in state.crtcs.iter().enumerate() {
                        write_user(data.crtc_id_ptr, i, c.id);
                    }
                }
                if data.count_fbs >= count_fbs {
                    for (i, id) in state.framebuffers.keys().enumerate() {
                        write_user(data.fb_id_ptr, i, *id);
                    }
                }
            }

            data.count_connectors = count_connectors;
            data.count_encoders = count_encoders;
            data.count_crtcs = count_crtcs;
            data.count_fbs = count_fbs;
            data.min_width = 1;
            data.max_width = 8192;
            data.min_height = 1;
            data.max_height = 8192;

            if first_call && state.hotplug_pending {
                state.hotplug_pending = false;
                let i = state.connectors.len() as u32;
                state.connectors.push(FakeConnector {
                    id: 10 + i,
                    encoder_id: 40 + i,
                    status: ConnectorStatus::Connected,
                    modes: vec![mode(64, 64)],
                });
                state.encoders.push(FakeEncoder {
                    id: 40 + i,
                    crtc_id: 70 + i,
                });
                state.crtcs.push(FakeCrtc {
                    id: 70 + i,
                    fb_id: 0,
                    mode: Some(mode(64, 64)),
                    connectors: Vec::new(),
                });
            }
            Ok(())
        } else if is::<DrmIoctlModeGetConnector>(code) {
            let data = user_data::<DrmIoctlModeGetConnector>(arg)?;
            let Some(conn) = state
                .connectors
                .iter()
                .find(|c| c.id == data.connector_id)
                .cloned()
            else {
                return Err(errno(libc::ENOENT));
            };

            let first_call = data.is_first_call();
            if first_call {
                state.connector_queries.push(conn.id);
            } else {
                if data.count_modes >= conn.modes.len() as u32 {
                    for (i, m) in conn.modes.iter().enumerate() {
                        write_user(data.modes_ptr, i, *m);
                    }
                }
                if data.count_encoders >= 1 {
                    write_user(data.encoders_ptr, 0, conn.encoder_id);
                }
            }

            data.count_modes = conn.modes.len() as u32;
            data.count_encoders = 1;
            data.count_props = 0;
            data.encoder_id = conn.encoder_id;
            data.connector_type = DrmModeConnType::Virtual as u32;
            data.connector_type_id = 1;
            data.connection = conn.status as u32;
            data.mm_width = 520;
            data.mm_height = 290;

            if first_call && state.mode_added_pending {
                state.mode_added_pending = false;
                if let Some(c) = state.connectors.iter_mut().find(|c| c.id == conn.id) {
                    c.modes.push(mode(32, 32));
                }
            }
            Ok(())
        } else if is::<DrmIoctlModeGetEncoder>(code) {
            let data = user_data::<DrmIoctlModeGetEncoder>(arg)?;
            let Some(index) = state.encoders.iter().position(|e| e.id == data.encoder_id) else {
                return Err(errno(libc::ENOENT));
            };
            data.encoder_type = EncoderType::Virtual as u32;
            data.crtc_id = state.encoders[index].crtc_id;
            data.possible_crtcs = 1 << index;
            data.possible_clones = 0;
            Ok(())
        } else if is::<DrmIoctlModeGetCrtc>(code) {
            let data = user_data::<DrmIoctlModeGetCrtc>(arg)?;
            let Some(crtc) = state.crtcs.iter().find(|c| c.id == data.crtc_id) else {
                return Err(errno(libc::ENOENT));
            };
            data.fb_id = crtc.fb_id;
            data.x = 0;
            data.y = 0;
            data.gamma_size = 256;
            data.mode_valid = crtc.mode.is_some() as u32;
            data.mode = crtc.mode.unwrap_or_default();
            Ok(())
        } else if is::<DrmIoctlModeSetCrtc>(code) {
            let data = *user_data::<DrmIoctlModeSetCrtc>(arg)?;
            if data.fb_id != 0 && !state.framebuffers.contains_key(&data.fb_id) {
                return Err(errno(libc::ENOENT));
            }
            if data.mode_valid == 0 || data.count_connectors == 0 {
                return Err(errno(libc::EINVAL));
            }
            let connectors: Vec<u32> = (0..data.count_connectors as usize)
                .map(|i| read_user(data.set_connectors_ptr, i))
                .collect();
            if connectors
                .iter()
                .any(|id| !state.connectors.iter().any(|c| c.id == *id))
            {
                return Err(errno(libc::ENOENT));
            }

            let Some(crtc) = state.crtcs.iter_mut().find(|c| c.id == data.crtc_id) else {
                return Err(errno(libc::ENOENT));
            };
            crtc.fb_id = data.fb_id;
            crtc.mode = Some(data.mode);
            crtc.connectors = connectors;
            state.setcrtc_calls += 1;
            Ok(())
        } else if is::<DrmIoctlModeCreateDumb>(code) {
            let data = user_data::<DrmIoctlModeCreateDumb>(arg)?;
            if data.bpp != 32 || data.width == 0 || data.height == 0 {
                return Err(errno(libc::EINVAL));
            }
            let pitch = (data.width * 4).div_ceil(PITCH_ALIGN) * PITCH_ALIGN;
            let size = pitch as u64 * data.height as u64;

            let file = tempfile::tempfile()?;
            file.set_len(size)?;

            let handle = state.next_handle;
            state.next_handle += 1;
            state.gem_table.insert(
                handle,
                FakeDumb {
                    file,
                    width: data.width,
                    height: data.height,
                    pitch,
                    size,
                    offset: DUMB_OFFSET_BASE * handle as u64,
                },
            );

            data.handle = handle;
            data.pitch = pitch;
            data.size = size;
            Ok(())
        } else if is::<DrmIoctlModeMapDumb>(code) {
            let data = user_data::<DrmIoctlModeMapDumb>(arg)?;
            let Some(dumb) = state.gem_table.get(&data.handle) else {
                return Err(errno(libc::ENOENT));
            };
            data.offset = dumb.offset;
            Ok(())
        } else if is::<DrmIoctlModeDestroyDumb>(code) {
            let data = user_data::<DrmIoctlModeDestroyDumb>(arg)?;
            match state.gem_table.remove(&data.handle) {
                Some(_) => Ok(()),
                None => Err(errno(libc::EINVAL)),
            }
        } else if is::<DrmIoctlModeAddFB>(code) {
            let data = user_data::<DrmIoctlModeAddFB>(arg)?;
            let Some(dumb) = state.gem_table.get(&data.handle) else {
                return Err(errno(libc::EINVAL));
            };
            if data.pitch < data.width * data.bpp / 8
                || data.pitch as u64 * data.height as u64 > dumb.size
                || data.width > dumb.width
                || data.height > dumb.height
                || data.pitch != dumb.pitch
            {
                return Err(errno(libc::EINVAL));
            }

            let fb_id = state.next_fb_id;
            state.next_fb_id += 1;
            data.fb_id = fb_id;
            state.framebuffers.insert(fb_id, *data);
            Ok(())
        } else if is::<DrmIoctlModeRmFB>(code) {
            let fb_id = *user_data::<DrmIoctlModeRmFB>(arg)?;
            if state.framebuffers.remove(&fb_id).is_none() {
                return Err(errno(libc::ENOENT));
            }
            for crtc in state.crtcs.iter_mut().filter(|c| c.fb_id == fb_id) {
                crtc.fb_id = 0;
                crtc.mode = None;
                crtc.connectors.clear();
            }
            Ok(())
        } else {
            Err(errno(libc::ENOTTY))
        }
    }

    fn map(&self, offset: u64, len: usize) -> io::Result<MmapMut> {
        let state = self.state.borrow();
        if let Some(e) = state.map_failure {
            return Err(errno(e));
        }
        let Some(dumb) = state.gem_table.values().find(|d| d.offset == offset) else {
            return Err(errno(libc::EINVAL));
        };
        if len == 0 || len as u64 > dumb.size {
            return Err(errno(libc::EINVAL));
        }
        // SAFETY: the temp file is private to this fake and never truncated
        // while a mapping of it is alive.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&dumb.file)? };
        self.maps.set(self.maps.get() + 1);
        Ok(map)
    }
}
