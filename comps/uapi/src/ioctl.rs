// SPDX-License-Identifier: MPL-2.0

//! Typed ioctl request codes.
//!
//! A request is described by a zero-sized type implementing [`IoctlCmd`],
//! usually spelled through the [`ioc!`] macro:
//!
//! ```
//! use kms_uapi::{ioc, InOutData, ioctl_defs::DrmModeCreateDumb, IoctlCmd};
//!
//! type CreateDumb = ioc!(DRM_IOCTL_MODE_CREATE_DUMB, b'd', 0xb2, InOutData<DrmModeCreateDumb>);
//! assert_eq!(<CreateDumb as IoctlCmd>::CODE, 0xc020_64b2);
//! ```

use core::marker::PhantomData;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Plain-old-data accepted as an ioctl argument.
///
/// Any bit pattern is a valid value and the type has no padding, so it can
/// be handed to the kernel as raw bytes and read back the same way.
pub trait Pod: FromBytes + IntoBytes + Immutable + KnownLayout + Copy {}

impl<T: FromBytes + IntoBytes + Immutable + KnownLayout + Copy> Pod for T {}

cfg_if::cfg_if! {
    if #[cfg(any(
        target_arch = "powerpc",
        target_arch = "powerpc64",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "sparc",
        target_arch = "sparc64",
    ))] {
        const IOC_WRITE: u32 = 4;
        const IOC_READ: u32 = 2;
        const IOC_SIZEBITS: u32 = 13;
    } else {
        const IOC_WRITE: u32 = 1;
        const IOC_READ: u32 = 2;
        const IOC_SIZEBITS: u32 = 14;
    }
}

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = 8;
const IOC_SIZESHIFT: u32 = 16;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

/// Encodes `_IOC(dir, type, nr, size)`.
pub const fn encode(dir: u32, type_: u8, nr: u8, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((size as u32 & ((1 << IOC_SIZEBITS) - 1)) << IOC_SIZESHIFT)
        | ((type_ as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// Argument shape of an ioctl: which way the data flows and its type.
pub trait IoctlArg {
    const DIR: u32;
    type Data: Pod;
}

/// The argument is only read by the kernel (`_IOW`).
pub struct InData<T>(PhantomData<T>);

/// The argument is read and written back by the kernel (`_IOWR`).
pub struct InOutData<T>(PhantomData<T>);

impl<T: Pod> IoctlArg for InData<T> {
    const DIR: u32 = IOC_WRITE;
    type Data = T;
}

impl<T: Pod> IoctlArg for InOutData<T> {
    const DIR: u32 = IOC_READ | IOC_WRITE;
    type Data = T;
}

/// A fully described ioctl request.
pub trait IoctlCmd {
    type Data: Pod;
    const CODE: u32;
}

/// Request type produced by [`ioc!`].
pub struct Ioc<A, const TYPE: u8, const NR: u8>(PhantomData<A>);

impl<A: IoctlArg, const TYPE: u8, const NR: u8> IoctlCmd for Ioc<A, TYPE, NR> {
    type Data = A::Data;
    const CODE: u32 = encode(A::DIR, TYPE, NR, core::mem::size_of::<A::Data>());
}

/// Names an ioctl request type.
///
/// The first argument is the kernel's name for the request; it documents the
/// definition and is otherwise unused.
#[macro_export]
macro_rules! ioc {
    ($name:ident, $type_:expr, $nr:expr, $arg:ty) => {
        $crate::ioctl::Ioc<$arg, { $type_ }, { $nr }>
    };
}
