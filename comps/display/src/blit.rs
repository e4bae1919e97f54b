// SPDX-License-Identifier: MPL-2.0

use kms_uapi::BYTES_PER_PIXEL;

use crate::{
    device::KmsDevice,
    error::{Error, Result},
    gem::MappedRegion,
};

const BPP: usize = BYTES_PER_PIXEL as usize;

/// Copies a `width` x `height` block of packed 32-bit pixels into buffer
/// `buffer_handle` with its top-left corner at pixel (`x`, `y`).
///
/// `pixel_data` holds the rows back to back with no padding; `pitch` and
/// `size` describe the destination buffer. The pixels must already be in the
/// framebuffer's format. The buffer is mapped for the duration of the call
/// only. A rectangle that does not fit the buffer is rejected before
/// anything is mapped or written.
///
/// Columns are bounded by `pitch`, not by the visible width: a block that
/// ends inside a row's padding is accepted and is never displayed.
/// [`DrmDisplay::send_partial_image`](crate::DrmDisplay::send_partial_image)
/// checks against the visible area as well.
#[expect(clippy::too_many_arguments)]
pub fn send_to_fb<D: KmsDevice>(
    dev: &D,
    buffer_handle: u32,
    size: u64,
    pixel_data: &[u8],
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    pitch: u32,
) -> Result<()> {
    let size = usize::try_from(size).map_err(|_| Error::Blit("buffer size exceeds address space"))?;
    let rect = Rect::new(width, height, x, y);
    if rect.is_empty() {
        return Ok(());
    }
    rect.check(pixel_data.len(), pitch as usize, size)?;

    let mut region = MappedRegion::map(dev, buffer_handle, size)?;
    rect.copy(&mut region, pitch as usize, pixel_data);
    region.unmap();
    Ok(())
}

/// Copies `pixel_data` into an already mapped buffer with the same bounds
/// checks as [`send_to_fb`].
pub fn blit_region(
    dst: &mut [u8],
    pitch: u32,
    pixel_data: &[u8],
    width: u32,
    height: u32,
    x: u32,
    y: u32,
) -> Result<()> {
    let rect = Rect::new(width, height, x, y);
    if rect.is_empty() {
        return Ok(());
    }
    rect.check(pixel_data.len(), pitch as usize, dst.len())?;
    rect.copy(dst, pitch as usize, pixel_data);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

impl Rect {
    fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            x: x as usize,
            y: y as usize,
        }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn row_bytes(&self) -> usize {
        self.width * BPP
    }

    fn check(&self, src_len: usize, pitch: usize, dst_len: usize) -> Result<()> {
        let row_bytes = self
            .width
            .checked_mul(BPP)
            .ok_or(Error::Blit("row length overflows"))?;
        let src_needed = row_bytes
            .checked_mul(self.height)
            .ok_or(Error::Blit("rectangle size overflows"))?;
        if src_len < src_needed {
            return Err(Error::Blit("pixel data shorter than width x height"));
        }

        let row_end = self
            .x
            .checked_mul(BPP)
            .and_then(|start| start.checked_add(row_bytes))
            .ok_or(Error::Blit("row end overflows"))?;
        if row_end > pitch {
            return Err(Error::Blit("rectangle is wider than a buffer row"));
        }

        let last_row = self
            .y
            .checked_add(self.height - 1)
            .and_then(|row| row.checked_mul(pitch))
            .and_then(|start| start.checked_add(row_end))
            .ok_or(Error::Blit("rectangle end overflows"))?;
        if last_row > dst_len {
            return Err(Error::Blit("rectangle extends past the end of the buffer"));
        }
        Ok(())
    }

    /// Callers must have run [`Rect::check`] against the same arguments.
    fn copy(&self, dst: &mut [u8], pitch: usize, src: &[u8]) {
        let row_bytes = self.row_bytes();
        for (r, src_row) in src.chunks_exact(row_bytes).take(self.height).enumerate() {
            let start = (self.y + r) * pitch + self.x * BPP;
            dst[start..start + row_bytes].copy_from_slice(src_row);
        }
    }
}
