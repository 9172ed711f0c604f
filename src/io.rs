//! Primitive byte <-> element conversion.
//!
//! HDF4 stores all multi-byte integers and floats big-endian on disk (§6). This module
//! provides the inverse of what a little-endian format would need: every `read_be` /
//! `write_be_into` pair swaps bytes on a little-endian host and is a no-op on a big-endian
//! one, same shape as the teacher crate's little-endian `Data` trait, just mirrored.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// A seekable, readable file handle. The core never assumes buffering; callers are
/// expected to wrap their file in a `BufReader` if that matters for their I/O backend.
pub trait RandomAccessFile: Read + Seek {}
impl<T: Read + Seek> RandomAccessFile for T {}

pub fn skip_bytes(read: &mut impl Read, count: u64) -> Result<()> {
    let skipped = std::io::copy(&mut read.by_ref().take(count), &mut std::io::sink())?;

    if skipped != count {
        return Err(Error::truncated("expected more bytes while skipping"));
    }

    Ok(())
}

/// Extension trait for the scalar element types the core can copy.
/// `BYTE_SIZE` must equal `element_size` for the corresponding `DataType`.
pub trait Data: Sized + Default + Copy {
    const BYTE_SIZE: usize = std::mem::size_of::<Self>();

    fn read_be(bytes: &[u8]) -> Self;
    fn write_be_into(self, out: &mut [u8]);

    /// Decode a whole slice of big-endian elements from `bytes` into `out`.
    fn read_be_slice(bytes: &[u8], out: &mut [Self]) {
        for (chunk, element) in bytes.chunks_exact(Self::BYTE_SIZE).zip(out.iter_mut()) {
            *element = Self::read_be(chunk);
        }
    }
}

macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            fn read_be(bytes: &[u8]) -> Self {
                let mut array = [0_u8; std::mem::size_of::<$kind>()];
                array.copy_from_slice(&bytes[.. std::mem::size_of::<$kind>()]);
                $kind::from_be_bytes(array)
            }

            fn write_be_into(self, out: &mut [u8]) {
                out[.. std::mem::size_of::<$kind>()].copy_from_slice(&self.to_be_bytes());
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(i8);
implement_data_for_primitive!(i16);
implement_data_for_primitive!(u16);
implement_data_for_primitive!(i32);
implement_data_for_primitive!(u32);
implement_data_for_primitive!(i64);
implement_data_for_primitive!(f32);
implement_data_for_primitive!(f64);

/// Read the file's magic region at the start of the stream. HDF4's signature
/// is the four bytes `0x0E 0x03 0x13 0x01`; this is the one piece of header work
/// the core performs itself, per §6 (everything past the magic belongs to the
/// external header parser).
pub fn read_hdf4_magic(file: &mut impl RandomAccessFile) -> Result<bool> {
    let previous_position = file.stream_position()?;
    file.seek(SeekFrom::Start(0))?;

    let mut magic = [0_u8; 4];
    let matches = match file.read_exact(&mut magic) {
        Ok(()) => magic == HDF4_MAGIC,
        Err(_) => false,
    };

    file.seek(SeekFrom::Start(previous_position))?;
    Ok(matches)
}

pub const HDF4_MAGIC: [u8; 4] = [0x0E, 0x03, 0x13, 0x01];
