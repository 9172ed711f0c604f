//! Component C: the decompression wrapper (§4.C).
//!
//! Grounded on the teacher's `compression/dwa/all.rs::deflate_decompress`, which is the
//! one place in the teacher crate that actually wires up `zune-inflate` for zlib-wrapped
//! DEFLATE (its Cargo.toml entry even advertises the crate for exactly this job: "zip
//! decompression, faster than miniz_oxide").

use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::descriptor::CompressionKind;
use crate::error::{Error, Result};

/// Inflate a zlib-wrapped DEFLATE payload, expecting exactly `uncompressed_length` bytes
/// of output. A stream that ends early is a `Truncated` error (§4.C contract); this also
/// catches the common "file was cut off mid-write" failure mode.
pub fn inflate(compressed: &[u8], uncompressed_length: usize) -> Result<Vec<u8>> {
    let options = DeflateOptions::default().set_size_hint(uncompressed_length);
    let mut decoder = DeflateDecoder::new_with_options(compressed, options);

    let decompressed = decoder.decode_zlib().map_err(|error| {
        Error::truncated(format!("DEFLATE stream ended before decoding: {error:?}"))
    })?;

    if decompressed.len() != uncompressed_length {
        return Err(Error::truncated(format!(
            "DEFLATE stream produced {} bytes, expected {}",
            decompressed.len(), uncompressed_length
        )));
    }

    Ok(decompressed)
}

/// Apply the compression kind named by a [`crate::descriptor::CompressionSpec`] to a
/// fully-read compressed payload. `NONE` passes the bytes through unmodified.
pub fn decompress(kind: CompressionKind, compressed: &[u8], uncompressed_length: usize) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::None => {
            if compressed.len() != uncompressed_length {
                return Err(Error::truncated(format!(
                    "uncompressed payload is {} bytes, expected {}",
                    compressed.len(), uncompressed_length
                )));
            }

            Ok(compressed.to_vec())
        }

        CompressionKind::Deflate => inflate(compressed, uncompressed_length),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn deflate_zlib(data: &[u8]) -> Vec<u8> {
        // minimal zlib wrapper: 2-byte header, raw stored deflate blocks, adler32 trailer.
        // built by hand here instead of pulling in a compressor dependency, since the
        // core only ever needs to decode deflate, never produce it.
        let mut out = vec![0x78, 0x01]; // zlib header: deflate, 32k window, no dictionary

        let mut remaining = data;
        if remaining.is_empty() {
            out.push(0x01); // final empty stored block
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&0xFFFFu16.to_le_bytes());
        }

        while !remaining.is_empty() {
            let chunk_len = remaining.len().min(u16::MAX as usize);
            let (chunk, rest) = remaining.split_at(chunk_len);
            let is_final = rest.is_empty();

            out.push(if is_final { 0x01 } else { 0x00 });
            out.extend_from_slice(&(chunk_len as u16).to_le_bytes());
            out.extend_from_slice(&(!(chunk_len as u16)).to_le_bytes());
            out.extend_from_slice(chunk);

            remaining = rest;
        }

        out.write_all(&adler32(data).to_be_bytes()).unwrap();
        out
    }

    fn adler32(data: &[u8]) -> u32 {
        let mut a: u32 = 1;
        let mut b: u32 = 0;

        for &byte in data {
            a = (a + byte as u32) % 65521;
            b = (b + a) % 65521;
        }

        (b << 16) | a
    }

    #[test]
    fn inflates_a_stored_zlib_stream() {
        let original = b"hello hdf4 world, this is a synthetic stored deflate block";
        let compressed = deflate_zlib(original);

        let decompressed = inflate(&compressed, original.len()).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn rejects_a_truncated_stream() {
        let original = b"truncate me please";
        let mut compressed = deflate_zlib(original);
        compressed.truncate(compressed.len() - 1);

        assert!(inflate(&compressed, original.len()).is_err());
    }

    #[test]
    fn passes_none_compression_through_unchanged() {
        let bytes = vec![1, 2, 3, 4];
        let result = decompress(CompressionKind::None, &bytes, 4).unwrap();
        assert_eq!(result, bytes);
    }
}
