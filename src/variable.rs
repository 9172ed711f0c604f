//! Component F: the top-level per-variable dispatcher (§4.F).

use std::io::{Cursor, Read, SeekFrom};

use crate::array::{from_be_bytes, Array};
use crate::compress::decompress;
use crate::descriptor::{ChunkData, ContiguousOrLinked, Storage, StorageDescriptor};
use crate::directive::{enumerate_regular, CopyDirective};
use crate::error::Result;
use crate::fill::build_fill_buffer;
use crate::io::RandomAccessFile;
use crate::layout::{enumerate_segmented, enumerate_tiled};
use crate::options::CancellationToken;
use crate::section::Section;
use crate::{copy, segments};

/// Read `descriptor`'s data, completing `section` against its shape first (§4.F steps
/// 1-5). Must not be called on a `STRUCT` descriptor -- those are read via
/// [`crate::structure::read_structure`] instead, since their return shape (a flat
/// record array plus a member table) is not a `TypedArray`.
pub fn read_variable(
    file: &mut impl RandomAccessFile, descriptor: &StorageDescriptor, section: Option<&Section>,
    cancellation: Option<&CancellationToken>,
) -> Result<Array> {
    debug_assert!(!descriptor.is_struct(), "structures are read via structure::read_structure");

    let section = Section::complete(section, &descriptor.shape)?;

    if descriptor.has_no_data {
        let fill = build_fill_buffer(section.element_count(), descriptor.element_size, descriptor.fill_value.as_deref());
        return from_be_bytes(descriptor.data_type, section.lengths(), fill);
    }

    let bytes = read_storage_bytes(file, descriptor, &section, cancellation)?;
    from_be_bytes(descriptor.data_type, section.lengths(), bytes)
}

/// Fetch every byte of `descriptor`'s selected section, dispatching on `(compressed?,
/// storage kind)` per the §4.F table. Returns a dense, big-endian, row-major buffer the
/// same shape `section` describes -- endian conversion happens later, in `from_be_bytes`.
/// Shared with `structure.rs`, which drives this same dispatch with `element_size` set
/// to the record size (§4.G) after ruling out chunked storage itself.
pub(crate) fn read_storage_bytes(
    file: &mut impl RandomAccessFile, descriptor: &StorageDescriptor, section: &Section, cancellation: Option<&CancellationToken>,
) -> Result<Vec<u8>> {
    let element_size = descriptor.element_size;
    let buffer_len = section.element_count() * element_size;

    // Chunked storage carries its own per-chunk compression (`ChunkData::Compressed`),
    // so it is dispatched the same way regardless of whether `descriptor.compressed` is
    // also set at the whole-variable level.
    if let Storage::Chunked { chunk_shape, chunks } = &descriptor.storage {
        return read_chunked(file, chunk_shape, chunks, element_size, section, descriptor.fill_value.as_deref(), cancellation);
    }

    if let Some(spec) = &descriptor.compressed {
        // Both remaining storage kinds collapse to the same path once compressed: the
        // compressed bytes are fetched per `spec.underlying`, inflated to one flat
        // buffer, then addressed with the plain Regular enumerator against a zero-based
        // logical stream.
        let compressed_bytes = fetch_contiguous_or_linked(file, &spec.underlying)?;
        let decompressed = decompress(spec.kind, &compressed_bytes, spec.uncompressed_length)?;

        let directives = enumerate_regular(0, element_size, &descriptor.shape, section);
        let mut out = vec![0_u8; buffer_len];
        let mut source = Cursor::new(decompressed);
        copy::read_streaming(&mut source, element_size, &directives, &mut out, cancellation)?;
        return Ok(out);
    }

    match &descriptor.storage {
        Storage::Contiguous { start, .. } => {
            let directives = enumerate_regular(*start, element_size, &descriptor.shape, section);
            let mut out = vec![0_u8; buffer_len];
            copy::read_positioned(file, element_size, &directives, &mut out, cancellation)?;
            Ok(out)
        }

        Storage::LinkedSegmented { segments } => {
            let directives = enumerate_segmented(element_size, &descriptor.shape, section, segments)?;
            let mut out = vec![0_u8; buffer_len];
            copy::read_positioned(file, element_size, &directives, &mut out, cancellation)?;
            Ok(out)
        }

        Storage::Chunked { .. } => unreachable!("handled above"),
    }
}

fn read_chunked(
    file: &mut impl RandomAccessFile, chunk_shape: &[usize], chunks: &[crate::descriptor::Chunk], element_size: usize,
    section: &Section, fill_value: Option<&[u8]>, cancellation: Option<&CancellationToken>,
) -> Result<Vec<u8>> {
    let mut out = build_fill_buffer(section.element_count(), element_size, fill_value);
    let plans = enumerate_tiled(chunks, chunk_shape, element_size, section);

    for plan in plans {
        if let Some(token) = cancellation {
            token.check()?;
        }

        match &plan.chunk.data {
            ChunkData::Contiguous { offset, .. } => {
                let adjusted: Vec<CopyDirective> = plan
                    .directives
                    .iter()
                    .map(|directive| CopyDirective { source_pos: offset + directive.source_pos, ..*directive })
                    .collect();

                copy::read_positioned(file, element_size, &adjusted, &mut out, cancellation)?;
            }

            ChunkData::Compressed(spec) => {
                let compressed_bytes = fetch_contiguous_or_linked(file, &spec.underlying)?;
                let decompressed = decompress(spec.kind, &compressed_bytes, spec.uncompressed_length)?;
                let mut source = Cursor::new(decompressed);
                copy::read_streaming(&mut source, element_size, &plan.directives, &mut out, cancellation)?;
            }
        }
    }

    Ok(out)
}

fn fetch_contiguous_or_linked(file: &mut impl RandomAccessFile, underlying: &ContiguousOrLinked) -> Result<Vec<u8>> {
    match underlying {
        ContiguousOrLinked::Contiguous { offset, length } => {
            file.seek(SeekFrom::Start(*offset))?;
            let mut buffer = vec![0_u8; *length as usize];
            file.read_exact(&mut buffer)?;
            Ok(buffer)
        }

        ContiguousOrLinked::Linked { segments: segment_list } => {
            let mut source = segments::LinkedSegmentSource::new(file, segment_list.clone());
            let mut buffer = Vec::new();
            source.read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use smallvec::smallvec;

    use super::*;
    use crate::array::TypedArray;
    use crate::descriptor::{ByteOrder, CompressionKind, CompressionSpec, DataType};

    fn descriptor(storage: Storage, compressed: Option<CompressionSpec>) -> StorageDescriptor {
        StorageDescriptor {
            element_size: 4,
            shape: smallvec![2, 2],
            data_type: DataType::I32,
            byte_order: ByteOrder::BigEndian,
            fill_value: Some(vec![0xFF, 0xFF, 0xFF, 0xFF]),
            has_no_data: false,
            storage,
            compressed,
            members: Vec::new(),
        }
    }

    #[test]
    fn reads_a_contiguous_variable() {
        let mut file = Cursor::new(vec![0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4]);
        let d = descriptor(Storage::Contiguous { start: 0, length: 16 }, None);

        let array = read_variable(&mut file, &d, None, None).unwrap();
        assert_eq!(array.data, TypedArray::I32(vec![1, 2, 3, 4]));
    }

    #[test]
    fn synthesizes_fill_for_has_no_data() {
        let mut file = Cursor::new(Vec::<u8>::new());
        let mut d = descriptor(Storage::Contiguous { start: 0, length: 0 }, None);
        d.has_no_data = true;

        let array = read_variable(&mut file, &d, None, None).unwrap();
        assert_eq!(array.data, TypedArray::I32(vec![-1, -1, -1, -1])); // 0xFFFFFFFF as i32
    }

    #[test]
    fn fills_missing_chunks_and_reads_present_ones() {
        let mut file = Cursor::new(vec![0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4]);
        let chunks = vec![crate::descriptor::Chunk {
            origin: smallvec![0, 0],
            data: ChunkData::Contiguous { offset: 0, length: 16 },
        }];

        let d = descriptor(Storage::Chunked { chunk_shape: smallvec![2, 2], chunks }, None);
        let array = read_variable(&mut file, &d, None, None).unwrap();
        assert_eq!(array.data, TypedArray::I32(vec![1, 2, 3, 4]));
    }

    #[test]
    fn reads_a_linked_segmented_variable() {
        let mut file = Cursor::new({
            let mut data = vec![0_u8; 408];
            data[200 .. 208].copy_from_slice(&[0, 0, 0, 7, 0, 0, 0, 8]);
            data[400 .. 408].copy_from_slice(&[0, 0, 0, 9, 0, 0, 0, 10]);
            data
        });

        let d = descriptor(
            Storage::LinkedSegmented { segments: smallvec![(200, 8), (0, 0), (400, 8)] },
            None,
        );

        let array = read_variable(&mut file, &d, None, None).unwrap();
        assert_eq!(array.data, TypedArray::I32(vec![7, 8, 9, 10]));
    }

    #[test]
    fn rejects_an_out_of_range_section() {
        let mut file = Cursor::new(vec![0_u8; 16]);
        let d = descriptor(Storage::Contiguous { start: 0, length: 16 }, None);

        let bad_section = Section { ranges: smallvec![crate::section::Range { start: 0, length: 5, stride: 1 }, crate::section::Range::full(2)] };
        assert!(read_variable(&mut file, &d, Some(&bad_section), None).is_err());
    }
}
