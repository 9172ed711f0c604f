//! The data model the external header parser hands the core (§3). `StorageDescriptor`
//! and everything it owns is read-only here: the core never mutates header data.

use smallvec::SmallVec;

use crate::section::Shape;

/// The scalar element types a variable's on-disk bytes can be interpreted as.
/// `CHAR` is stored as `U8` on disk but surfaced as character data by the variable reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    I8, U8, I16, U16, I32, U32, I64, F32, F64, Char, Struct,
}

impl DataType {
    /// Bytes per scalar element for the fixed-width types. `Struct` has no fixed
    /// per-instance size independent of its member table, so callers must use
    /// `StorageDescriptor::element_size` instead.
    pub fn fixed_element_size(self) -> Option<usize> {
        use DataType::*;
        match self {
            I8 | U8 | Char => Some(1),
            I16 | U16 => Some(2),
            I32 | U32 | F32 => Some(4),
            I64 | F64 => Some(8),
            Struct => None,
        }
    }
}

/// HDF4 is always big-endian on disk (§3); this type exists so the descriptor's shape
/// mirrors the specification even though the core currently only implements one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
}

/// A compressed byte range, used both for whole-variable storage and for individual
/// chunks whose data is itself compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    None,
    Deflate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSpec {
    pub kind: CompressionKind,
    pub uncompressed_length: usize,
    pub underlying: ContiguousOrLinked,
}

/// Either a single contiguous extent or a linked-segment list; used both for
/// whole-variable storage and for a compressed chunk's compressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContiguousOrLinked {
    Contiguous { offset: u64, length: u64 },
    Linked { segments: SmallVec<[(u64, u64); 4]> },
}

/// A tile of a chunked variable (§3 "Chunk").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk's lower corner in element space, one entry per rank.
    pub origin: Shape,
    pub data: ChunkData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkData {
    Contiguous { offset: u64, length: u64 },
    Compressed(CompressionSpec),
}

/// The three storage layouts a variable's bytes can take (§3 "storage").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Contiguous { start: u64, length: u64 },
    LinkedSegmented { segments: SmallVec<[(u64, u64); 4]> },
    Chunked { chunk_shape: Shape, chunks: Vec<Chunk> },
}

/// One member of a `STRUCT` variable's fixed-size record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub offset_in_record: usize,
    pub descriptor: Box<MemberDescriptor>,
}

/// The subset of `StorageDescriptor` relevant to describing a structure member's own
/// element type and shape within the record (a member has no storage or compression
/// of its own -- that belongs to the enclosing record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub element_size: usize,
    pub shape: Shape,
    pub data_type: DataType,
}

/// The per-variable descriptor produced by the external header parser and consumed,
/// never mutated, by the core (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub element_size: usize,
    pub shape: Shape,
    pub data_type: DataType,
    pub byte_order: ByteOrder,

    /// Byte pattern of length `element_size`, or `None` for zero-fill.
    pub fill_value: Option<Vec<u8>>,

    pub has_no_data: bool,
    pub storage: Storage,
    pub compressed: Option<CompressionSpec>,

    /// Populated only when `data_type == DataType::Struct`.
    pub members: Vec<Member>,
}

impl StorageDescriptor {
    pub fn is_struct(&self) -> bool {
        matches!(self.data_type, DataType::Struct)
    }

    /// §3 STRUCT invariant: every member fits inside the record.
    pub fn validate_members(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        for member in &self.members {
            let member_bytes = member.descriptor.element_size * crate::math::product(&member.descriptor.shape);

            if member.offset_in_record + member_bytes > self.element_size {
                return Err(Error::internal(format!(
                    "member '{}' at offset {} with size {} overruns record size {}",
                    member.name, member.offset_in_record, member_bytes, self.element_size
                )));
            }
        }

        Ok(())
    }

    /// §3 StorageDescriptor invariant: a non-`STRUCT` descriptor's `element_size` must
    /// match its `data_type`'s fixed width. `STRUCT` has no fixed per-instance size
    /// independent of its member table, so `fixed_element_size` returns `None` for it and
    /// this check is skipped.
    pub fn validate_element_size(&self) -> crate::error::Result<()> {
        if let Some(expected) = self.data_type.fixed_element_size() {
            if self.element_size != expected {
                return Err(crate::error::Error::internal(format!(
                    "descriptor declares element_size {} but data_type {:?} requires {}",
                    self.element_size, self.data_type, expected
                )));
            }
        }

        Ok(())
    }

    /// Eagerly validate `storage`'s segment/chunk tables against `element_size` and
    /// `shape`, instead of letting a malformed table surface as a lazy `Truncated`/
    /// `Internal` error partway through a read (`ReaderOptions::pedantic`, §10.2). Chunk
    /// alignment is checked regardless of compression, since `Storage::Chunked` is
    /// dispatched on before compression is consulted (§4.F); the contiguous/segmented
    /// byte-count check only applies when `compressed` is absent, since a compressed
    /// descriptor's `storage` bytes are the compressed payload, not `shape`-sized.
    pub fn validate_storage(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if let Storage::Chunked { chunk_shape, chunks } = &self.storage {
            for chunk in chunks {
                if chunk.origin.len() != chunk_shape.len() {
                    return Err(Error::internal("chunk origin rank does not match chunk_shape rank"));
                }

                for (&origin, &extent) in chunk.origin.iter().zip(chunk_shape.iter()) {
                    if origin % extent != 0 {
                        return Err(Error::internal(format!(
                            "chunk origin {} is not a multiple of chunk_shape extent {}",
                            origin, extent
                        )));
                    }
                }
            }
        }

        if self.compressed.is_none() {
            let required = crate::math::product(&self.shape) as u64 * self.element_size as u64;

            match &self.storage {
                Storage::Contiguous { length, .. } => {
                    if *length < required {
                        return Err(Error::truncated(format!(
                            "contiguous extent provides {} bytes but shape requires {}",
                            length, required
                        )));
                    }
                }

                Storage::LinkedSegmented { segments } => {
                    let provided: u64 = segments.iter().map(|&(_, length)| length).sum();

                    if provided < required {
                        return Err(Error::truncated(format!(
                            "linked-segment table provides {} bytes but shape requires {}",
                            provided, required
                        )));
                    }
                }

                Storage::Chunked { .. } => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use smallvec::smallvec;

    use super::*;

    fn base_descriptor(data_type: DataType, element_size: usize, storage: Storage) -> StorageDescriptor {
        StorageDescriptor {
            element_size,
            shape: smallvec![4],
            data_type,
            byte_order: ByteOrder::BigEndian,
            fill_value: None,
            has_no_data: false,
            storage,
            compressed: None,
            members: Vec::new(),
        }
    }

    #[test]
    fn accepts_element_size_matching_the_data_type() {
        let d = base_descriptor(DataType::I32, 4, Storage::Contiguous { start: 0, length: 16 });
        assert!(d.validate_element_size().is_ok());
    }

    #[test]
    fn rejects_element_size_mismatched_with_the_data_type() {
        let d = base_descriptor(DataType::I32, 2, Storage::Contiguous { start: 0, length: 8 });
        assert!(d.validate_element_size().is_err());
    }

    #[test]
    fn struct_data_type_skips_the_element_size_check() {
        let d = base_descriptor(DataType::Struct, 11, Storage::Contiguous { start: 0, length: 44 });
        assert!(d.validate_element_size().is_ok());
    }

    #[test]
    fn rejects_a_contiguous_extent_too_small_for_its_shape() {
        let d = base_descriptor(DataType::I32, 4, Storage::Contiguous { start: 0, length: 8 });
        assert!(d.validate_storage().is_err());
    }

    #[test]
    fn rejects_a_segment_table_too_small_for_its_shape() {
        let d = base_descriptor(DataType::I32, 4, Storage::LinkedSegmented { segments: smallvec![(0, 8)] });
        assert!(d.validate_storage().is_err());
    }

    #[test]
    fn accepts_a_segment_table_covering_its_shape() {
        let d = base_descriptor(DataType::I32, 4, Storage::LinkedSegmented { segments: smallvec![(0, 8), (100, 8)] });
        assert!(d.validate_storage().is_ok());
    }

    #[test]
    fn rejects_a_misaligned_chunk_origin() {
        let chunks = vec![Chunk { origin: smallvec![1], data: ChunkData::Contiguous { offset: 0, length: 8 } }];
        let d = base_descriptor(DataType::I32, 4, Storage::Chunked { chunk_shape: smallvec![2], chunks });
        assert!(d.validate_storage().is_err());
    }

    #[test]
    fn compressed_storage_skips_the_byte_count_check() {
        let mut d = base_descriptor(DataType::I32, 4, Storage::Contiguous { start: 0, length: 1 });
        d.compressed = Some(CompressionSpec {
            kind: CompressionKind::Deflate,
            uncompressed_length: 16,
            underlying: ContiguousOrLinked::Contiguous { offset: 0, length: 1 },
        });
        assert!(d.validate_storage().is_ok());
    }
}
