//! Component G: the fixed-record (`STRUCT`) reader (§4.G).

use crate::descriptor::{Member, Storage, StorageDescriptor};
use crate::error::{Error, Result};
use crate::fill::build_fill_buffer;
use crate::io::{Data, RandomAccessFile};
use crate::math::product;
use crate::options::CancellationToken;
use crate::section::Section;
use crate::variable::read_storage_bytes;

/// One record's raw, disk-order bytes. Endian conversion of individual members happens
/// lazily, at [`Record::member`] call time, rather than eagerly for the whole record --
/// a record is read far more often than every one of its members is inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    bytes: Vec<u8>,
}

impl Record {
    /// Decode the member named `name` out of this record's raw bytes, using `members`
    /// (normally `descriptor.members`) to find its offset, shape and element size.
    pub fn member<T: Data>(&self, members: &[Member], name: &str) -> Result<Vec<T>> {
        let member = members
            .iter()
            .find(|member| member.name == name)
            .ok_or_else(|| Error::internal(format!("no member named '{name}'")))?;

        if member.descriptor.element_size != T::BYTE_SIZE {
            return Err(Error::internal(format!(
                "member '{name}' has element size {}, requested type is {} bytes wide",
                member.descriptor.element_size, T::BYTE_SIZE
            )));
        }

        let count = product(&member.descriptor.shape);
        let start = member.offset_in_record;
        let end = start + count * T::BYTE_SIZE;

        if end > self.bytes.len() {
            return Err(Error::internal(format!("member '{name}' overruns its record")));
        }

        let mut out = vec![T::default(); count];
        T::read_be_slice(&self.bytes[start .. end], &mut out);
        Ok(out)
    }
}

/// Read a whole-record array (§4.G). `descriptor` must be a `STRUCT` descriptor with
/// `Contiguous` or `LinkedSegmented` storage, raw or DEFLATE-compressed; chunked
/// structures are an explicit non-goal (§9) and always raise `Unsupported`.
pub fn read_structure(
    file: &mut impl RandomAccessFile, descriptor: &StorageDescriptor, section: Option<&Section>,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<Record>> {
    debug_assert!(descriptor.is_struct(), "read_structure called on a non-STRUCT descriptor");
    descriptor.validate_members()?;

    if matches!(descriptor.storage, Storage::Chunked { .. }) {
        return Err(Error::unsupported("chunked structure variables are not supported"));
    }

    let section = Section::complete(section, &descriptor.shape)?;
    let recsize = descriptor.element_size;

    let bytes = if descriptor.has_no_data {
        build_fill_buffer(section.element_count(), recsize, descriptor.fill_value.as_deref())
    }
    else {
        read_storage_bytes(file, descriptor, &section, cancellation)?
    };

    Ok(bytes.chunks_exact(recsize).map(|chunk| Record { bytes: chunk.to_vec() }).collect())
}
