#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    trivial_numeric_casts,
    redundant_semicolon
)]

#![forbid(unsafe_code)]

// TODO #![warn(missing_docs)]

//! A reader for the core data-access engine of the HDF4 scientific file format (and its
//! EOS variant): given a variable's storage descriptor and an optional hyperslab
//! section, materializes the requested bytes as a typed, row-major array. Header
//! parsing, the file/variable/group object model, and attribute charset decoding are
//! external collaborators; this crate only owns the read path from a storage descriptor
//! down to bytes.

pub mod error;
pub mod options;
pub mod io;
pub mod math;
pub mod section;
pub mod descriptor;

pub mod fill;
pub mod segments;
pub mod compress;
pub mod directive;
pub mod layout;
pub mod copy;

pub mod array;
pub mod variable;
pub mod structure;
pub mod reader;

/// Re-exports of the types most callers need for a simple read.
pub mod prelude {
    pub use crate::array::{Array, TypedArray};
    pub use crate::descriptor::{
        ByteOrder, Chunk, ChunkData, CompressionKind, CompressionSpec, ContiguousOrLinked, DataType, Member, MemberDescriptor,
        Storage, StorageDescriptor,
    };
    pub use crate::error::{self, Error, Result};
    pub use crate::options::{CancellationToken, ReaderOptions};
    pub use crate::reader::{is_valid_file, HeaderHandle, Message, MessageResponse, Reader, VariableData};
    pub use crate::section::{Range, Section, Shape};
    pub use crate::structure::Record;
}
