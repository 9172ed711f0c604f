//! §6 outward interface: the one type callers actually hold on to.

use crate::array::Array;
use crate::descriptor::StorageDescriptor;
use crate::error::{Error, Result};
use crate::io::{read_hdf4_magic, RandomAccessFile};
use crate::options::{CancellationToken, ReaderOptions};
use crate::section::Section;
use crate::structure::{read_structure, Record};
use crate::variable::read_variable;

/// Probe `file`'s magic region for the HDF4 signature, without otherwise touching it
/// (§6: "the core implements the four-byte magic-number probe itself").
pub fn is_valid_file(file: &mut impl RandomAccessFile) -> Result<bool> {
    read_hdf4_magic(file)
}

/// The result of a `read_data` call: a typed array for ordinary variables, or a flat
/// record array for `STRUCT` variables (§4.F step 1 / §4.G).
#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    Array(Array),
    Records(Vec<Record>),
}

/// The `send_message` extensibility channel (§6). Kept deliberately small: the core has
/// no header object of its own (that belongs to the external header parser), so `Header`
/// only surfaces the one bit of header state this core actually tracks.
#[derive(Debug, Clone)]
pub enum Message {
    Header,
    CharsetValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageResponse {
    Header(HeaderHandle),
    PreviousCharsetValue(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderHandle {
    pub is_eos: bool,
}

/// A reader bound to one random-access file. Holds no variable descriptors of its own --
/// those are produced and owned by the external header parser and passed into
/// `read_data` by the caller each time.
pub struct Reader<F> {
    file: F,
    options: ReaderOptions,
    is_eos: bool,
    charset: Option<String>,
}

impl<F: RandomAccessFile> Reader<F> {
    /// Confirm the magic region and bind `file`. The header parser is expected to run
    /// separately and call [`Reader::set_file_type`] once it knows the EOS flag.
    pub fn open(mut file: F, options: ReaderOptions) -> Result<Self> {
        if !read_hdf4_magic(&mut file)? {
            return Err(Error::internal("file does not start with the HDF4 magic sequence"));
        }

        Ok(Reader { file, options, is_eos: false, charset: None })
    }

    pub fn with_default_options(file: F) -> Result<Self> {
        Self::open(file, ReaderOptions::default())
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Record the header's EOS flag, consulted by [`Reader::file_type_id`].
    pub fn set_file_type(&mut self, is_eos: bool) {
        self.is_eos = is_eos;
    }

    pub fn file_type_id(&self) -> &'static str {
        if self.is_eos { "HDF4-EOS" } else { "HDF4" }
    }

    /// §4.F/§4.G contract: dispatches to the structure reader for `STRUCT` variables,
    /// the ordinary variable reader otherwise.
    ///
    /// `prepare`, when given, is invoked once against the bound file before `variable`'s
    /// storage is inspected (§6: "the core calls `prepare` once per read before
    /// inspecting storage") -- the header parser's hook for lazily populating on-demand
    /// fields such as a chunk list, before this core treats the descriptor as complete.
    ///
    /// When `options.pedantic` is set, the descriptor's segment/chunk tables are validated
    /// eagerly, up front, rather than being left to surface a lazy error partway through
    /// the enumerator or copy engine.
    pub fn read_data(
        &mut self, variable: &StorageDescriptor, section: Option<&Section>, cancellation: Option<&CancellationToken>,
        prepare: Option<&mut dyn FnMut(&mut F) -> Result<()>>,
    ) -> Result<VariableData> {
        if let Some(prepare) = prepare {
            prepare(&mut self.file)?;
        }

        variable.validate_element_size()?;

        if self.options.pedantic {
            variable.validate_storage()?;
        }

        if variable.is_struct() {
            Ok(VariableData::Records(read_structure(&mut self.file, variable, section, cancellation)?))
        }
        else {
            Ok(VariableData::Array(read_variable(&mut self.file, variable, section, cancellation)?))
        }
    }

    /// Rebind the reader to a freshly reopened file handle. All descriptors handed to
    /// `read_data` remain valid, since the reader never caches anything keyed by the old
    /// handle's identity.
    pub fn reacquire(&mut self, file: F) {
        self.file = file;
    }

    pub fn send_message(&mut self, message: Message) -> MessageResponse {
        match message {
            Message::Header => MessageResponse::Header(HeaderHandle { is_eos: self.is_eos }),
            Message::CharsetValue(charset) => MessageResponse::PreviousCharsetValue(self.charset.replace(charset)),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use smallvec::smallvec;

    use super::*;
    use crate::array::TypedArray;
    use crate::descriptor::{ByteOrder, DataType, Storage};
    use crate::io::HDF4_MAGIC;

    fn file_with_magic(rest: &[u8]) -> Cursor<Vec<u8>> {
        let mut data = HDF4_MAGIC.to_vec();
        data.extend_from_slice(rest);
        Cursor::new(data)
    }

    #[test]
    fn open_rejects_a_file_without_the_magic() {
        let file = Cursor::new(vec![0_u8; 8]);
        assert!(Reader::with_default_options(file).is_err());
    }

    #[test]
    fn open_accepts_the_magic_and_reports_file_type() {
        let file = file_with_magic(&[]);
        let mut reader = Reader::with_default_options(file).unwrap();
        assert_eq!(reader.file_type_id(), "HDF4");

        reader.set_file_type(true);
        assert_eq!(reader.file_type_id(), "HDF4-EOS");
    }

    #[test]
    fn read_data_dispatches_to_the_ordinary_variable_path() {
        let file = file_with_magic(&[0, 0, 0, 7]);
        let mut reader = Reader::with_default_options(file).unwrap();

        let descriptor = StorageDescriptor {
            element_size: 4,
            shape: smallvec![1],
            data_type: DataType::I32,
            byte_order: ByteOrder::BigEndian,
            fill_value: None,
            has_no_data: false,
            storage: Storage::Contiguous { start: 4, length: 4 },
            compressed: None,
            members: Vec::new(),
        };

        match reader.read_data(&descriptor, None, None, None).unwrap() {
            VariableData::Array(array) => assert_eq!(array.data, TypedArray::I32(vec![7])),
            VariableData::Records(_) => panic!("expected an array"),
        }
    }

    #[test]
    fn prepare_runs_once_before_storage_is_inspected() {
        let file = file_with_magic(&[0, 0, 0, 7]);
        let mut reader = Reader::with_default_options(file).unwrap();

        let descriptor = StorageDescriptor {
            element_size: 4,
            shape: smallvec![1],
            data_type: DataType::I32,
            byte_order: ByteOrder::BigEndian,
            fill_value: None,
            has_no_data: false,
            storage: Storage::Contiguous { start: 4, length: 4 },
            compressed: None,
            members: Vec::new(),
        };

        let mut calls = 0;
        let mut prepare = |_file: &mut Cursor<Vec<u8>>| {
            calls += 1;
            Ok(())
        };

        let result = reader.read_data(&descriptor, None, None, Some(&mut prepare)).unwrap();
        assert_eq!(calls, 1);
        assert!(matches!(result, VariableData::Array(_)));
    }

    #[test]
    fn send_message_tracks_the_charset_and_header_flag() {
        let file = file_with_magic(&[]);
        let mut reader = Reader::with_default_options(file).unwrap();
        reader.set_file_type(true);

        let previous = reader.send_message(Message::CharsetValue("UTF-8".to_string()));
        assert_eq!(previous, MessageResponse::PreviousCharsetValue(None));

        let header = reader.send_message(Message::Header);
        assert_eq!(header, MessageResponse::Header(HeaderHandle { is_eos: true }));
    }
}
