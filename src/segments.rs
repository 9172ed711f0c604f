//! Component B: the linked-segment byte source (§4.B).
//!
//! Presents an ordered list of `(offset, length)` file segments as one contiguous,
//! forward-only, single-pass readable stream. Grounded on the teacher's `PeekRead<T>`
//! (`src/io.rs`): a small state machine over an inner reader, here re-targeted at
//! re-seeking a random-access file per segment instead of peeking one byte ahead.

use std::io::{Read, Seek, SeekFrom};

use smallvec::SmallVec;

use crate::io::RandomAccessFile;

/// Reads the concatenation of a list of file segments as one logical byte stream.
/// Zero-length segments are skipped (§3, §4.B).
pub struct LinkedSegmentSource<'file, F> {
    file: &'file mut F,
    segments: SmallVec<[(u64, u64); 4]>,
    next_segment: usize,
    buffer: Vec<u8>,
    position_in_buffer: usize,
}

impl<'file, F: RandomAccessFile> LinkedSegmentSource<'file, F> {
    pub fn new(file: &'file mut F, segments: SmallVec<[(u64, u64); 4]>) -> Self {
        LinkedSegmentSource { file, segments, next_segment: 0, buffer: Vec::new(), position_in_buffer: 0 }
    }

    /// Advance past any exhausted or zero-length segments and load the next one's bytes.
    /// Returns `Ok(false)` once the segment list is exhausted.
    fn refill(&mut self) -> std::io::Result<bool> {
        while self.next_segment < self.segments.len() {
            let (offset, length) = self.segments[self.next_segment];
            self.next_segment += 1;

            if length == 0 {
                continue;
            }

            self.file.seek(SeekFrom::Start(offset))?;
            let mut buffer = vec![0_u8; length as usize];
            self.file.read_exact(&mut buffer)?;

            self.buffer = buffer;
            self.position_in_buffer = 0;
            return Ok(true);
        }

        Ok(false)
    }
}

impl<'file, F: RandomAccessFile> Read for LinkedSegmentSource<'file, F> {
    fn read(&mut self, target: &mut [u8]) -> std::io::Result<usize> {
        if target.is_empty() {
            return Ok(0);
        }

        if self.position_in_buffer >= self.buffer.len() && !self.refill()? {
            return Ok(0); // end of stream
        }

        let available = &self.buffer[self.position_in_buffer ..];
        let take = available.len().min(target.len());
        target[.. take].copy_from_slice(&available[.. take]);
        self.position_in_buffer += take;
        Ok(take)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn file_with(contents: &[(u64, &[u8])]) -> Cursor<Vec<u8>> {
        let end = contents.iter().map(|(offset, bytes)| *offset as usize + bytes.len()).max().unwrap_or(0);
        let mut data = vec![0_u8; end];

        for (offset, bytes) in contents {
            data[*offset as usize .. *offset as usize + bytes.len()].copy_from_slice(bytes);
        }

        Cursor::new(data)
    }

    #[test]
    fn concatenates_segments_in_order() {
        let mut file = file_with(&[(200, &[0, 0, 0, 7, 0, 0, 0, 8]), (400, &[0, 0, 0, 9, 0, 0, 0, 0x0A])]);
        let segments = smallvec::smallvec![(200, 8), (400, 8)];
        let mut source = LinkedSegmentSource::new(&mut file, segments);

        let mut all = Vec::new();
        source.read_to_end(&mut all).unwrap();
        assert_eq!(all, vec![0, 0, 0, 7, 0, 0, 0, 8, 0, 0, 0, 9, 0, 0, 0, 0x0A]);
    }

    #[test]
    fn skips_zero_length_segments() {
        let mut file = file_with(&[(200, &[0, 0, 0, 7, 0, 0, 0, 8]), (400, &[0, 0, 0, 9, 0, 0, 0, 0x0A])]);
        let segments = smallvec::smallvec![(200, 8), (0, 0), (400, 8)];
        let mut source = LinkedSegmentSource::new(&mut file, segments);

        let mut all = Vec::new();
        source.read_to_end(&mut all).unwrap();
        assert_eq!(all, vec![0, 0, 0, 7, 0, 0, 0, 8, 0, 0, 0, 9, 0, 0, 0, 0x0A]);
    }

    #[test]
    fn reads_are_fully_consumed_with_smaller_buffers() {
        let mut file = file_with(&[(0, &[1, 2, 3, 4, 5])]);
        let segments = smallvec::smallvec![(0, 5)];
        let mut source = LinkedSegmentSource::new(&mut file, segments);

        let mut first = [0_u8; 2];
        assert_eq!(source.read(&mut first).unwrap(), 2);
        assert_eq!(first, [1, 2]);

        let mut rest = Vec::new();
        source.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![3, 4, 5]);
    }
}
