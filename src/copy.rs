//! Component E: the copy engine (§4.E). Executes a batch of [`CopyDirective`]s against
//! either a random-access file (seek per directive) or a forward-only byte source
//! (monotonic cursor, no seeking) and writes decoded, host-endian elements into an
//! output buffer. Endian conversion itself is left to the caller (`variable.rs`), which
//! runs one whole-buffer `Data::read_be_slice` pass afterwards -- the engine here only
//! moves raw bytes, the same way the teacher's block reader moves raw pixel rows before
//! a later, separate decode step.

use std::io::{Read, SeekFrom};

use crate::directive::CopyDirective;
use crate::error::{Error, Result};
use crate::io::{skip_bytes, RandomAccessFile};
use crate::options::CancellationToken;

/// Positioned mode: seek to each directive's `source_pos` and read its bytes directly
/// into `out`. Used whenever the storage's byte addresses are real file offsets
/// (uncompressed contiguous, segmented, and chunked reads). `cancellation` is polled
/// once per directive -- the closest this eagerly-enumerated directive batch gets to
/// the per-outer-dimension checkpoints described in §5.
pub fn read_positioned(
    file: &mut impl RandomAccessFile, element_size: usize, directives: &[CopyDirective], out: &mut [u8],
    cancellation: Option<&CancellationToken>,
) -> Result<()> {
    for directive in directives {
        if let Some(token) = cancellation {
            token.check()?;
        }

        let span = directive.element_count * element_size;
        let dest_start = directive.dest_element * element_size;

        file.seek(SeekFrom::Start(directive.source_pos))?;
        file.read_exact(&mut out[dest_start .. dest_start + span])?;
    }

    Ok(())
}

/// Streaming mode: consume `source` with a monotonically advancing cursor, discarding
/// bytes up to each directive's `source_pos` before reading its span. Directives MUST
/// arrive in non-decreasing `source_pos` order (the enumerator's contract); violating it
/// is a bug in the caller, not a malformed file, so it is a `debug_assert!` rather than
/// a runtime error.
pub fn read_streaming(
    source: &mut impl Read, element_size: usize, directives: &[CopyDirective], out: &mut [u8],
    cancellation: Option<&CancellationToken>,
) -> Result<()> {
    let mut cursor = 0_u64;

    for directive in directives {
        if let Some(token) = cancellation {
            token.check()?;
        }

        debug_assert!(directive.source_pos >= cursor, "streaming directives must be source-ascending");

        let gap = directive.source_pos.saturating_sub(cursor);
        skip_bytes(source, gap)?;
        cursor += gap;

        let span = directive.element_count * element_size;
        let dest_start = directive.dest_element * element_size;

        source.read_exact(&mut out[dest_start .. dest_start + span]).map_err(Error::from)?;
        cursor += span as u64;
    }

    Ok(())
}
