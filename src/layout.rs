//! Component D: the three concrete layout enumerators (§4.D).
//!
//! D1 (regular) lives in [`crate::directive::enumerate_regular`]; this module builds D2
//! (segmented) on top of it and implements D3 (tiled) directly, since tiled intersection
//! has no equivalent in the regular case to reuse.

use crate::descriptor::Chunk;
use crate::directive::{enumerate_regular, CopyDirective};
use crate::error::{Error, Result};
use crate::math::row_major_strides;
use crate::section::Section;

/// A non-zero-length segment, positioned in the logical (segment-concatenated) address
/// space. Built once per read by dropping zero-length entries and accumulating offsets.
struct LogicalSegment {
    logical_start: u64,
    file_offset: u64,
    length: u64,
}

fn filter_segments(segments: &[(u64, u64)]) -> Vec<LogicalSegment> {
    let mut filtered = Vec::with_capacity(segments.len());
    let mut cursor = 0_u64;

    for &(file_offset, length) in segments {
        if length == 0 {
            continue;
        }

        filtered.push(LogicalSegment { logical_start: cursor, file_offset, length });
        cursor += length;
    }

    filtered
}

fn locate_segment(segments: &[LogicalSegment], logical_offset: u64) -> Result<&LogicalSegment> {
    segments
        .iter()
        .find(|segment| logical_offset >= segment.logical_start && logical_offset < segment.logical_start + segment.length)
        .ok_or_else(|| Error::truncated("requested byte lies past the end of the linked-segment stream"))
}

/// D2: enumerate a regular n-dimensional read against a logical, zero-based address
/// space, then split every directive that crosses a segment boundary into per-segment
/// directives whose `source_pos` is the real file offset (§4.D2).
pub fn enumerate_segmented(
    element_size: usize, full_shape: &[usize], section: &Section, segments: &[(u64, u64)],
) -> Result<Vec<CopyDirective>> {
    let filtered = filter_segments(segments);
    let logical_directives = enumerate_regular(0, element_size, full_shape, section);

    let mut split = Vec::with_capacity(logical_directives.len());
    for directive in logical_directives {
        split.extend(split_across_segments(element_size, directive, &filtered)?);
    }

    Ok(split)
}

fn split_across_segments(element_size: usize, directive: CopyDirective, segments: &[LogicalSegment]) -> Result<Vec<CopyDirective>> {
    let mut directives = Vec::new();
    let mut consumed = 0_usize;

    while consumed < directive.element_count {
        let logical_offset = directive.source_pos + consumed as u64 * element_size as u64;
        let segment = locate_segment(segments, logical_offset)?;

        let file_offset = segment.file_offset + (logical_offset - segment.logical_start);
        let bytes_left_in_segment = segment.length - (logical_offset - segment.logical_start);
        let elements_left_in_segment = (bytes_left_in_segment / element_size as u64) as usize;

        let run = elements_left_in_segment.min(directive.element_count - consumed).max(1);

        directives.push(CopyDirective {
            source_pos: file_offset,
            dest_element: directive.dest_element + consumed,
            element_count: run,
        });

        consumed += run;
    }

    Ok(directives)
}

/// D3: one chunk's worth of destination-addressed copy directives, with `source_pos`
/// expressed as a chunk-local byte offset (0-based within that chunk's own element
/// space) -- the caller decides how to turn that into bytes (seek into the file for an
/// uncompressed chunk, or index into an in-memory decompressed buffer for a compressed
/// one).
pub struct ChunkPlan<'chunks> {
    pub chunk: &'chunks Chunk,
    pub directives: Vec<CopyDirective>,
}

/// Enumerate every chunk that intersects `section`, skipping disjoint chunks (§4.D3).
/// Chunks are visited in their given order; a later, overlapping chunk's directives
/// naturally win when applied after an earlier one's (the documented tie-break).
pub fn enumerate_tiled<'chunks>(
    chunks: &'chunks [Chunk], chunk_shape: &[usize], element_size: usize, section: &Section,
) -> Vec<ChunkPlan<'chunks>> {
    let mut plans = Vec::new();

    for chunk in chunks {
        debug_assert_eq!(chunk.origin.len(), chunk_shape.len(), "chunk origin rank must match chunk_shape rank");

        for (&origin, &extent) in chunk.origin.iter().zip(chunk_shape.iter()) {
            debug_assert_eq!(origin % extent, 0, "chunk origin must be aligned to chunk_shape (§9 open question)");
        }

        if let Some(overlap) = intersect_chunk(chunk_shape, &chunk.origin, section) {
            let directives = enumerate_chunk_directives(chunk_shape, &chunk.origin, element_size, section, &overlap);

            if !directives.is_empty() {
                plans.push(ChunkPlan { chunk, directives });
            }
        }
    }

    plans
}

/// Per-dimension `[k_lo, k_hi)` range of section-local indices whose absolute coordinate
/// falls inside the chunk's box. `None` if any dimension has an empty intersection.
fn intersect_chunk(chunk_shape: &[usize], origin: &[usize], section: &Section) -> Option<Vec<(usize, usize)>> {
    let rank = section.ranges.len();
    let mut overlap = Vec::with_capacity(rank);

    for d in 0 .. rank {
        let range = section.ranges[d];
        if range.length == 0 {
            return None;
        }

        let chunk_start = origin[d];
        let chunk_end = origin[d] + chunk_shape[d];

        let k_lo = if chunk_start <= range.start {
            0
        }
        else {
            let diff = chunk_start - range.start;
            (diff + range.stride - 1) / range.stride
        };

        let k_hi = if chunk_end == 0 || chunk_end - 1 < range.start {
            0
        }
        else {
            let last_reachable = chunk_end - 1;
            (last_reachable - range.start) / range.stride + 1
        };

        let k_lo = k_lo.min(range.length);
        let k_hi = k_hi.min(range.length);

        if k_lo >= k_hi {
            return None;
        }

        overlap.push((k_lo, k_hi));
    }

    Some(overlap)
}

fn enumerate_chunk_directives(
    chunk_shape: &[usize], origin: &[usize], element_size: usize, section: &Section, overlap: &[(usize, usize)],
) -> Vec<CopyDirective> {
    let rank = section.ranges.len();
    if rank == 0 {
        return vec![CopyDirective { source_pos: 0, dest_element: 0, element_count: 1 }];
    }

    let chunk_strides = row_major_strides(chunk_shape);
    let dest_lengths = section.lengths();
    let dest_strides = row_major_strides(&dest_lengths);
    let innermost = rank - 1;

    let (lo, hi) = overlap[innermost];
    let run_length = if section.ranges[innermost].stride == 1 { hi - lo } else { 1 };

    let mut directives = Vec::new();
    let mut outer_k: Vec<usize> = overlap.iter().map(|&(lo, _)| lo).collect();

    loop {
        let mut k = lo;
        while k < hi {
            let source_element: usize = (0 .. rank)
                .map(|d| {
                    let k_d = if d == innermost { k } else { outer_k[d] };
                    let absolute = section.ranges[d].start + k_d * section.ranges[d].stride;
                    (absolute - origin[d]) * chunk_strides[d]
                })
                .sum();

            let dest_element: usize = (0 .. rank)
                .map(|d| {
                    let k_d = if d == innermost { k } else { outer_k[d] };
                    k_d * dest_strides[d]
                })
                .sum();

            directives.push(CopyDirective {
                source_pos: source_element as u64 * element_size as u64,
                dest_element,
                element_count: run_length,
            });

            k += run_length.max(1);
        }

        if innermost == 0 {
            break;
        }

        let mut carry = true;
        for d in (0 .. innermost).rev() {
            outer_k[d] += 1;
            if outer_k[d] < overlap[d].1 {
                carry = false;
                break;
            }

            outer_k[d] = overlap[d].0;
        }

        if carry {
            break;
        }
    }

    directives
}
