//! The copy directive shared by all three layout enumerators (§4.D common contract).

/// One instruction for the copy engine: copy `element_count` contiguous elements from
/// `source_pos` (a byte offset, either into the raw file or into a logical byte-source
/// stream) to `dest_element` (an element index into the destination buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyDirective {
    pub source_pos: u64,
    pub dest_element: usize,
    pub element_count: usize,
}

use crate::math::{increment_row_major_index, row_major_strides};
use crate::section::Section;

/// The classic n-dimensional index enumerator shared by the regular and segmented
/// layouts (§4.D1): walk the outer dimensions of `section`, emitting one directive per
/// contiguous run in the innermost dimension. Source addresses are `base_offset +
/// element_index * element_size`; destination addresses are the section's own row-major
/// element index, so the output is always dense regardless of how sparse the source
/// strides are.
pub fn enumerate_regular(
    base_offset: u64, element_size: usize, full_shape: &[usize], section: &Section,
) -> Vec<CopyDirective> {
    let rank = section.ranges.len();
    if rank == 0 {
        return vec![CopyDirective { source_pos: base_offset, dest_element: 0, element_count: 1 }];
    }

    // An empty hyperslab (any dimension with length 0) selects zero elements; the loop
    // below never visits a zero-extent dimension via `increment_row_major_index`, but it
    // would still execute its body once for the initial `outer_index`, so this has to be
    // caught up front rather than left to the post-hoc bounds check.
    if section.ranges.iter().any(|range| range.length == 0) {
        return Vec::new();
    }

    let source_strides = row_major_strides(full_shape);
    let dest_lengths = section.lengths();
    let dest_strides = row_major_strides(&dest_lengths);

    let innermost = rank - 1;
    let run_length = if section.ranges[innermost].stride == 1 { section.ranges[innermost].length } else { 1 };

    let mut directives = Vec::new();
    let mut outer_index = vec![0_usize; rank];
    let outer_extents: Vec<usize> = dest_lengths.iter().copied().collect();

    loop {
        let mut inner = 0;
        while inner < dest_lengths[innermost] {
            let source_element: usize = (0 .. rank)
                .map(|d| {
                    let coordinate = section.ranges[d].start + outer_index[d] * section.ranges[d].stride;
                    let coordinate = if d == innermost { coordinate + inner * section.ranges[d].stride } else { coordinate };
                    coordinate * source_strides[d]
                })
                .sum();

            let dest_element: usize = (0 .. rank)
                .map(|d| {
                    let coordinate = if d == innermost { outer_index[d] + inner } else { outer_index[d] };
                    coordinate * dest_strides[d]
                })
                .sum();

            directives.push(CopyDirective {
                source_pos: base_offset + source_element as u64 * element_size as u64,
                dest_element,
                element_count: run_length,
            });

            inner += run_length.max(1);
        }

        // advance all but the innermost dimension; the innermost is fully covered by the
        // inner loop above (either as one run or as `run_length` separate directives).
        if rank == 1 || !increment_row_major_index(&mut outer_index[.. innermost], &outer_extents[.. innermost]) {
            break;
        }
    }

    directives
}
