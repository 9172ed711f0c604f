//! The hyperslab request model (§3 "Section (hyperslab request)").

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::math::product;

/// Most HDF4 variables are low rank; inline up to 4 dimensions before spilling to the heap.
pub type Shape = SmallVec<[usize; 4]>;
pub type Ranges = SmallVec<[Range; 4]>;

/// One dimension of a requested hyperslab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub length: usize,
    pub stride: usize,
}

impl Range {
    pub fn full(extent: usize) -> Self {
        Range { start: 0, length: extent, stride: 1 }
    }

    fn validate(&self, extent: usize) -> Result<()> {
        if self.stride == 0 {
            return Err(Error::invalid_section("stride must be at least 1"));
        }

        if self.length == 0 {
            return Ok(());
        }

        let last = self.start + (self.length - 1) * self.stride;
        if last >= extent {
            return Err(Error::invalid_section(format!(
                "range start={} length={} stride={} exceeds extent {}",
                self.start, self.length, self.stride, extent
            )));
        }

        Ok(())
    }
}

/// A rectangular sub-region of a multidimensional array: one [`Range`] per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    pub ranges: Ranges,
}

impl Section {
    pub fn full(shape: &[usize]) -> Self {
        Section { ranges: shape.iter().copied().map(Range::full).collect() }
    }

    /// The output shape this section produces: one length per dimension.
    pub fn lengths(&self) -> Shape {
        self.ranges.iter().map(|range| range.length).collect()
    }

    /// Total number of elements the section selects.
    pub fn element_count(&self) -> usize {
        product(&self.lengths())
    }

    /// Complete a possibly-null/partial section against the variable's full shape
    /// (§3: "the reader completes it to the full shape ... before use"), validating every
    /// dimension against its extent.
    pub fn complete(section: Option<&Section>, shape: &[usize]) -> Result<Section> {
        match section {
            None => Ok(Section::full(shape)),

            Some(section) => {
                if section.ranges.len() != shape.len() {
                    return Err(Error::invalid_section(format!(
                        "section has rank {} but variable has rank {}",
                        section.ranges.len(), shape.len()
                    )));
                }

                for (range, &extent) in section.ranges.iter().zip(shape.iter()) {
                    range.validate(extent)?;
                }

                Ok(section.clone())
            }
        }
    }
}
