use crate::data::dataset::Dataset;
use crate::error::{Result, SubsetError};
use crate::mask::Mask;

/// Explicit per-element membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSelection {
    mask: Mask,
}

impl ElementSelection {
    /// All-false selection sized to `data`.
    pub(crate) fn empty(data: &Dataset) -> Self {
        ElementSelection {
            mask: Mask::zeros(data.shape().clone()),
        }
    }

    pub(crate) fn with_mask(data: &Dataset, mask: Mask) -> Result<Self> {
        check_shape(data, &mask)?;
        Ok(ElementSelection { mask })
    }

    /// Caller has already checked the shape against the dataset.
    pub(crate) fn with_mask_unchecked(mask: Mask) -> Self {
        ElementSelection { mask }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

/// A mask is only ever stored on a subset when its shape is the dataset's.
pub(crate) fn check_shape(data: &Dataset, mask: &Mask) -> Result<()> {
    if mask.shape() != data.shape() {
        return Err(SubsetError::ShapeMismatch {
            expected: data.shape().clone(),
            got: mask.shape().clone(),
        });
    }
    Ok(())
}
