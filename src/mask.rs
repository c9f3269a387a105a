use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SubsetError};

// ---------------------------------------------------------------------------
// Shape – the extent of a dataset
// ---------------------------------------------------------------------------

/// Extent of a dataset: one entry per axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Shape(dims.into())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all axes). Saturates at
    /// `usize::MAX` instead of overflowing.
    pub fn size(&self) -> usize {
        self.0
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .unwrap_or(usize::MAX)
    }

    /// Length of `axis`, or 1 when the shape has fewer axes.
    pub fn axis_len(&self, axis: usize) -> usize {
        self.0.get(axis).copied().unwrap_or(1)
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape(vec![n])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [n] => write!(f, "({n},)"),
            dims => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SetOp – the three binary set operations
// ---------------------------------------------------------------------------

/// Binary set operation shared by masks and node-id sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Intersection,
    SymmetricDifference,
}

impl SetOp {
    /// Element-wise rule.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            SetOp::Union => a | b,
            SetOp::Intersection => a & b,
            SetOp::SymmetricDifference => a ^ b,
        }
    }

    /// Same operation on ordered sets.
    pub fn apply_sets<T: Ord + Clone>(self, a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
        match self {
            SetOp::Union => a.union(b).cloned().collect(),
            SetOp::Intersection => a.intersection(b).cloned().collect(),
            SetOp::SymmetricDifference => a.symmetric_difference(b).cloned().collect(),
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetOp::Union => "union",
            SetOp::Intersection => "intersection",
            SetOp::SymmetricDifference => "symmetric difference",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Mask – per-element membership
// ---------------------------------------------------------------------------

/// Boolean membership array stored flat, one entry per dataset element.
///
/// The flat position of an element is the index used everywhere else in the
/// crate: index lists, tree index maps and region pixel enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    shape: Shape,
    values: Vec<bool>,
}

impl Mask {
    /// Wrap `values`, rejecting a length that disagrees with `shape`.
    pub fn new(shape: impl Into<Shape>, values: Vec<bool>) -> Result<Self> {
        let shape = shape.into();
        if values.len() != shape.size() {
            return Err(SubsetError::ShapeMismatch {
                expected: shape,
                got: Shape::from(values.len()),
            });
        }
        Ok(Mask { shape, values })
    }

    /// All-false mask.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        let values = vec![false; shape.size()];
        Mask { shape, values }
    }

    /// Mask with `true` at every listed flat index; out-of-range indices are ignored.
    pub fn from_indices(shape: impl Into<Shape>, indices: &[usize]) -> Self {
        let mut mask = Mask::zeros(shape);
        for &i in indices {
            if let Some(slot) = mask.values.get_mut(i) {
                *slot = true;
            }
        }
        mask
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.values.get(index).copied()
    }

    /// Number of selected elements.
    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    pub fn any(&self) -> bool {
        self.values.iter().any(|&v| v)
    }

    /// Ascending flat positions of the selected elements.
    pub fn nonzero(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
            .collect()
    }

    /// Combine two masks of the same shape element by element.
    pub fn combine(&self, other: &Mask, op: SetOp) -> Result<Mask> {
        if self.shape != other.shape {
            return Err(SubsetError::ShapeMismatch {
                expected: self.shape.clone(),
                got: other.shape.clone(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| op.apply(a, b))
            .collect();
        Ok(Mask {
            shape: self.shape.clone(),
            values,
        })
    }

    /// Compact 0/1 encoding used by mask export.
    pub fn to_i16(&self) -> Vec<i16> {
        self.values.iter().map(|&v| i16::from(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &[u8]) -> Mask {
        Mask::new(bits.len(), bits.iter().map(|&b| b == 1).collect()).unwrap()
    }

    #[test]
    fn test_shape_size_saturates() {
        assert_eq!(Shape::from([usize::MAX, 2]).size(), usize::MAX);
        assert_eq!(Shape::from([usize::MAX, 0]).size(), 0);
        assert_eq!(Shape::new(Vec::<usize>::new()).size(), 1);
    }

    #[test]
    fn test_shape_size_and_display() {
        let s = Shape::from([5usize, 4]);
        assert_eq!(s.size(), 20);
        assert_eq!(s.to_string(), "(5, 4)");
        assert_eq!(Shape::from(10usize).to_string(), "(10,)");
        assert_eq!(s.axis_len(2), 1);
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Mask::new([2usize, 2], vec![true; 3]).unwrap_err();
        assert!(matches!(err, SubsetError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_combine_ops() {
        let a = mask(&[1, 0, 1, 0]);
        let b = mask(&[1, 1, 0, 0]);
        assert_eq!(a.combine(&b, SetOp::Union).unwrap(), mask(&[1, 1, 1, 0]));
        assert_eq!(a.combine(&b, SetOp::Intersection).unwrap(), mask(&[1, 0, 0, 0]));
        assert_eq!(
            a.combine(&b, SetOp::SymmetricDifference).unwrap(),
            mask(&[0, 1, 1, 0])
        );
    }

    #[test]
    fn test_combine_shape_mismatch() {
        let a = Mask::zeros(4usize);
        let b = Mask::zeros([2usize, 2]);
        assert!(a.combine(&b, SetOp::Union).is_err());
    }

    #[test]
    fn test_nonzero_and_indices() {
        let m = Mask::from_indices(6usize, &[4, 1, 9]);
        assert_eq!(m.nonzero(), vec![1, 4]);
        assert_eq!(m.count(), 2);
        assert_eq!(m.to_i16(), vec![0, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_apply_sets() {
        let a: BTreeSet<i64> = [1, 2, 3].into();
        let b: BTreeSet<i64> = [3, 4].into();
        assert_eq!(SetOp::Union.apply_sets(&a, &b), BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(SetOp::Intersection.apply_sets(&a, &b), BTreeSet::from([3]));
        assert_eq!(SetOp::SymmetricDifference.apply_sets(&a, &b), BTreeSet::from([1, 2, 4]));
    }
}
