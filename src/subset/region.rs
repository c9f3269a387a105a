use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::data::dataset::Dataset;
use crate::data::region::Region;
use crate::error::Result;
use crate::mask::Mask;

/// Selection by a geometric region in world coordinates.
#[derive(Clone, Default)]
pub struct RegionSelection {
    region: Option<Rc<dyn Region>>,
}

impl RegionSelection {
    pub(crate) fn new(region: Option<Rc<dyn Region>>) -> Self {
        RegionSelection { region }
    }

    pub fn region(&self) -> Option<&Rc<dyn Region>> {
        self.region.as_ref()
    }

    /// Evaluate the region on every element of `data`.
    ///
    /// Element `i` (flat index) sits at pixel `x = i % shape[0]`,
    /// `y = (i / shape[0]) % shape[1]`, so the first axis varies fastest.
    /// Pixels go through the dataset's coordinate transform before
    /// `contains` sees them. An absent or undefined region selects nothing.
    pub(crate) fn to_mask(&self, data: &Dataset) -> Result<Mask> {
        let shape = data.shape();
        let Some(region) = self.region.as_ref().filter(|r| r.is_defined()) else {
            return Ok(Mask::zeros(shape.clone()));
        };

        let nx = shape.axis_len(0);
        let ny = shape.axis_len(1);
        let coords = data.coordinates();
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..shape.size())
            .map(|i| {
                let x = i % nx;
                let y = (i / nx) % ny;
                coords.pixel_to_world(x as f64, y as f64)
            })
            .unzip();

        trace!("{}: region mask over {} pixels", data.id(), xs.len());
        Mask::new(shape.clone(), region.contains(&xs, &ys))
    }
}

impl fmt::Debug for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionSelection")
            .field("defined", &self.region.as_ref().is_some_and(|r| r.is_defined()))
            .finish()
    }
}
