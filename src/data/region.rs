/// Geometric predicate over world coordinates.
///
/// A region may be only partially specified (e.g. while a user is still
/// drawing it); `is_defined` reports whether `contains` is meaningful.
pub trait Region {
    fn is_defined(&self) -> bool;

    /// Membership for each `(xs[i], ys[i])` pair. Both slices have equal length.
    fn contains(&self, xs: &[f64], ys: &[f64]) -> Vec<bool>;
}

// ---------------------------------------------------------------------------
// Rectangle
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle, inclusive on all edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectangularRegion {
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
}

impl RectangularRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bounds(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        let mut r = Self::new();
        r.set_x_range(xmin, xmax);
        r.set_y_range(ymin, ymax);
        r
    }

    /// Bounds may be given in either order.
    pub fn set_x_range(&mut self, a: f64, b: f64) {
        self.x_range = Some((a.min(b), a.max(b)));
    }

    pub fn set_y_range(&mut self, a: f64, b: f64) {
        self.y_range = Some((a.min(b), a.max(b)));
    }
}

impl Region for RectangularRegion {
    fn is_defined(&self) -> bool {
        self.x_range.is_some() && self.y_range.is_some()
    }

    fn contains(&self, xs: &[f64], ys: &[f64]) -> Vec<bool> {
        let (Some((x0, x1)), Some((y0, y1))) = (self.x_range, self.y_range) else {
            return vec![false; xs.len()];
        };
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| x >= x0 && x <= x1 && y >= y0 && y <= y1)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// Closed polygon tested with the even-odd rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonRegion {
    vertices: Vec<(f64, f64)>,
}

impl PolygonRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vertices(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    pub fn add_vertex(&mut self, x: f64, y: f64) {
        self.vertices.push((x, y));
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    fn contains_point(&self, x: f64, y: f64) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl Region for PolygonRegion {
    fn is_defined(&self) -> bool {
        self.vertices.len() >= 3
    }

    fn contains(&self, xs: &[f64], ys: &[f64]) -> Vec<bool> {
        if !self.is_defined() {
            return vec![false; xs.len()];
        }
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| self.contains_point(x, y))
            .collect()
    }
}
