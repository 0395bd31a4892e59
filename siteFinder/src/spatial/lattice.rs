//! Uniform candidate lattices over a latitude/longitude bounding box.
//!
//! Two index conventions are used:
//! - `Spacing::CellCenters` splits the box into `rows x cols` equal cells and maps
//!   `(i, j)` to the center of the cell. `index_of` is the exact inverse of `point`.
//! - `Spacing::Inclusive` places `rows x cols` points with both box edges included,
//!   the same layout as `linspace(min, max, n)` on each axis.
//!
//! Indices are always `(i = latitude index, j = longitude index)`. The scan order decides
//! which point wins an exact score tie: latitude-major by default, longitude-major for
//! searches that must match a `meshgrid(lat, lon).ravel()` layout.

use rayon::prelude::*;
use crate::data::location::Location;
use crate::error::{PlacementError, PlacementResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_locations(locations: &[Location]) -> PlacementResult<Self> {
        let first = locations.first().ok_or_else(|| {
            PlacementError::DegenerateInput("no locations to bound".to_string())
        })?;

        let init = Self {
            min_lat: first.latitude(),
            max_lat: first.latitude(),
            min_lon: first.longitude(),
            max_lon: first.longitude(),
        };

        Ok(locations.iter().skip(1).fold(init, |b, loc| Self {
            min_lat: b.min_lat.min(loc.latitude()),
            max_lat: b.max_lat.max(loc.latitude()),
            min_lon: b.min_lon.min(loc.longitude()),
            max_lon: b.max_lon.max(loc.longitude()),
        }))
    }

    /// Expands every side by `margin` degrees, staying within WGS84 limits.
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min_lat: (self.min_lat - margin).max(-90.0),
            max_lat: (self.max_lat + margin).min(90.0),
            min_lon: (self.min_lon - margin).max(-180.0),
            max_lon: (self.max_lon + margin).min(180.0),
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn contains(&self, location: &Location) -> bool {
        (self.min_lat..=self.max_lat).contains(&location.latitude())
            && (self.min_lon..=self.max_lon).contains(&location.longitude())
    }

    pub fn ensure_extent(&self) -> PlacementResult<()> {
        if self.lat_span() <= 0.0 {
            return Err(PlacementError::DegenerateInput(format!(
                "all latitudes are identical ({})", self.min_lat
            )));
        }
        if self.lon_span() <= 0.0 {
            return Err(PlacementError::DegenerateInput(format!(
                "all longitudes are identical ({})", self.min_lon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    CellCenters,
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// All longitudes of row 0, then row 1, ...
    LatitudeMajor,
    /// All latitudes of column 0, then column 1, ...
    LongitudeMajor,
}

#[derive(Debug, Clone)]
pub struct Lattice {
    bounds: BoundingBox,
    rows: usize,
    cols: usize,
    spacing: Spacing,
    scan: ScanOrder,
}

/// Winning lattice point of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: (usize, usize),
    pub location: Location,
    pub score: f64,
}

impl Lattice {
    /// Cell-center lattice. The box must have extent on both axes.
    pub fn cell_centers(bounds: BoundingBox, rows: usize, cols: usize) -> PlacementResult<Self> {
        bounds.ensure_extent()?;
        Self::build(bounds, rows, cols, Spacing::CellCenters)
    }

    /// Edge-inclusive lattice. A zero-extent axis collapses to a single coordinate.
    pub fn inclusive(bounds: BoundingBox, rows: usize, cols: usize) -> PlacementResult<Self> {
        Self::build(bounds, rows, cols, Spacing::Inclusive)
    }

    fn build(bounds: BoundingBox, rows: usize, cols: usize, spacing: Spacing) -> PlacementResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlacementError::DegenerateInput(format!(
                "lattice needs at least one row and column, got {}x{}", rows, cols
            )));
        }
        Ok(Self { bounds, rows, cols, spacing, scan: ScanOrder::LatitudeMajor })
    }

    pub fn with_scan_order(mut self, scan: ScanOrder) -> Self {
        self.scan = scan;
        self
    }

    pub fn scan_order(&self) -> ScanOrder {
        self.scan
    }

    pub fn get_bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn point(&self, i: usize, j: usize) -> Location {
        let lat = axis_value(self.spacing, self.bounds.min_lat, self.bounds.max_lat, self.rows, i);
        let lon = axis_value(self.spacing, self.bounds.min_lon, self.bounds.max_lon, self.cols, j);
        Location::clamped(lat, lon)
    }

    /// Index of the cell (or nearest inclusive point) holding `location`, if it is inside the box.
    pub fn index_of(&self, location: &Location) -> Option<(usize, usize)> {
        if !self.bounds.contains(location) {
            return None;
        }
        let i = axis_index(self.spacing, self.bounds.min_lat, self.bounds.max_lat, self.rows, location.latitude());
        let j = axis_index(self.spacing, self.bounds.min_lon, self.bounds.max_lon, self.cols, location.longitude());
        Some((i, j))
    }

    /// Position of `(i, j)` in scan order.
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        match self.scan {
            ScanOrder::LatitudeMajor => i * self.cols + j,
            ScanOrder::LongitudeMajor => j * self.rows + i,
        }
    }

    pub fn unflatten(&self, k: usize) -> (usize, usize) {
        match self.scan {
            ScanOrder::LatitudeMajor => (k / self.cols, k % self.cols),
            ScanOrder::LongitudeMajor => (k % self.rows, k / self.rows),
        }
    }

    /// All lattice points in scan order.
    pub fn points(&self) -> Vec<Location> {
        (0..self.len())
            .map(|k| {
                let (i, j) = self.unflatten(k);
                self.point(i, j)
            })
            .collect()
    }

    /// Scores every point in parallel and returns the maximum.
    ///
    /// `score` returns `None` for a disqualified point. Equal scores resolve to the lowest
    /// scan index, so the result matches a sequential first-wins argmax.
    pub fn best_candidate<F>(&self, score: F) -> Option<Candidate>
    where
        F: Fn((usize, usize), &Location) -> Option<f64> + Sync,
    {
        (0..self.len())
            .into_par_iter()
            .filter_map(|k| {
                let index = self.unflatten(k);
                let location = self.point(index.0, index.1);
                score(index, &location)
                    .filter(|s| !s.is_nan())
                    .map(|s| (k, s, location))
            })
            .reduce_with(|a, b| {
                if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a }
            })
            .map(|(k, score, location)| Candidate {
                index: self.unflatten(k),
                location,
                score,
            })
    }
}

fn axis_value(spacing: Spacing, min: f64, max: f64, n: usize, idx: usize) -> f64 {
    match spacing {
        Spacing::CellCenters => {
            let step = (max - min) / n as f64;
            min + (idx as f64 + 0.5) * step
        }
        Spacing::Inclusive => {
            if n == 1 {
                min
            } else if idx + 1 == n {
                max
            } else {
                min + idx as f64 * (max - min) / (n - 1) as f64
            }
        }
    }
}

fn axis_index(spacing: Spacing, min: f64, max: f64, n: usize, value: f64) -> usize {
    let span = max - min;
    if span <= 0.0 {
        return 0;
    }
    let scaled = match spacing {
        Spacing::CellCenters => ((value - min) / span * n as f64).floor(),
        Spacing::Inclusive => ((value - min) / span * (n - 1) as f64).round(),
    };
    (scaled.max(0.0) as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    fn sample_bounds() -> BoundingBox {
        BoundingBox::from_locations(&[loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41)]).unwrap()
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let b = sample_bounds();
        assert_eq!((b.min_lat, b.max_lat), (33.65, 33.67));
        assert_eq!((b.min_lon, b.max_lon), (-84.44, -84.41));
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(matches!(BoundingBox::from_locations(&[]), Err(PlacementError::DegenerateInput(_))));
    }

    #[test]
    fn cell_center_lattice_requires_extent() {
        let b = BoundingBox::from_locations(&[loc(10.0, 20.0), loc(10.0, 21.0)]).unwrap();
        assert!(matches!(Lattice::cell_centers(b, 5, 5), Err(PlacementError::DegenerateInput(_))));
    }

    #[test]
    fn cell_center_index_round_trips() {
        let lattice = Lattice::cell_centers(sample_bounds(), 25, 17).unwrap();
        for i in 0..lattice.rows() {
            for j in 0..lattice.cols() {
                let p = lattice.point(i, j);
                assert!(lattice.get_bounds().contains(&p));
                assert_eq!(lattice.index_of(&p), Some((i, j)));
            }
        }
    }

    #[test]
    fn box_maximum_lands_in_last_cell() {
        let b = sample_bounds();
        let lattice = Lattice::cell_centers(b, 10, 10).unwrap();
        assert_eq!(lattice.index_of(&loc(b.max_lat, b.max_lon)), Some((9, 9)));
        assert_eq!(lattice.index_of(&loc(b.min_lat, b.min_lon)), Some((0, 0)));
        assert_eq!(lattice.index_of(&loc(40.0, -84.42)), None);
    }

    #[test]
    fn inclusive_lattice_hits_both_edges() {
        let b = sample_bounds().padded(0.1);
        let lattice = Lattice::inclusive(b, 20, 20).unwrap();
        let first = lattice.point(0, 0);
        let last = lattice.point(19, 19);

        assert_eq!((first.latitude(), first.longitude()), (b.min_lat, b.min_lon));
        assert_eq!((last.latitude(), last.longitude()), (b.max_lat, b.max_lon));
        assert_eq!(lattice.points().len(), 400);
        assert_eq!(lattice.index_of(&lattice.point(7, 11)), Some((7, 11)));
    }

    #[test]
    fn best_candidate_prefers_first_on_ties() {
        let lattice = Lattice::inclusive(sample_bounds(), 6, 6).unwrap();
        let best = lattice.best_candidate(|(i, _), _| Some(if i >= 2 { 1.0 } else { 0.5 })).unwrap();

        assert_eq!(best.index, (2, 0));
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn scan_order_decides_diagonal_ties() {
        let tie = |(i, j): (usize, usize), _: &Location| Some(if (i, j) == (0, 1) || (i, j) == (1, 0) { 1.0 } else { 0.0 });

        let lat_major = Lattice::inclusive(sample_bounds(), 3, 3).unwrap();
        assert_eq!(lat_major.best_candidate(tie).unwrap().index, (0, 1));

        let lon_major = lat_major.with_scan_order(ScanOrder::LongitudeMajor);
        assert_eq!(lon_major.best_candidate(tie).unwrap().index, (1, 0));
    }

    #[test]
    fn flat_index_inverts_unflatten_in_both_orders() {
        for scan in [ScanOrder::LatitudeMajor, ScanOrder::LongitudeMajor] {
            let lattice = Lattice::inclusive(sample_bounds(), 4, 7).unwrap().with_scan_order(scan);
            for k in 0..lattice.len() {
                let (i, j) = lattice.unflatten(k);
                assert!(i < 4 && j < 7);
                assert_eq!(lattice.flat_index(i, j), k);
            }
        }
    }

    #[test]
    fn best_candidate_skips_disqualified_points() {
        let lattice = Lattice::inclusive(sample_bounds(), 4, 4).unwrap();
        assert!(lattice.best_candidate(|_, _| None).is_none());

        let best = lattice.best_candidate(|(i, j), _| if (i, j) == (3, 1) { Some(0.0) } else { None }).unwrap();
        assert_eq!(best.index, (3, 1));
    }
}
