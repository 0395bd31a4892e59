//! Seeded k-means over raw (lat, lon) pairs.
//!
//! Coordinates are treated as Euclidean, which is close enough at city scale. Centers are
//! seeded with k-means++ from a fixed-seed `StdRng`, so a given input always produces the
//! same clustering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use crate::config::constants::{KMEANS_MAX_ITERATIONS, KMEANS_SEED, KMEANS_TOLERANCE};
use crate::data::location::Location;
use crate::error::{PlacementError, PlacementResult};
use crate::utils::logging::{self, OperationCategory};

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iterations: usize,
    pub tolerance: f64,  // Largest center shift (degrees) counted as converged
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: KMEANS_MAX_ITERATIONS,
            tolerance: KMEANS_TOLERANCE,
            seed: KMEANS_SEED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Clustering {
    pub centers: Vec<Location>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
}

impl Clustering {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }
}

type Point2 = [f64; 2];

fn sq_dist(a: &Point2, b: &Point2) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

fn nearest(point: &Point2, centers: &[Point2]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, center) in centers.iter().enumerate() {
        let d = sq_dist(point, center);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

pub fn kmeans(locations: &[Location], config: &KMeansConfig) -> PlacementResult<Clustering> {
    let _timing = logging::start_timing("kmeans", OperationCategory::Clustering);

    if locations.is_empty() {
        return Err(PlacementError::DegenerateInput("cannot cluster an empty location set".to_string()));
    }
    if config.k == 0 {
        return Err(PlacementError::InsufficientData("k must be at least 1".to_string()));
    }
    if config.k > locations.len() {
        return Err(PlacementError::InsufficientData(format!(
            "k ({}) exceeds the number of locations ({})", config.k, locations.len()
        )));
    }

    let points: Vec<Point2> = locations.iter().map(|l| [l.latitude(), l.longitude()]).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut centers = plus_plus_init(&points, config.k, &mut rng);

    let mut assignments = vec![0usize; points.len()];
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..config.max_iterations {
        iterations = iter + 1;

        // Assignment step
        for (i, p) in points.iter().enumerate() {
            assignments[i] = nearest(p, &centers).0;
        }

        // Update step, empty clusters keep their previous center
        let mut sums = vec![[0.0f64; 2]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (p, &a) in points.iter().zip(assignments.iter()) {
            sums[a][0] += p[0];
            sums[a][1] += p[1];
            counts[a] += 1;
        }
        let new_centers: Vec<Point2> = centers
            .iter()
            .enumerate()
            .map(|(c, old)| {
                if counts[c] == 0 {
                    *old
                } else {
                    [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64]
                }
            })
            .collect();

        let max_shift = centers
            .iter()
            .zip(new_centers.iter())
            .map(|(a, b)| sq_dist(a, b).sqrt())
            .fold(0.0f64, f64::max);

        centers = new_centers;

        if max_shift < config.tolerance {
            converged = true;
            break;
        }
    }

    // Final assignment against the settled centers
    let mut inertia = 0.0;
    for (i, p) in points.iter().enumerate() {
        let (c, d) = nearest(p, &centers);
        assignments[i] = c;
        inertia += d;
    }

    debug!(k = config.k, n = points.len(), iterations, converged, inertia, "k-means finished");

    Ok(Clustering {
        centers: centers.iter().map(|c| Location::clamped(c[0], c[1])).collect(),
        assignments,
        iterations,
        converged,
        inertia,
    })
}

fn plus_plus_init(points: &[Point2], k: usize, rng: &mut StdRng) -> Vec<Point2> {
    let mut chosen = vec![false; points.len()];
    let first = rng.gen_range(0..points.len());
    chosen[first] = true;
    let mut centers = vec![points[first]];

    let mut weights: Vec<f64> = points.iter().map(|p| sq_dist(p, &points[first])).collect();

    while centers.len() < k {
        let total: f64 = weights.iter().sum();

        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = None;
            for (i, w) in weights.iter().enumerate() {
                acc += w;
                if *w > 0.0 && acc >= target {
                    pick = Some(i);
                    break;
                }
            }
            // Rounding can leave the cumulative sum just short of the target
            pick.or_else(|| weights.iter().rposition(|w| *w > 0.0))
        } else {
            None
        };

        // Only duplicates remain, take the first point not yet used as a seed
        let next = match next {
            Some(i) => i,
            None => match chosen.iter().position(|c| !c) {
                Some(i) => i,
                None => break,
            },
        };

        chosen[next] = true;
        centers.push(points[next]);
        for (w, p) in weights.iter_mut().zip(points.iter()) {
            *w = w.min(sq_dist(p, &points[next]));
        }
    }

    centers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    fn two_blobs() -> Vec<Location> {
        vec![
            loc(33.60, -84.40), loc(33.61, -84.41), loc(33.60, -84.41), loc(33.61, -84.40),
            loc(34.20, -83.80), loc(34.21, -83.81), loc(34.20, -83.81), loc(34.21, -83.80),
        ]
    }

    #[test]
    fn separates_two_obvious_blobs() {
        let result = kmeans(&two_blobs(), &KMeansConfig::new(2)).unwrap();

        assert_eq!(result.centers.len(), 2);
        assert_eq!(result.cluster_sizes(), vec![4, 4]);
        assert!(result.assignments[..4].iter().all(|&a| a == result.assignments[0]));
        assert!(result.assignments[4..].iter().all(|&a| a == result.assignments[4]));
        assert_ne!(result.assignments[0], result.assignments[4]);
        assert!(result.converged);
    }

    #[test]
    fn is_deterministic_for_fixed_seed() {
        let a = kmeans(&two_blobs(), &KMeansConfig::new(3)).unwrap();
        let b = kmeans(&two_blobs(), &KMeansConfig::new(3)).unwrap();

        assert_eq!(a.centers, b.centers);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn handles_more_clusters_than_distinct_points() {
        let points = vec![loc(10.0, 10.0), loc(10.0, 10.0), loc(11.0, 11.0)];
        let result = kmeans(&points, &KMeansConfig::new(3)).unwrap();

        assert_eq!(result.centers.len(), 3);
        assert!(result.inertia.abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_k() {
        let points = two_blobs();
        assert!(matches!(kmeans(&points, &KMeansConfig::new(0)), Err(PlacementError::InsufficientData(_))));
        assert!(matches!(kmeans(&points, &KMeansConfig::new(9)), Err(PlacementError::InsufficientData(_))));
        assert!(matches!(kmeans(&[], &KMeansConfig::new(1)), Err(PlacementError::DegenerateInput(_))));
    }
}
