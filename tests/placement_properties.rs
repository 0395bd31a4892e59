use sitefinder::config::placement_config::PlacementConfig;
use sitefinder::core::recommend::Recommender;
use sitefinder::data::payload::{PlacementOutcome, StationPayload};
use sitefinder::{
    Algorithm, AxisAlignmentPlacer, ClusterVoidPlacer, CoverageAnalyzer, GridMaximinPlacer, Location,
    PlacementError, SitePlacer,
};

fn loc(lat: f64, lon: f64) -> Location {
    Location::new(lat, lon).unwrap()
}

fn atlanta() -> Vec<Location> {
    vec![loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41)]
}

/// Independent cell-center maximin over an unpadded `rows x cols` grid.
/// Returns every unoccupied cell center with its nearest-station distance.
fn brute_force_cells(locations: &[Location], rows: usize, cols: usize) -> Vec<(Location, f64)> {
    let min_lat = locations.iter().map(|l| l.latitude()).fold(f64::INFINITY, f64::min);
    let max_lat = locations.iter().map(|l| l.latitude()).fold(f64::NEG_INFINITY, f64::max);
    let min_lon = locations.iter().map(|l| l.longitude()).fold(f64::INFINITY, f64::min);
    let max_lon = locations.iter().map(|l| l.longitude()).fold(f64::NEG_INFINITY, f64::max);
    let d_lat = (max_lat - min_lat) / rows as f64;
    let d_lon = (max_lon - min_lon) / cols as f64;

    let cell = |v: f64, min: f64, step: f64, n: usize| (((v - min) / step).floor() as usize).min(n - 1);
    let occupied: Vec<(usize, usize)> = locations
        .iter()
        .map(|l| (cell(l.latitude(), min_lat, d_lat, rows), cell(l.longitude(), min_lon, d_lon, cols)))
        .collect();

    let mut cells = Vec::new();
    for i in 0..rows {
        for j in 0..cols {
            if occupied.contains(&(i, j)) {
                continue;
            }
            let center = loc(min_lat + (i as f64 + 0.5) * d_lat, min_lon + (j as f64 + 0.5) * d_lon);
            let nearest = locations.iter().map(|l| center.distance_km(l)).fold(f64::INFINITY, f64::min);
            cells.push((center, nearest));
        }
    }
    cells
}

#[test]
fn atlanta_grid_pick_beats_every_other_free_cell() {
    let stations = atlanta();
    let site = GridMaximinPlacer::new(10, 10).place(&stations).unwrap();
    let site_score = site.nearest_distance_km(&stations);

    let cells = brute_force_cells(&stations, 10, 10);
    assert_eq!(cells.len(), 97);
    for (center, score) in cells {
        assert!(site_score + 1e-9 >= score, "{} scores {} above the pick's {}", center, score, site_score);
    }
}

#[test]
fn collinear_maximin_matches_brute_force() {
    let stations = vec![loc(33.0, -84.0), loc(33.5, -83.5), loc(34.0, -83.0)];
    let best = GridMaximinPlacer::default().find_candidate(&stations).unwrap();

    let expected = brute_force_cells(&stations, 25, 25)
        .into_iter()
        .map(|(_, score)| score)
        .fold(f64::NEG_INFINITY, f64::max);

    assert!((best.score - expected).abs() < 1e-9);
    assert!((best.location.nearest_distance_km(&stations) - best.score).abs() < 1e-9);
}

#[test]
fn every_placer_is_deterministic() {
    let stations: Vec<Location> = (0..40)
        .map(|k| {
            let t = k as f64;
            loc(33.5 + 0.3 * (t * 0.37).sin().abs(), -84.6 + 0.4 * (t * 0.53).cos().abs())
        })
        .collect();

    let placers: Vec<Box<dyn SitePlacer>> = vec![
        Box::new(GridMaximinPlacer::default()),
        Box::new(AxisAlignmentPlacer::default()),
        Box::new(ClusterVoidPlacer::new(5, 2.0)),
    ];

    for placer in &placers {
        let first = placer.place(&stations);
        for _ in 0..3 {
            assert_eq!(placer.place(&stations), first, "{} changed its answer", placer.name());
        }
    }
}

#[test]
fn dense_cluster_forces_void_pick_outside_its_hull() {
    let stations: Vec<Location> = (0..12)
        .map(|k| loc(33.70 + 0.001 * (k % 4) as f64, -84.40 + 0.001 * (k / 4) as f64))
        .collect();
    let threshold = 5.0;

    let site = ClusterVoidPlacer::new(3, threshold).place(&stations).unwrap();

    assert!(site.nearest_distance_km(&stations) > threshold);
    let inside_hull = (33.70..=33.703).contains(&site.latitude()) && (-84.40..=-84.398).contains(&site.longitude());
    assert!(!inside_hull);
}

#[test]
fn void_pick_respects_threshold_for_several_settings() {
    let stations = vec![
        loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41), loc(33.75, -84.39),
        loc(33.80, -84.35), loc(33.58, -84.50), loc(33.62, -84.30), loc(33.71, -84.46),
    ];

    for (k, threshold) in [(2, 1.0), (4, 3.0), (8, 6.0)] {
        match ClusterVoidPlacer::new(k, threshold).place(&stations) {
            Ok(site) => assert!(site.nearest_distance_km(&stations) > threshold),
            Err(e) => assert!(matches!(e, PlacementError::NoFeasibleCandidate(_))),
        }
    }
}

#[test]
fn single_location_is_degenerate_for_grid_and_axis() {
    let one = vec![loc(33.65, -84.42)];

    assert!(matches!(GridMaximinPlacer::default().place(&one), Err(PlacementError::DegenerateInput(_))));
    assert!(matches!(AxisAlignmentPlacer::default().place(&one), Err(PlacementError::DegenerateInput(_))));
    assert!(matches!(ClusterVoidPlacer::new(1, 1.0).place(&[]), Err(PlacementError::DegenerateInput(_))));
}

#[test]
fn new_station_never_increases_average_distance() {
    let stations = atlanta();
    let analyzer = CoverageAnalyzer::default();

    for k in 0..8 {
        let angle = k as f64 * std::f64::consts::FRAC_PI_4;
        let proposed = loc(33.66 + 0.05 * angle.sin(), -84.42 + 0.05 * angle.cos());
        let report = analyzer.analyze(&stations, &proposed);

        assert!(report.avg_distance_after <= report.avg_distance_before);
        assert!(report.max_distance_after <= report.max_distance_before);
    }
}

#[test]
fn payload_round_trip_produces_rounded_sites() {
    let payload = StationPayload::from_json(
        r#"{"filtered_station_data": [[33.65, -84.42, "2015-01-01"], [33.66, -84.44, "2016-01-01"], [33.67, -84.41, "2017-01-01"], [95.0, 0.0, "2018-01-01"]]}"#,
    ).unwrap();

    let response = Recommender::new(PlacementConfig::default())
        .with_coverage(true)
        .recommend_payload(&payload);

    for algorithm in [Algorithm::GridMaximin, Algorithm::AxisAlignment] {
        match response.get_site(algorithm) {
            Some(PlacementOutcome::Site { latitude, longitude }) => {
                assert_eq!((latitude * 1e5).round() / 1e5, *latitude);
                assert_eq!((longitude * 1e5).round() / 1e5, *longitude);
            }
            other => panic!("{} returned {:?}", algorithm, other),
        }
    }

    let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
    assert!(json["cluster_void"]["error"].is_string());
    assert!(json["coverage"]["grid_maximin"]["avg_distance_before"].is_number());
}
