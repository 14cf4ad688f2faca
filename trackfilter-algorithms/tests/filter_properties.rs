#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
use std::sync::Arc;
use trackfilter_algorithms::{
    ClusterFilter, Decision, DropReason, EventProcessor, FilterClusters, FilterParameters,
};
use trackfilter_core::cell_id::CellIdDecoder;
use trackfilter_core::event::{Collection, Event};
use trackfilter_core::hit::{Position3, RawHit, SimTrackerHit, TrackerHit};
use trackfilter_core::relation::Relation;

fn cell_id(layer: i64) -> u64 {
    CellIdDecoder::tracker()
        .unwrap()
        .encode(&[("system", 1), ("side", 0), ("layer", layer)])
        .unwrap()
}

/// Barrel hit at a given polar angle whose cluster spans `rows` pixels in y.
fn hit_at_theta(id: u64, theta: f64, rows: usize, layer: i64) -> TrackerHit {
    let r = 30.0;
    let position = Position3::new(0.0, r, r / theta.tan());
    let raw = (0..rows)
        .map(|row| {
            RawHit::SimTrackerHit(SimTrackerHit::new(
                id * 100 + row as u64,
                0,
                [2.0, 10.0 + row as f64, 0.0],
            ))
        })
        .collect();
    TrackerHit::new(id, cell_id(layer), position).with_raw_hits(raw)
}

fn barrel(ranges: &[&str], sizes: &[&str], layers: &[&str]) -> FilterParameters {
    FilterParameters::new()
        .with_detector_type("Barrel")
        .with_input_ranges(ranges.iter())
        .with_cluster_size(sizes.iter())
        .with_layers(layers.iter())
        .with_inputs("VBTrackerHits", "VBTrackerHitsRelations")
}

fn event_with(hits: Vec<Arc<TrackerHit>>) -> (Event, Vec<Arc<Relation>>) {
    let relations: Vec<Arc<Relation>> = hits
        .iter()
        .map(|h| Arc::new(Relation::with_weight(h.id, h.id + 10_000, 0.5)))
        .collect();
    let mut event = Event::new(1, 1);
    event
        .add_collection("VBTrackerHits", Collection::tracker_hit_planes(hits))
        .unwrap();
    event
        .add_collection(
            "VBTrackerHitsRelations",
            Collection::relations(relations.clone()),
        )
        .unwrap();
    (event, relations)
}

#[test]
fn test_barrel_scenario() {
    let config = barrel(&["0.0", "1.0"], &["5"], &[]).validate().unwrap();
    let filter = ClusterFilter::new(config);

    assert!(filter.classify(&hit_at_theta(1, 0.5, 3, 0)).unwrap().is_keep());
    assert!(!filter.classify(&hit_at_theta(2, 0.5, 7, 0)).unwrap().is_keep());
    for rows in [1, 3, 20] {
        assert_eq!(
            filter.classify(&hit_at_theta(3, 1.5, rows, 0)).unwrap(),
            Decision::Drop(DropReason::NoMatchingZone)
        );
    }
}

#[test]
fn test_endcap_scenario() {
    let config = FilterParameters::new()
        .with_detector_type("Endcap")
        .with_input_ranges(["10.0", "20.0"])
        .with_cluster_size(["4"])
        .with_inputs("Hits", "Rels")
        .validate()
        .unwrap();
    let filter = ClusterFilter::new(config);

    let endcap_hit = |n: usize| {
        // Constituents spread in x only: size_y stays 1, size_total is n.
        let raw = (0..n)
            .map(|i| RawHit::SimTrackerHit(SimTrackerHit::new(i as u64, 0, [i as f64, 0.0, 0.0])))
            .collect();
        TrackerHit::new(1, cell_id(0), Position3::new(15.0, 0.0, -1500.0)).with_raw_hits(raw)
    };

    assert!(filter.classify(&endcap_hit(3)).unwrap().is_keep());
    assert!(!filter.classify(&endcap_hit(5)).unwrap().is_keep());
}

#[test]
fn test_boundary_inclusivity() {
    // Zone (min, max] on r: r == min is outside, r == max is inside.
    let config = FilterParameters::new()
        .with_detector_type("Endcap")
        .with_input_ranges(["10.0", "20.0"])
        .with_cluster_size(["4"])
        .with_inputs("Hits", "Rels")
        .validate()
        .unwrap();
    let filter = ClusterFilter::new(config);
    let single = vec![RawHit::SimTrackerHit(SimTrackerHit::new(1, 0, [0.0; 3]))];

    let at_min = TrackerHit::new(1, cell_id(0), Position3::new(10.0, 0.0, 100.0))
        .with_raw_hits(single.clone());
    let at_max =
        TrackerHit::new(2, cell_id(0), Position3::new(20.0, 0.0, 100.0)).with_raw_hits(single);

    assert_eq!(
        filter.classify(&at_min).unwrap(),
        Decision::Drop(DropReason::NoMatchingZone)
    );
    assert_eq!(filter.classify(&at_max).unwrap(), Decision::Keep { zone: 0 });
}

#[test]
fn test_excluded_layers_never_kept() {
    let config = barrel(&["0.0", "3.15"], &["1000"], &["0", "3"])
        .validate()
        .unwrap();
    let filter = ClusterFilter::new(config);

    for layer in 0..8 {
        for rows in [1, 2, 50] {
            let decision = filter.classify(&hit_at_theta(1, 1.2, rows, layer)).unwrap();
            if layer == 0 || layer == 3 {
                assert_eq!(
                    decision,
                    Decision::Drop(DropReason::ExcludedLayer {
                        layer: layer as u32
                    }),
                    "layer {} rows {}",
                    layer,
                    rows
                );
            } else {
                assert!(decision.is_keep(), "layer {} rows {}", layer, rows);
            }
        }
    }
}

#[test]
fn test_first_zone_in_order_wins() {
    // (0.0, 2.0] comes before the tighter (0.4, 0.6].
    let config = barrel(&["0.0", "2.0", "0.4", "0.6"], &["10", "1", "2"], &[])
        .validate()
        .unwrap();
    let filter = ClusterFilter::new(config);
    assert_eq!(
        filter.classify(&hit_at_theta(1, 0.5, 3, 0)).unwrap(),
        Decision::Keep { zone: 0 }
    );
}

#[test]
fn test_order_preserved_and_relations_paired() {
    let hits: Vec<Arc<TrackerHit>> = (0..60)
        .map(|i| Arc::new(hit_at_theta(i, 0.2 + 0.045 * i as f64, (i % 5) as usize + 1, 1)))
        .collect();
    let (mut event, _) = event_with(hits);

    let stage = FilterClusters::from_parameters(&barrel(
        &["0.0", "1.0", "2.0", "3.1"],
        &["3", "4", "2"],
        &[],
    ))
    .unwrap();
    let stats = stage.process_event(&mut event).unwrap();

    let out_hits = event
        .collection("FilteredVBTrackerHits")
        .unwrap()
        .as_tracker_hits()
        .unwrap();
    let out_rels = event
        .collection("FilteredVBTrackerHitsRelations")
        .unwrap()
        .as_relations()
        .unwrap();

    assert_eq!(out_hits.len(), stats.kept);
    assert_eq!(out_rels.len(), stats.kept);
    assert!(stats.kept > 0 && stats.kept < stats.input);
    assert!(out_hits.windows(2).all(|w| w[0].id < w[1].id));
    for (hit, rel) in out_hits.iter().zip(out_rels) {
        assert_eq!(rel.from, hit.id);
        assert_eq!(rel.to, hit.id + 10_000);
    }
}

#[test]
fn test_filter_is_idempotent() {
    let hits: Vec<Arc<TrackerHit>> = (0..40)
        .map(|i| Arc::new(hit_at_theta(i, 0.1 + 0.07 * i as f64, (i % 6) as usize + 1, i as i64 % 4)))
        .collect();
    let (mut first, _) = event_with(hits);

    let params = barrel(&["0.0", "1.0", "2.0", "3.1"], &["4", "3", "5"], &["2"]);
    let stage = FilterClusters::from_parameters(&params).unwrap();
    stage.process_event(&mut first).unwrap();

    let kept: Vec<Arc<TrackerHit>> = first
        .collection("FilteredVBTrackerHits")
        .unwrap()
        .as_tracker_hits()
        .unwrap()
        .to_vec();
    let (mut second, _) = event_with(kept.clone());
    let stats = stage.process_event(&mut second).unwrap();

    let rekept = second
        .collection("FilteredVBTrackerHits")
        .unwrap()
        .as_tracker_hits()
        .unwrap();
    assert_eq!(stats.kept, kept.len());
    assert!(kept.iter().zip(rekept).all(|(a, b)| Arc::ptr_eq(a, b)));
}

#[test]
fn test_empty_event() {
    let (mut event, _) = event_with(Vec::new());
    let stage = FilterClusters::from_parameters(&barrel(&["0.0", "1.0"], &["5"], &[])).unwrap();
    let stats = stage.process_event(&mut event).unwrap();
    assert_eq!(stats.input, 0);
    assert!(stats.retention_percent().abs() < f64::EPSILON);
    assert!(event
        .collection("FilteredVBTrackerHits")
        .unwrap()
        .is_empty());
}

#[test]
fn test_malformed_constituent_aborts_event() {
    let mut bad = hit_at_theta(5, 0.5, 2, 1);
    bad.raw_hits.insert(
        0,
        RawHit::Other {
            id: 99,
            type_name: "CalorimeterHit".to_string(),
        },
    );
    let (mut event, _) = event_with(vec![Arc::new(hit_at_theta(4, 0.5, 1, 1)), Arc::new(bad)]);

    let stage = FilterClusters::from_parameters(&barrel(&["0.0", "1.0"], &["5"], &[])).unwrap();
    let err = stage.process_event(&mut event).unwrap_err();
    assert!(err.to_string().contains("hit 5"), "{}", err);
    assert!(event.collection("FilteredVBTrackerHits").is_err());
}
