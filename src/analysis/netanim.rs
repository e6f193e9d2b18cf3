//! NetAnim mobility trace extraction.
//!
//! A trace lists static node descriptors (initial positions) and movement
//! events as direct children of the root:
//!
//! ```text
//! <anim>
//!   <node id="0" locX="10" locY="20"/>
//!   <move id="0" time="1.5" locX="12" locY="20"/>
//! </anim>
//! ```
//!
//! Nodes do not report at every timestep, so the samples are rebuilt into a
//! dense (time, node) grid for stepwise animation: each node's position at a
//! time is its latest observation at or before that time. A node has no
//! position before its first observation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use super::types::*;
use crate::registry::Scenario;

/// A node position at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub time: SimTime,
    pub node_id: u32,
    pub x: f64,
    pub y: f64,
}

fn parse_attr<T: FromStr>(node: Node<'_, '_>, name: &str, raw: &str) -> Result<T, LoadError> {
    raw.trim()
        .parse()
        .map_err(|_| LoadError::invalid(format!("{}.{}", node.tag_name().name(), name), raw))
}

fn required_attr<T: FromStr>(node: Node<'_, '_>, name: &str) -> Result<T, LoadError> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| LoadError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
        })?;
    parse_attr(node, name, raw)
}

fn optional_attr<T: FromStr>(node: Node<'_, '_>, name: &str) -> Result<Option<T>, LoadError> {
    node.attribute(name)
        .map(|raw| parse_attr(node, name, raw))
        .transpose()
}

fn finite(value: f64, node: Node<'_, '_>, name: &str) -> Result<f64, LoadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LoadError::invalid(
            format!("{}.{}", node.tag_name().name(), name),
            value.to_string(),
        ))
    }
}

/// Raw samples in document order: one at time 0 per static node, then one
/// per movement event that carries both coordinates.
pub fn collect_samples(doc: &Document<'_>) -> Result<Vec<PositionSample>, LoadError> {
    let root = doc.root_element();
    let mut samples = Vec::new();

    for node in root.children().filter(|n| n.has_tag_name("node")) {
        samples.push(PositionSample {
            time: 0.0,
            node_id: required_attr(node, "id")?,
            x: finite(required_attr(node, "locX")?, node, "locX")?,
            y: finite(required_attr(node, "locY")?, node, "locY")?,
        });
    }

    let mut dropped = 0usize;
    for event in root.children().filter(|n| n.has_tag_name("move")) {
        let node_id: u32 = required_attr(event, "id")?;
        let time = finite(required_attr(event, "time")?, event, "time")?;

        match (optional_attr::<f64>(event, "locX")?, optional_attr::<f64>(event, "locY")?) {
            (Some(x), Some(y)) => samples.push(PositionSample {
                time,
                node_id,
                x: finite(x, event, "locX")?,
                y: finite(y, event, "locY")?,
            }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} move events without both coordinates", dropped);
    }

    Ok(samples)
}

/// Rebuild a dense grid from sparse samples.
///
/// Every node gets a row at every distinct time seen for any node, starting
/// from its own first observation. Rows are ordered by time, then node id.
/// When a node has several samples at the same time, the last one in input
/// order wins.
pub fn densify(samples: &[PositionSample]) -> Vec<PositionSample> {
    let mut tracks: BTreeMap<u32, Vec<PositionSample>> = BTreeMap::new();
    for sample in samples {
        tracks.entry(sample.node_id).or_default().push(*sample);
    }
    for track in tracks.values_mut() {
        track.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    let mut times: Vec<SimTime> = samples.iter().map(|s| s.time).collect();
    times.sort_by(f64::total_cmp);
    times.dedup();

    // One cursor per node: index of the first sample later than the current time
    let mut cursors: Vec<(&[PositionSample], usize)> =
        tracks.values().map(|track| (track.as_slice(), 0)).collect();

    let mut grid = Vec::with_capacity(times.len() * cursors.len());
    for &time in &times {
        for (track, next) in cursors.iter_mut() {
            while *next < track.len() && track[*next].time <= time {
                *next += 1;
            }

            if *next == 0 {
                // not observed yet
                continue;
            }

            let latest = track[*next - 1];
            grid.push(PositionSample { time, ..latest });
        }
    }

    grid
}

/// Dense positions from a parsed trace. Empty when the trace has neither
/// static nodes nor usable movement events.
pub fn extract_motion(doc: &Document<'_>) -> Result<Vec<PositionSample>, LoadError> {
    let samples = collect_samples(doc)?;
    Ok(densify(&samples))
}

/// Attach the scenario label to dense positions.
pub fn into_motion_table(positions: Vec<PositionSample>, scenario: Scenario) -> MotionTable {
    let label = scenario.label();
    Table::new(
        positions
            .into_iter()
            .map(|p| MotionSample {
                time: p.time,
                node_id: p.node_id,
                x: p.x,
                y: p.y,
                scenario: label.clone(),
            })
            .collect(),
    )
}

/// Parse NetAnim XML text into a labelled motion table.
pub fn parse_netanim(xml: &str, scenario: Scenario) -> Result<MotionTable, LoadError> {
    let doc = Document::parse(xml)?;
    Ok(into_motion_table(extract_motion(&doc)?, scenario))
}

/// Load one NetAnim trace from disk. A trace without samples is reported as
/// [`LoadError::NoMotionData`] so it is left out of the unified table.
pub fn load_netanim_file(path: &Path, scenario: Scenario) -> Result<MotionTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing {
            path: path.to_path_buf(),
        });
    }

    let xml = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_netanim(&xml, scenario)?;
    if table.is_empty() {
        return Err(LoadError::NoMotionData);
    }

    log::debug!(
        "Loaded {} motion samples for {} from {}",
        table.len(),
        scenario,
        path.display()
    );
    Ok(table)
}

/// Plot extent of a scenario's motion, padded on every side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Padded bounds of the samples of `scenario`, or `None` without samples.
pub fn motion_bounds(table: &MotionTable, scenario: &str, padding: f64) -> Option<MotionBounds> {
    table
        .iter()
        .filter(|s| s.scenario == scenario)
        .fold(None, |acc: Option<MotionBounds>, s| {
            Some(match acc {
                None => MotionBounds {
                    min_x: s.x,
                    max_x: s.x,
                    min_y: s.y,
                    max_y: s.y,
                },
                Some(b) => MotionBounds {
                    min_x: b.min_x.min(s.x),
                    max_x: b.max_x.max(s.x),
                    min_y: b.min_y.min(s.y),
                    max_y: b.max_y.max(s.y),
                },
            })
        })
        .map(|b| MotionBounds {
            min_x: b.min_x - padding,
            max_x: b.max_x + padding,
            min_y: b.min_y - padding,
            max_y: b.max_y + padding,
        })
}

/// Distinct animation frame times of `scenario`, ascending.
pub fn frame_times(table: &MotionTable, scenario: &str) -> Vec<SimTime> {
    let mut times: Vec<SimTime> = table
        .iter()
        .filter(|s| s.scenario == scenario)
        .map(|s| s.time)
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Condition, Variant};

    fn sample(time: f64, node_id: u32, x: f64, y: f64) -> PositionSample {
        PositionSample { time, node_id, x, y }
    }

    fn positions(xml: &str) -> Vec<PositionSample> {
        let doc = Document::parse(xml).unwrap();
        extract_motion(&doc).unwrap()
    }

    #[test]
    fn test_static_node_forward_filled() {
        let xml = r#"<anim>
            <node id="0" locX="1" locY="1"/>
            <node id="1" locX="5" locY="5"/>
            <move id="1" time="2" locX="6" locY="5"/>
            <move id="1" time="4" locX="7" locY="5"/>
        </anim>"#;
        let grid = positions(xml);

        let node0: Vec<_> = grid.iter().filter(|s| s.node_id == 0).collect();
        assert_eq!(node0.len(), 3);
        assert_eq!(
            node0.iter().map(|s| s.time).collect::<Vec<_>>(),
            vec![0.0, 2.0, 4.0]
        );
        assert!(node0.iter().all(|s| s.x == 1.0 && s.y == 1.0));

        let node1: Vec<_> = grid.iter().filter(|s| s.node_id == 1).map(|s| s.x).collect();
        assert_eq!(node1, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_late_node_has_no_earlier_samples() {
        let xml = r#"<anim>
            <node id="0" locX="0" locY="0"/>
            <move id="0" time="2" locX="1" locY="0"/>
            <move id="3" time="5" locX="9" locY="9"/>
            <move id="0" time="8" locX="2" locY="0"/>
        </anim>"#;
        let grid = positions(xml);

        let late: Vec<_> = grid.iter().filter(|s| s.node_id == 3).collect();
        assert_eq!(late.iter().map(|s| s.time).collect::<Vec<_>>(), vec![5.0, 8.0]);
        assert!(late.iter().all(|s| s.x == 9.0));
        assert!(grid.iter().all(|s| s.node_id != 3 || s.time >= 5.0));
    }

    #[test]
    fn test_grid_order() {
        let grid = densify(&[
            sample(3.0, 2, 0.0, 0.0),
            sample(0.0, 1, 1.0, 1.0),
            sample(1.0, 2, 2.0, 2.0),
        ]);
        let keys: Vec<(f64, u32)> = grid.iter().map(|s| (s.time, s.node_id)).collect();
        assert_eq!(keys, vec![(0.0, 1), (1.0, 1), (1.0, 2), (3.0, 1), (3.0, 2)]);
        assert_eq!(grid[4].x, 0.0);
        assert_eq!(grid[2].x, 2.0);
    }

    #[test]
    fn test_same_time_last_sample_wins() {
        let xml = r#"<anim>
            <node id="0" locX="1" locY="1"/>
            <move id="0" time="0" locX="3" locY="4"/>
        </anim>"#;
        let grid = positions(xml);
        assert_eq!(grid, vec![sample(0.0, 0, 3.0, 4.0)]);
    }

    #[test]
    fn test_move_without_coordinate_dropped() {
        let xml = r#"<anim>
            <node id="0" locX="1" locY="1"/>
            <move id="0" time="2" locX="3"/>
            <move id="0" time="4" locY="3"/>
        </anim>"#;
        let grid = positions(xml);
        assert_eq!(grid, vec![sample(0.0, 0, 1.0, 1.0)]);
    }

    #[test]
    fn test_empty_trace() {
        assert!(positions("<anim></anim>").is_empty());
        assert!(positions(r#"<anim><move id="1" time="3"/></anim>"#).is_empty());
    }

    #[test]
    fn test_malformed_values() {
        let doc = Document::parse(r#"<anim><node id="x" locX="1" locY="1"/></anim>"#).unwrap();
        assert!(matches!(
            extract_motion(&doc),
            Err(LoadError::InvalidValue { .. })
        ));

        let doc = Document::parse(r#"<anim><node id="1" locX="1"/></anim>"#).unwrap();
        assert!(matches!(
            extract_motion(&doc),
            Err(LoadError::MissingAttribute { .. })
        ));

        let doc = Document::parse(r#"<anim><move id="1" locX="1" locY="2"/></anim>"#).unwrap();
        assert!(matches!(
            extract_motion(&doc),
            Err(LoadError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_move_without_time_fails_before_coordinate_check() {
        // Time is read first, so a missing coordinate does not turn this into a drop
        let doc = Document::parse(
            r#"<anim><node id="0" locX="1" locY="1"/><move id="0" locX="3"/></anim>"#,
        )
        .unwrap();
        match extract_motion(&doc) {
            Err(LoadError::MissingAttribute { element, attribute }) => {
                assert_eq!(element, "move");
                assert_eq!(attribute, "time");
            }
            other => panic!("expected missing time, got {:?}", other),
        }

        let doc = Document::parse(r#"<anim><move id="0" time="soon"/></anim>"#).unwrap();
        assert!(matches!(
            extract_motion(&doc),
            Err(LoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_bounds_and_frames() {
        let scenario = Scenario::new(Variant::Secured, Condition::UnderAttack);
        let table = into_motion_table(
            densify(&[
                sample(0.0, 0, 0.0, 10.0),
                sample(0.0, 1, 4.0, 2.0),
                sample(1.5, 1, 6.0, 3.0),
            ]),
            scenario,
        );
        let label = scenario.label();

        assert_eq!(frame_times(&table, &label), vec![0.0, 1.5]);
        assert_eq!(
            motion_bounds(&table, &label, 5.0),
            Some(MotionBounds {
                min_x: -5.0,
                max_x: 11.0,
                min_y: -3.0,
                max_y: 15.0,
            })
        );
        assert_eq!(motion_bounds(&table, "Secured - Baseline", 5.0), None);
        assert!(frame_times(&table, "Secured - Baseline").is_empty());
    }
}
