use crate::intersection::direction::Direction;
use crate::intersection::lane::LaneKind;
use crate::vision::provider::DetectionResult;
use indexmap::IndexMap;

/// Region of interest polygon for a single lane, defined in normalized
/// (0-1) coordinates relative to the camera frame.
///
/// Vehicles whose bounding-box center falls inside this polygon are
/// counted as being in this lane.
#[derive(Debug, Clone)]
pub struct LaneRoi {
    pub direction: Direction,
    pub lane_kind: LaneKind,
    pub polygon: Vec<(f64, f64)>,
}

/// Vehicle count for a single lane after ROI filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCount {
    pub direction: Direction,
    pub lane_kind: LaneKind,
    pub count: u32,
}

/// Ray-casting test for a point inside a polygon.
///
/// Works with normalized (0-1) coordinates. Polygons with fewer than
/// three vertices contain nothing.
pub fn point_in_polygon(px: f64, py: f64, polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Filters detections by lane ROI polygons and returns counts per lane.
///
/// Each vehicle's bounding-box center is tested against each lane
/// polygon in order; a vehicle is counted in the first matching lane
/// only.
pub fn count_vehicles_by_lane(result: &DetectionResult, lane_rois: &[LaneRoi]) -> Vec<LaneCount> {
    let mut counts: IndexMap<(Direction, LaneKind), u32> = lane_rois
        .iter()
        .map(|roi| ((roi.direction, roi.lane_kind), 0))
        .collect();

    for vehicle in &result.vehicles {
        for roi in lane_rois {
            if roi.polygon.is_empty() {
                continue;
            }
            if point_in_polygon(vehicle.x, vehicle.y, &roi.polygon) {
                *counts.entry((roi.direction, roi.lane_kind)).or_insert(0) += 1;
                // Each vehicle counted once
                break;
            }
        }
    }

    counts
        .into_iter()
        .map(|((direction, lane_kind), count)| LaneCount {
            direction,
            lane_kind,
            count,
        })
        .collect()
}

/// Simple quadrant-based counting when no ROI polygons are defined.
///
/// Splits the frame into bands and maps them to directions based on a
/// top-down camera view convention:
///   - Top    (y < 0.3) → N approach (cars heading south)
///   - Bottom (y > 0.7) → S approach (cars heading north)
///   - Right  (x > 0.7) → E approach (cars heading west)
///   - Left   (x < 0.3) → W approach (cars heading east)
///
/// Vehicles in the center are inside the intersection and are dropped.
pub fn count_vehicles_simple(result: &DetectionResult) -> IndexMap<Direction, u32> {
    let mut counts: IndexMap<Direction, u32> =
        Direction::ALL.iter().map(|d| (*d, 0)).collect();

    for vehicle in &result.vehicles {
        let direction = if vehicle.y < 0.3 {
            Some(Direction::North)
        } else if vehicle.y > 0.7 {
            Some(Direction::South)
        } else if vehicle.x > 0.7 {
            Some(Direction::East)
        } else if vehicle.x < 0.3 {
            Some(Direction::West)
        } else {
            None
        };
        if let Some(direction) = direction {
            counts[&direction] += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::provider::{DetectedVehicle, VehicleKind};

    fn vehicle_at(x: f64, y: f64) -> DetectedVehicle {
        DetectedVehicle {
            x,
            y,
            width: 0.03,
            height: 0.05,
            confidence: 0.9,
            kind: VehicleKind::Car,
        }
    }

    fn result_with(vehicles: Vec<DetectedVehicle>) -> DetectionResult {
        DetectionResult {
            vehicles,
            frame_timestamp: 0.0,
            processing_time_ms: 1.0,
            confidence_threshold: 0.5,
            provider_name: "test".to_string(),
        }
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(point_in_polygon(0.5, 0.5, &square));
        assert!(!point_in_polygon(1.5, 0.5, &square));
        // Degenerate polygons contain nothing
        assert!(!point_in_polygon(0.5, 0.5, &[(0.0, 0.0), (1.0, 1.0)]));
    }

    #[test]
    fn test_count_by_lane_first_match_wins() {
        let rois = vec![
            LaneRoi {
                direction: Direction::North,
                lane_kind: LaneKind::Through,
                polygon: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.0, 0.5)],
            },
            LaneRoi {
                direction: Direction::South,
                lane_kind: LaneKind::Through,
                // Overlaps the first ROI entirely
                polygon: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            },
        ];
        let result = result_with(vec![vehicle_at(0.5, 0.25), vehicle_at(0.5, 0.75)]);
        let counts = count_vehicles_by_lane(&result, &rois);

        assert_eq!(
            counts,
            vec![
                LaneCount {
                    direction: Direction::North,
                    lane_kind: LaneKind::Through,
                    count: 1
                },
                LaneCount {
                    direction: Direction::South,
                    lane_kind: LaneKind::Through,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_quadrant_fallback() {
        let result = result_with(vec![
            vehicle_at(0.5, 0.1),  // N
            vehicle_at(0.5, 0.9),  // S
            vehicle_at(0.9, 0.5),  // E
            vehicle_at(0.1, 0.5),  // W
            vehicle_at(0.5, 0.5),  // center, dropped
        ]);
        let counts = count_vehicles_simple(&result);
        assert_eq!(counts[&Direction::North], 1);
        assert_eq!(counts[&Direction::South], 1);
        assert_eq!(counts[&Direction::East], 1);
        assert_eq!(counts[&Direction::West], 1);
        assert_eq!(counts.values().sum::<u32>(), 4);
    }
}
