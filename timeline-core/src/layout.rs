//! Xếp làn cho các sự kiện chồng lấn theo từng khu vực.
//!
//! Thời gian được rời rạc hóa theo năm. Với mỗi năm, các sự kiện phủ năm đó
//! được xếp theo (năm bắt đầu, năm kết thúc) và nhận chỉ số làn 0..k-1.
//! Mỗi sự kiện giữ cặp (làn, tổng) của lát năm đông nhất đầu tiên mà nó đi qua.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Region, TimelineEvent};

/// Làn được gán cho một sự kiện.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanePlacement {
    pub position: usize,
    pub total_in_row: usize,
}

impl Default for LanePlacement {
    fn default() -> Self {
        Self {
            position: 0,
            total_in_row: 1,
        }
    }
}

impl LanePlacement {
    /// Vị trí trái và bề rộng (phần trăm) của làn trong track, trừ lề `padding`.
    pub fn track_span(&self, padding: f64) -> (f64, f64) {
        let total = self.total_in_row.max(1) as f64;
        let width = (100.0 - padding) / total;
        let left = padding / 2.0 + self.position as f64 * width;
        (left, width)
    }
}

/// Sự kiện đã được gán làn.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacedEvent<'a> {
    #[serde(flatten)]
    pub event: &'a TimelineEvent,
    #[serde(flatten)]
    pub lane: LanePlacement,
}

/// Các sự kiện của `region` phủ năm `year`, theo đúng thứ tự làn.
pub fn lanes_in_year<'a>(
    events: &[&'a TimelineEvent],
    region: Region,
    year: i32,
) -> Vec<&'a TimelineEvent> {
    sorted_region_events(events, region)
        .into_iter()
        .filter(|event| event.covers(year))
        .collect()
}

fn sorted_region_events<'a>(events: &[&'a TimelineEvent], region: Region) -> Vec<&'a TimelineEvent> {
    let mut region_events: Vec<_> = events
        .iter()
        .copied()
        .filter(|event| event.region == region)
        .collect();
    region_events.sort_by_key(|event| (event.start_year, event.end_year));
    region_events
}

/// Gán làn cho mọi sự kiện thuộc `region`.
///
/// Kết quả theo thứ tự sự kiện xuất hiện lần đầu khi quét các năm tăng dần.
pub fn assign_lanes<'a>(events: &[&'a TimelineEvent], region: Region) -> Vec<PlacedEvent<'a>> {
    let region_events = sorted_region_events(events, region);
    let years: BTreeSet<i32> = region_events
        .iter()
        .flat_map(|event| event.start_year..=event.end_year)
        .collect();

    let mut placed: Vec<PlacedEvent<'a>> = Vec::with_capacity(region_events.len());
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(region_events.len());

    for year in years {
        let slice: Vec<&TimelineEvent> = region_events
            .iter()
            .copied()
            .filter(|event| event.covers(year))
            .collect();
        let total_in_row = slice.len();

        for (position, event) in slice.into_iter().enumerate() {
            match index_of.get(event.id.as_str()) {
                Some(&index) => {
                    let lane = &mut placed[index].lane;
                    if total_in_row > lane.total_in_row {
                        lane.position = position;
                        lane.total_in_row = total_in_row;
                    }
                }
                None => {
                    index_of.insert(event.id.as_str(), placed.len());
                    placed.push(PlacedEvent {
                        event,
                        lane: LanePlacement {
                            position,
                            total_in_row,
                        },
                    });
                }
            }
        }
    }

    debug!(region = %region, events = placed.len(), "xếp làn khu vực");
    placed
}

/// Các cột khu vực cần vẽ: một cột nếu mọi sự kiện cùng khu vực, ngược lại đủ bốn cột.
pub fn column_regions(events: &[&TimelineEvent]) -> Vec<Region> {
    let distinct: BTreeSet<Region> = events.iter().map(|event| event.region).collect();
    if distinct.len() == 1 {
        distinct.into_iter().collect()
    } else {
        Region::ALL.to_vec()
    }
}

/// Xếp làn cho toàn bộ các cột sẽ hiển thị.
pub fn place_events<'a>(events: &[&'a TimelineEvent]) -> Vec<PlacedEvent<'a>> {
    column_regions(events)
        .into_iter()
        .flat_map(|region| assign_lanes(events, region))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn span(id: &str, region: Region, start_year: i32, end_year: i32) -> TimelineEvent {
        TimelineEvent {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            region,
            start_year,
            end_year,
            tags: Vec::new(),
        }
    }

    fn lane_of(placed: &[PlacedEvent<'_>], id: &str) -> LanePlacement {
        placed
            .iter()
            .find(|placed| placed.event.id == id)
            .map(|placed| placed.lane)
            .unwrap_or_else(|| panic!("thiếu sự kiện {id}"))
    }

    #[test]
    fn worked_example_uses_densest_year() {
        let events = vec![
            span("A", Region::Europe, 1900, 1920),
            span("B", Region::Europe, 1910, 1915),
            span("C", Region::Europe, 1916, 1918),
        ];
        let refs: Vec<_> = events.iter().collect();

        let ids = |year| {
            lanes_in_year(&refs, Region::Europe, year)
                .into_iter()
                .map(|event| event.id.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(1912), vec!["A", "B"]);
        assert_eq!(ids(1917), vec!["A", "C"]);

        let placed = assign_lanes(&refs, Region::Europe);
        assert_eq!(lane_of(&placed, "A"), LanePlacement { position: 0, total_in_row: 2 });
        assert_eq!(lane_of(&placed, "B"), LanePlacement { position: 1, total_in_row: 2 });
        assert_eq!(lane_of(&placed, "C"), LanePlacement { position: 1, total_in_row: 2 });
    }

    #[test]
    fn disjoint_spans_each_get_a_full_track() {
        let events = vec![
            span("a", Region::Americas, 1500, 1510),
            span("b", Region::Americas, 1511, 1520),
            span("c", Region::Americas, 1600, 1600),
        ];
        let refs: Vec<_> = events.iter().collect();
        for placed in assign_lanes(&refs, Region::Americas) {
            assert_eq!(placed.lane, LanePlacement::default());
        }
    }

    #[test]
    fn overlapping_events_never_share_a_lane() {
        let events = vec![
            span("long", Region::AsiaPacific, 1000, 1100),
            span("mid", Region::AsiaPacific, 1050, 1060),
            span("short", Region::AsiaPacific, 1050, 1052),
        ];
        let refs: Vec<_> = events.iter().collect();
        let placed = assign_lanes(&refs, Region::AsiaPacific);

        let positions: BTreeSet<_> = placed.iter().map(|placed| placed.lane.position).collect();
        assert_eq!(positions.len(), 3);
        for placed in &placed {
            assert_eq!(placed.lane.total_in_row, 3);
        }
        // Cùng năm bắt đầu: sự kiện kết thúc sớm hơn đứng trước.
        assert_eq!(lane_of(&placed, "short").position, 1);
        assert_eq!(lane_of(&placed, "mid").position, 2);
    }

    #[test]
    fn shared_endpoint_counts_as_overlap() {
        let events = vec![
            span("x", Region::Europe, 1800, 1810),
            span("y", Region::Europe, 1810, 1820),
        ];
        let refs: Vec<_> = events.iter().collect();
        let placed = assign_lanes(&refs, Region::Europe);
        assert_eq!(lane_of(&placed, "x"), LanePlacement { position: 0, total_in_row: 2 });
        assert_eq!(lane_of(&placed, "y"), LanePlacement { position: 1, total_in_row: 2 });
    }

    #[test]
    fn regions_are_laid_out_independently() {
        let events = vec![
            span("eu", Region::Europe, 1900, 1950),
            span("am", Region::Americas, 1900, 1950),
        ];
        let refs: Vec<_> = events.iter().collect();
        let placed = place_events(&refs);
        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|placed| placed.lane.total_in_row == 1));
    }

    #[test]
    fn single_region_input_renders_one_column() {
        let events = vec![
            span("a", Region::AsiaPacific, 1, 2),
            span("b", Region::AsiaPacific, 3, 4),
        ];
        let refs: Vec<_> = events.iter().collect();
        assert_eq!(column_regions(&refs), vec![Region::AsiaPacific]);
        assert_eq!(column_regions(&[]), Region::ALL.to_vec());
    }

    #[test]
    fn track_span_splits_the_padded_width() {
        let lane = LanePlacement { position: 1, total_in_row: 3 };
        let (left, width) = lane.track_span(10.0);
        assert_eq!(width, 30.0);
        assert_eq!(left, 35.0);

        let (left, width) = LanePlacement::default().track_span(5.0);
        assert_eq!(left, 2.5);
        assert_eq!(width, 95.0);
    }
}
