//! Hình học lưới năm × khu vực, phân loại màu và trạng thái hover.

use serde::{Deserialize, Serialize};

use crate::layout::{column_regions, place_events, PlacedEvent};
use crate::{Region, TimelineConfig, TimelineEvent};

/// Độ lệch (px) của bảng chi tiết so với con trỏ.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, 10.0);

const MAJOR_TAGS: [&str; 4] = ["Revolution", "War", "Empire", "Political"];

/// Nhóm màu hiển thị của sự kiện.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventTone {
    Conflict,
    Economic,
    Cultural,
    Political,
}

impl EventTone {
    /// Quét thẻ theo thứ tự ưu tiên cố định; không khớp thì là chính trị.
    pub fn classify<S: AsRef<str>>(tags: &[S]) -> Self {
        let has = |wanted: &[&str]| tags.iter().any(|tag| wanted.contains(&tag.as_ref()));
        if has(&["War", "Military Campaign"]) {
            EventTone::Conflict
        } else if has(&["Economic", "Trade & Commerce"]) {
            EventTone::Economic
        } else if has(&["Cultural", "Social Structure"]) {
            EventTone::Cultural
        } else {
            EventTone::Political
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventTone::Conflict => "conflict",
            EventTone::Economic => "economic",
            EventTone::Cultural => "cultural",
            EventTone::Political => "political",
        }
    }
}

/// Sự kiện "quan trọng" được in đậm hơn: dài trên 10 năm hoặc mang thẻ lớn.
pub fn is_important(event: &TimelineEvent) -> bool {
    event.duration() > 10 || event.tags.iter().any(|tag| MAJOR_TAGS.contains(&tag.as_str()))
}

pub fn era(year: i32) -> &'static str {
    if year < 0 {
        "BCE"
    } else {
        "CE"
    }
}

/// `-500` → `"500 BCE"`, `1900` → `"1900 CE"`.
pub fn format_year(year: i32) -> String {
    format!("{} {}", year.unsigned_abs(), era(year))
}

pub fn format_year_range(start_year: i32, end_year: i32) -> String {
    format!("{} - {}", format_year(start_year), format_year(end_year))
}

/// Độ đậm của vạch năm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TickWeight {
    Major,
    Medium,
    Minor,
}

impl TickWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            TickWeight::Major => "major",
            TickWeight::Medium => "medium",
            TickWeight::Minor => "minor",
        }
    }
}

/// Một hàng trên trục năm.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YearTick {
    pub year: i32,
    /// Chỉ các năm chia hết cho 5 mới có nhãn.
    pub label: Option<String>,
    pub era: &'static str,
    pub weight: TickWeight,
}

impl YearTick {
    pub fn for_year(year: i32) -> Self {
        let weight = if year.rem_euclid(10) == 0 {
            TickWeight::Major
        } else if year.rem_euclid(5) == 0 {
            TickWeight::Medium
        } else {
            TickWeight::Minor
        };
        Self {
            year,
            label: (weight != TickWeight::Minor).then(|| year.unsigned_abs().to_string()),
            era: era(year),
            weight,
        }
    }
}

/// Hộp của một sự kiện: `top`/`height` theo px, `left`/`width` theo phần trăm track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EventBox {
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

/// Nội dung bảng chi tiết khi hover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDetail {
    pub name: String,
    pub years: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl EventDetail {
    pub fn of(event: &TimelineEvent) -> Self {
        Self {
            name: event.name.clone(),
            years: format_year_range(event.start_year, event.end_year),
            description: event.description.clone(),
            tags: event.tags.clone(),
        }
    }
}

/// Bố cục lưới của một tập sự kiện đã lọc.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout<'a> {
    pub config: TimelineConfig,
    pub columns: Vec<Region>,
    pub placed: Vec<PlacedEvent<'a>>,
}

impl<'a> GridLayout<'a> {
    pub fn build(events: &[&'a TimelineEvent], config: &TimelineConfig) -> Self {
        Self {
            config: config.clone(),
            columns: column_regions(events),
            placed: place_events(events),
        }
    }

    pub fn is_single_region(&self) -> bool {
        self.columns.len() == 1
    }

    pub fn padding(&self) -> f64 {
        self.config.track_padding(self.is_single_region())
    }

    /// Độ lệch dọc (px) của một thời điểm; phần lẻ của năm được nội suy trong hàng.
    pub fn year_offset(&self, year: f64) -> f64 {
        let whole = year.floor();
        let fraction = year - whole;
        (whole - f64::from(self.config.start_year)) * self.config.row_height
            + fraction * self.config.row_height
    }

    pub fn content_height(&self) -> f64 {
        f64::from(self.config.total_years) * self.config.row_height
    }

    pub fn ticks(&self) -> Vec<YearTick> {
        self.config.years().map(YearTick::for_year).collect()
    }

    pub fn event_box(&self, placed: &PlacedEvent<'_>) -> EventBox {
        let start = f64::from(placed.event.start_year);
        let end = f64::from(placed.event.end_year);
        let row_height = self.config.row_height;
        let top = self.year_offset(start);
        let height = (self.year_offset(end) - top - 1.0).max(row_height / 2.0);
        let (left, width) = placed.lane.track_span(self.padding());
        EventBox {
            top,
            height,
            left,
            width,
        }
    }

    /// Các sự kiện đã xếp làn của một cột.
    pub fn column_events(&self, region: Region) -> impl Iterator<Item = &PlacedEvent<'a>> {
        self.placed
            .iter()
            .filter(move |placed| placed.event.region == region)
    }
}

/// Theo dõi con trỏ và sự kiện đang được hover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    pointer: Option<(f64, f64)>,
    hovered: Option<String>,
}

impl HoverState {
    pub fn pointer_moved(&mut self, event_id: &str, x: f64, y: f64) {
        self.pointer = Some((x, y));
        if self.hovered.as_deref() != Some(event_id) {
            self.hovered = Some(event_id.to_string());
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Góc neo của bảng chi tiết nếu `event_id` đang được hover.
    pub fn tooltip_anchor(&self, event_id: &str) -> Option<(f64, f64)> {
        let (x, y) = self.pointer?;
        (self.hovered.as_deref() == Some(event_id))
            .then_some((x + TOOLTIP_OFFSET.0, y + TOOLTIP_OFFSET.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::span;

    fn tagged(tags: &[&str], start_year: i32, end_year: i32) -> TimelineEvent {
        let mut event = span("t", Region::Europe, start_year, end_year);
        event.tags = tags.iter().map(|tag| tag.to_string()).collect();
        event
    }

    #[test]
    fn tone_follows_priority_order() {
        assert_eq!(EventTone::classify(&["Trade & Commerce", "War"]), EventTone::Conflict);
        assert_eq!(EventTone::classify(&["Cultural", "Economic"]), EventTone::Economic);
        assert_eq!(EventTone::classify(&["Social Structure"]), EventTone::Cultural);
        assert_eq!(EventTone::classify::<&str>(&[]), EventTone::Political);
        assert_eq!(EventTone::classify(&["Battle"]), EventTone::Political);
    }

    #[test]
    fn importance_uses_duration_or_major_tags() {
        assert!(is_important(&tagged(&[], 1900, 1911)));
        assert!(!is_important(&tagged(&[], 1900, 1910)));
        assert!(is_important(&tagged(&["Revolution"], 1789, 1789)));
        assert!(!is_important(&tagged(&["Music"], 1789, 1790)));
    }

    #[test]
    fn year_labels_use_bce_and_ce() {
        assert_eq!(format_year(-500), "500 BCE");
        assert_eq!(format_year(0), "0 CE");
        assert_eq!(format_year_range(-27, 14), "27 BCE - 14 CE");
    }

    #[test]
    fn ticks_label_every_fifth_year() {
        assert_eq!(YearTick::for_year(-10).weight, TickWeight::Major);
        assert_eq!(YearTick::for_year(-5).label.as_deref(), Some("5"));
        assert_eq!(YearTick::for_year(-5).era, "BCE");
        assert_eq!(YearTick::for_year(1905).weight, TickWeight::Medium);
        assert_eq!(YearTick::for_year(1907).label, None);
    }

    #[test]
    fn event_box_maps_years_to_rows() {
        let config = TimelineConfig::with_range(1900, 100);
        let events = vec![
            span("a", Region::Europe, 1910, 1920),
            span("b", Region::Europe, 1915, 1915),
            span("c", Region::Americas, 1900, 1901),
        ];
        let refs: Vec<_> = events.iter().collect();
        let grid = GridLayout::build(&refs, &config);
        assert!(!grid.is_single_region());
        assert_eq!(grid.content_height(), 2400.0);

        let a = grid.column_events(Region::Europe).next().map(|placed| grid.event_box(placed));
        assert_eq!(
            a,
            Some(EventBox {
                top: 240.0,
                height: 239.0,
                left: 5.0,
                width: 45.0
            })
        );

        let b = grid
            .column_events(Region::Europe)
            .find(|placed| placed.event.id == "b")
            .map(|placed| grid.event_box(placed));
        // Sự kiện không có độ dài vẫn cao tối thiểu nửa hàng.
        assert_eq!(b.map(|b| (b.top, b.height)), Some((360.0, 12.0)));
    }

    #[test]
    fn fractional_years_interpolate_within_a_row() {
        let config = TimelineConfig::with_range(1900, 10);
        let grid = GridLayout::build(&[], &config);
        assert_eq!(grid.year_offset(1902.5), 60.0);
        assert_eq!(grid.year_offset(1899.75), -6.0);
    }

    #[test]
    fn single_region_uses_narrow_padding() {
        let config = TimelineConfig::with_range(1900, 10);
        let events = vec![span("solo", Region::AsiaPacific, 1901, 1903)];
        let refs: Vec<_> = events.iter().collect();
        let grid = GridLayout::build(&refs, &config);
        assert!(grid.is_single_region());
        let event_box = grid.event_box(&grid.placed[0]);
        assert_eq!((event_box.left, event_box.width), (2.5, 95.0));
    }

    #[test]
    fn hover_tracks_pointer_until_leave() {
        let mut hover = HoverState::default();
        assert_eq!(hover.tooltip_anchor("a"), None);

        hover.pointer_moved("a", 100.0, 50.0);
        assert_eq!(hover.hovered(), Some("a"));
        assert_eq!(hover.tooltip_anchor("a"), Some((110.0, 60.0)));
        assert_eq!(hover.tooltip_anchor("b"), None);

        hover.pointer_left();
        assert_eq!(hover, HoverState::default());
    }

    #[test]
    fn detail_lists_name_years_and_tags() {
        let event = tagged(&["War", "Empires"], -264, -146);
        let detail = EventDetail::of(&event);
        assert_eq!(detail.years, "264 BCE - 146 BCE");
        assert_eq!(detail.tags, vec!["War", "Empires"]);
    }
}
