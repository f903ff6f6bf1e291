//! Logic lõi dựng timeline sự kiện lịch sử: taxonomy thẻ, bộ lọc, xếp làn và hình học lưới.

use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

pub mod grid;
pub mod layout;
pub mod minimap;
pub mod region;
pub mod selection;
pub mod taxonomy;

pub use grid::{EventBox, EventDetail, EventTone, GridLayout, HoverState, YearTick};
pub use layout::{
    assign_lanes, column_regions, lanes_in_year, place_events, LanePlacement, PlacedEvent,
};
pub use minimap::{
    MinimapBar, MinimapLayout, MinimapSync, MinimapViewport, ScrollMetrics, ScrollObserver,
};
pub use region::{events_for_region, region_slug, region_title, Route};
pub use selection::{apply_cascade, expanded_selection, filter_events, TagSelection};
pub use taxonomy::{TagNode, TagTaxonomy};

/// Năm bắt đầu mặc định của trục thời gian (1200 TCN).
pub const DEFAULT_START_YEAR: i32 = -1200;

/// Cấu hình kích thước lưới, minimap và khoảng đệm làn.
///
/// Khi đọc từ JSON/TOML mọi trường đều có thể vắng, xem [`PartialTimelineConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "PartialTimelineConfig")]
pub struct TimelineConfig {
    /// Năm đầu tiên hiển thị (đánh số thiên văn, âm là TCN).
    pub start_year: i32,
    /// Số năm trên trục, tính từ `start_year`.
    pub total_years: u32,
    /// Chiều cao (px) mỗi năm trên lưới chính.
    pub row_height: f64,
    /// Chiều cao (px) mỗi năm trên minimap.
    pub minimap_row_height: f64,
    /// Bề rộng (px) của minimap.
    pub minimap_width: f64,
    /// Phần trăm lề dành cho track khi hiển thị nhiều khu vực.
    pub multi_region_padding: f64,
    /// Phần trăm lề khi chỉ hiển thị một khu vực.
    pub single_region_padding: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::through_present(DEFAULT_START_YEAR)
    }
}

impl TimelineConfig {
    /// Cấu hình có trục kéo dài từ `start_year` tới hết năm hiện tại.
    pub fn through_present(start_year: i32) -> Self {
        let present = i64::from(Utc::now().year());
        let total_years = (present - i64::from(start_year) + 1).max(1);
        Self::with_range(start_year, u32::try_from(total_years).unwrap_or(u32::MAX))
    }

    /// `total_years` bị chặn để năm cuối không vượt quá `i32::MAX`.
    pub fn with_range(start_year: i32, total_years: u32) -> Self {
        Self {
            start_year,
            total_years: total_years.min(max_total_years(start_year)),
            row_height: 24.0,
            minimap_row_height: 2.0,
            minimap_width: 120.0,
            multi_region_padding: 10.0,
            single_region_padding: 5.0,
        }
    }

    /// Năm cuối cùng (bao gồm) trên trục.
    pub fn end_year(&self) -> i32 {
        let end = i64::from(self.start_year) + i64::from(self.total_years) - 1;
        end.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Các năm trên trục theo thứ tự tăng dần.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        (self.start_year..=self.end_year()).take(self.total_years as usize)
    }

    pub fn track_padding(&self, single_region: bool) -> f64 {
        if single_region {
            self.single_region_padding
        } else {
            self.multi_region_padding
        }
    }
}

fn max_total_years(start_year: i32) -> u32 {
    let room = i64::from(i32::MAX) - i64::from(start_year) + 1;
    u32::try_from(room).unwrap_or(u32::MAX)
}

/// Cấu hình đọc từ bên ngoài (JS, TOML), trường nào cũng có thể thiếu.
///
/// Thiếu `total_years` thì trục kéo dài từ `start_year` đã cho tới năm hiện tại.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PartialTimelineConfig {
    pub start_year: Option<i32>,
    pub total_years: Option<u32>,
    pub row_height: Option<f64>,
    pub minimap_row_height: Option<f64>,
    pub minimap_width: Option<f64>,
    pub multi_region_padding: Option<f64>,
    pub single_region_padding: Option<f64>,
}

impl From<PartialTimelineConfig> for TimelineConfig {
    fn from(cfg: PartialTimelineConfig) -> Self {
        let start_year = cfg.start_year.unwrap_or(DEFAULT_START_YEAR);
        let mut base = match cfg.total_years {
            Some(years) => TimelineConfig::with_range(start_year, years),
            None => TimelineConfig::through_present(start_year),
        };
        if let Some(height) = cfg.row_height {
            base.row_height = height;
        }
        if let Some(height) = cfg.minimap_row_height {
            base.minimap_row_height = height;
        }
        if let Some(width) = cfg.minimap_width {
            base.minimap_width = width;
        }
        if let Some(padding) = cfg.multi_region_padding {
            base.multi_region_padding = padding;
        }
        if let Some(padding) = cfg.single_region_padding {
            base.single_region_padding = padding;
        }
        base
    }
}

/// Các khu vực địa chính trị, theo thứ tự cột trên lưới.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "Africa & Middle East")]
    AfricaMiddleEast,
    #[serde(rename = "Asia Pacific")]
    AsiaPacific,
    #[serde(rename = "Americas")]
    Americas,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Europe,
        Region::AfricaMiddleEast,
        Region::AsiaPacific,
        Region::Americas,
    ];

    /// Tên hiển thị, cũng là giá trị trong dữ liệu JSON.
    pub fn display_name(self) -> &'static str {
        match self {
            Region::Europe => "Europe",
            Region::AfricaMiddleEast => "Africa & Middle East",
            Region::AsiaPacific => "Asia Pacific",
            Region::Americas => "Americas",
        }
    }

    /// Tìm khu vực theo tên hiển thị, không phân biệt hoa thường.
    pub fn from_name(name: &str) -> Option<Region> {
        Region::ALL
            .into_iter()
            .find(|region| region.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Một sự kiện lịch sử trên timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub region: Region,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TimelineEvent {
    /// Độ dài sự kiện tính bằng năm.
    pub fn duration(&self) -> i32 {
        self.end_year - self.start_year
    }

    /// Sự kiện có bao phủ năm `year` hay không (bao gồm hai đầu mút).
    pub fn covers(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own == tag)
    }
}

/// Lỗi chung khi nạp và dựng timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Sự kiện {id} có năm bắt đầu {start_year} sau năm kết thúc {end_year}")]
    InvalidSpan {
        id: String,
        start_year: i32,
        end_year: i32,
    },
    #[error("Mã sự kiện bị trùng: {0}")]
    DuplicateEvent(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}
