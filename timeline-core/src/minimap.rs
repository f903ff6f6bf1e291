//! Minimap thu nhỏ và đồng bộ cuộn một chiều từ lưới chính.

use serde::{Deserialize, Serialize};

use crate::grid::EventTone;
use crate::layout::column_regions;
use crate::{Region, TimelineConfig, TimelineEvent};

/// Kích thước cuộn của khung chứa lưới chính.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Tỉ lệ phần nội dung đang nhìn thấy, trong [0, 1].
    pub fn visible_fraction(&self) -> f64 {
        if self.scroll_height <= 0.0 {
            return 0.0;
        }
        (self.client_height / self.scroll_height).clamp(0.0, 1.0)
    }

    /// Vị trí cuộn tương đối, trong [0, 1]; 0 khi nội dung không cuộn được.
    pub fn scroll_fraction(&self) -> f64 {
        let range = self.scroll_height - self.client_height;
        if range <= 0.0 {
            return 0.0;
        }
        (self.scroll_top / range).clamp(0.0, 1.0)
    }
}

/// Phía nhận thông báo cuộn. Lưới chính là nguồn duy nhất.
pub trait ScrollObserver {
    fn scrolled(&mut self, metrics: &ScrollMetrics);
    fn resized(&mut self, metrics: &ScrollMetrics);
}

/// Khung chỉ báo vùng nhìn thấy trên minimap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MinimapViewport {
    pub height: f64,
    pub top: f64,
}

impl MinimapViewport {
    pub fn compute(metrics: &ScrollMetrics, minimap_total_height: f64) -> Self {
        let height = metrics.visible_fraction() * minimap_total_height;
        let top = metrics.scroll_fraction() * (minimap_total_height - height).max(0.0);
        Self { height, top }
    }
}

/// Trạng thái minimap đi theo lưới chính.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinimapSync {
    content_height: f64,
    client_height: f64,
    last: ScrollMetrics,
    viewport: MinimapViewport,
    scroll_top: f64,
}

impl MinimapSync {
    /// `content_height` là chiều cao toàn bộ minimap, `client_height` là phần hiển thị của nó.
    pub fn new(content_height: f64, client_height: f64) -> Self {
        Self {
            content_height,
            client_height,
            ..Self::default()
        }
    }

    pub fn set_client_height(&mut self, client_height: f64) {
        self.client_height = client_height;
        self.sync_offsets();
    }

    pub fn viewport(&self) -> MinimapViewport {
        self.viewport
    }

    /// `scroll_top` cần gán cho khung minimap.
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn sync_offsets(&mut self) {
        let fraction = self.last.scroll_fraction();
        self.scroll_top = fraction * (self.content_height - self.client_height).max(0.0);
        self.viewport.top = fraction * (self.content_height - self.viewport.height).max(0.0);
    }
}

impl ScrollObserver for MinimapSync {
    fn scrolled(&mut self, metrics: &ScrollMetrics) {
        self.last = *metrics;
        self.sync_offsets();
    }

    fn resized(&mut self, metrics: &ScrollMetrics) {
        self.last = *metrics;
        self.viewport = MinimapViewport::compute(metrics, self.content_height);
        self.sync_offsets();
    }
}

/// Một vạch sự kiện trên minimap, không xếp làn.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MinimapBar<'a> {
    pub id: &'a str,
    pub region: Region,
    pub top: f64,
    pub height: f64,
    pub tone: EventTone,
}

/// Bố cục minimap cho cùng tập sự kiện với lưới chính.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapLayout<'a> {
    pub columns: Vec<Region>,
    pub bars: Vec<MinimapBar<'a>>,
    pub content_height: f64,
}

impl<'a> MinimapLayout<'a> {
    pub fn build(events: &[&'a TimelineEvent], config: &TimelineConfig) -> Self {
        let columns = column_regions(events);
        let row_height = config.minimap_row_height;
        let bars = events
            .iter()
            .filter(|event| columns.contains(&event.region))
            .map(|event| MinimapBar {
                id: event.id.as_str(),
                region: event.region,
                top: f64::from(event.start_year - config.start_year) * row_height,
                height: (f64::from(event.duration()) * row_height).max(1.0),
                tone: EventTone::classify(event.tags.as_slice()),
            })
            .collect();
        Self {
            columns,
            bars,
            content_height: f64::from(config.total_years) * row_height,
        }
    }

    pub fn column_bars(&self, region: Region) -> impl Iterator<Item = &MinimapBar<'a>> {
        self.bars.iter().filter(move |bar| bar.region == region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::span;

    #[test]
    fn viewport_height_is_proportional_to_visible_fraction() {
        let metrics = ScrollMetrics::new(0.0, 2000.0, 400.0);
        let viewport = MinimapViewport::compute(&metrics, 300.0);
        assert_eq!(viewport.height, 60.0);
        assert_eq!(viewport.top, 0.0);
    }

    #[test]
    fn viewport_follows_scroll_position() {
        let metrics = ScrollMetrics::new(1600.0, 2000.0, 400.0);
        let viewport = MinimapViewport::compute(&metrics, 300.0);
        assert_eq!(viewport.top, 240.0);
    }

    #[test]
    fn empty_container_yields_empty_viewport() {
        let metrics = ScrollMetrics::default();
        assert_eq!(MinimapViewport::compute(&metrics, 300.0), MinimapViewport::default());
        assert_eq!(metrics.scroll_fraction(), 0.0);
    }

    #[test]
    fn sync_mirrors_scroll_proportionally() {
        let mut sync = MinimapSync::new(1000.0, 200.0);
        sync.resized(&ScrollMetrics::new(0.0, 2000.0, 400.0));
        assert_eq!(sync.viewport().height, 200.0);

        sync.scrolled(&ScrollMetrics::new(800.0, 2000.0, 400.0));
        assert_eq!(sync.scroll_top(), 400.0);
        assert_eq!(sync.viewport().top, 400.0);
        // Cuộn không tính lại chiều cao khung.
        assert_eq!(sync.viewport().height, 200.0);
    }

    #[test]
    fn resize_recomputes_viewport_height() {
        let mut sync = MinimapSync::new(300.0, 300.0);
        sync.resized(&ScrollMetrics::new(0.0, 2000.0, 400.0));
        assert_eq!(sync.viewport().height, 60.0);
        sync.resized(&ScrollMetrics::new(0.0, 2000.0, 1000.0));
        assert_eq!(sync.viewport().height, 150.0);
    }

    #[test]
    fn bars_stack_by_absolute_position() {
        let config = TimelineConfig::with_range(1900, 100);
        let events = vec![
            span("a", Region::Europe, 1910, 1920),
            span("b", Region::Europe, 1912, 1912),
        ];
        let refs: Vec<_> = events.iter().collect();
        let minimap = MinimapLayout::build(&refs, &config);
        assert_eq!(minimap.columns, vec![Region::Europe]);
        assert_eq!(minimap.content_height, 200.0);

        let bars: Vec<_> = minimap
            .column_bars(Region::Europe)
            .map(|bar| (bar.id, bar.top, bar.height))
            .collect();
        assert_eq!(bars, vec![("a", 20.0, 20.0), ("b", 24.0, 1.0)]);
    }
}
