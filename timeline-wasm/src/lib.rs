//! Bridge WASM <-> JavaScript trung lập framework.

use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use timeline_core::grid::is_important;
use timeline_core::{
    apply_cascade, events_for_region, region_title, EventBox, EventTone, GridLayout,
    MinimapViewport, PlacedEvent, Region, ScrollMetrics, TagSelection, TimelineConfig,
    TimelineError, TimelineEvent,
};
use timeline_data::{default_dataset, load_dataset_value, Dataset};
use wasm_bindgen::prelude::*;

/// Sự kiện đã xếp làn kèm hộp hiển thị, mọi trường nằm phẳng ở một cấp.
#[derive(Serialize)]
struct JsPlacedEvent<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    region: Region,
    start_year: i32,
    end_year: i32,
    tags: &'a [String],
    position: usize,
    total_in_row: usize,
    #[serde(rename = "box")]
    event_box: EventBox,
    tone: EventTone,
    important: bool,
}

impl<'a> JsPlacedEvent<'a> {
    fn new(grid: &GridLayout<'a>, placed: &PlacedEvent<'a>) -> Self {
        let event = placed.event;
        Self {
            id: &event.id,
            name: &event.name,
            description: &event.description,
            region: event.region,
            start_year: event.start_year,
            end_year: event.end_year,
            tags: &event.tags,
            position: placed.lane.position,
            total_in_row: placed.lane.total_in_row,
            event_box: grid.event_box(placed),
            tone: EventTone::classify(event.tags.as_slice()),
            important: is_important(event),
        }
    }
}

#[derive(Serialize)]
struct JsGridView<'a> {
    title: Option<String>,
    columns: Vec<Region>,
    single_region: bool,
    content_height: f64,
    events: Vec<JsPlacedEvent<'a>>,
}

fn grid_view<'a>(
    events: &[&'a TimelineEvent],
    config: &TimelineConfig,
    title: Option<String>,
) -> JsGridView<'a> {
    let grid = GridLayout::build(events, config);
    let placed = grid
        .placed
        .iter()
        .map(|placed| JsPlacedEvent::new(&grid, placed))
        .collect();
    JsGridView {
        title,
        columns: grid.columns.clone(),
        single_region: grid.is_single_region(),
        content_height: grid.content_height(),
        events: placed,
    }
}

/// Serialize thành object JS thường (không dùng `Map`), giống `JSON.parse`.
fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize {what}: {err}")))
}

/// Xếp làn cho các sự kiện khớp bộ thẻ đang chọn.
#[wasm_bindgen]
pub fn layout_events(
    dataset: JsValue,
    selected_tags: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let dataset = parse_dataset(dataset)?;
    let selected = parse_selection(selected_tags)?;
    let cfg = parse_config(config)?;

    let filtered = timeline_core::filter_events(&dataset.events, &selected, &dataset.taxonomy);
    let view = grid_view(&filtered, &cfg, None);

    to_js(&view, "layout")
}

/// Bật/tắt một thẻ theo tầng, trả về mảng thẻ mới.
#[wasm_bindgen]
pub fn toggle_tag(dataset: JsValue, selected_tags: JsValue, tag: &str) -> Result<JsValue, JsValue> {
    let dataset = parse_dataset(dataset)?;
    let selected = parse_selection(selected_tags)?;
    let next = apply_cascade(&selected, tag, &dataset.taxonomy);

    to_js(&next, "thẻ")
}

/// Lọc sự kiện theo tập thẻ mở rộng.
#[wasm_bindgen]
pub fn filter_events(dataset: JsValue, selected_tags: JsValue) -> Result<JsValue, JsValue> {
    let dataset = parse_dataset(dataset)?;
    let selected = parse_selection(selected_tags)?;
    let filtered = timeline_core::filter_events(&dataset.events, &selected, &dataset.taxonomy);

    to_js(&filtered, "sự kiện")
}

/// Trang theo khu vực: không lọc thẻ, chỉ lọc theo `segment` của đường dẫn.
#[wasm_bindgen]
pub fn region_view(
    dataset: JsValue,
    segment: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let dataset = parse_dataset(dataset)?;
    let cfg = parse_config(config)?;
    let events = events_for_region(&dataset.events, segment);
    let view = grid_view(&events, &cfg, Some(region_title(segment)));

    to_js(&view, "layout")
}

/// Kích thước khung chỉ báo minimap cho một trạng thái cuộn.
#[wasm_bindgen]
pub fn minimap_viewport(metrics: JsValue, minimap_total_height: f64) -> Result<JsValue, JsValue> {
    let metrics: ScrollMetrics = from_value(metrics)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được số đo cuộn: {err}")))?;
    let viewport = MinimapViewport::compute(&metrics, minimap_total_height);

    to_js(&viewport, "minimap")
}

fn parse_dataset(dataset: JsValue) -> Result<Dataset, JsValue> {
    let loaded = if dataset.is_null() || dataset.is_undefined() {
        default_dataset()
    } else {
        let value = from_value::<serde_json::Value>(dataset)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON dataset: {err}")))?;
        load_dataset_value(&value)
    };
    loaded.map_err(|err| JsValue::from_str(&format_timeline_error(err)))
}

fn parse_selection(selected_tags: JsValue) -> Result<TagSelection, JsValue> {
    if selected_tags.is_null() || selected_tags.is_undefined() {
        return Ok(TagSelection::new());
    }
    from_value(selected_tags)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách thẻ: {err}")))
}

fn parse_config(config: Option<JsValue>) -> Result<TimelineConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_null() && !js_cfg.is_undefined() => {
            from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))
        }
        _ => Ok(TimelineConfig::default()),
    }
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_events_serialize_as_flat_records() {
        let dataset = default_dataset().expect("Không đọc được dataset mặc định");
        let cfg = TimelineConfig::default();
        let events = events_for_region(&dataset.events, "europe");
        let view = grid_view(&events, &cfg, Some(region_title("europe")));
        let value = serde_json::to_value(&view).expect("Không serialize layout");

        let first = &value["events"][0];
        assert!(first.is_object());
        for key in ["id", "name", "region", "start_year", "end_year", "tags"] {
            assert!(first.get(key).is_some(), "thiếu trường {key}");
        }
        assert!(first["position"].is_u64());
        assert!(first["total_in_row"].is_u64());
        assert!(first["box"]["top"].is_f64());
        assert!(first["box"]["width"].is_f64());
        assert!(first.get("lane").is_none());
        assert!(first.get("event").is_none());
    }

    #[test]
    fn grid_view_carries_boxes_and_tones() {
        let dataset = default_dataset().expect("Không đọc được dataset mặc định");
        let cfg = TimelineConfig::default();
        let events = events_for_region(&dataset.events, "europe");
        let view = grid_view(&events, &cfg, Some(region_title("europe")));

        assert_eq!(view.title.as_deref(), Some("Europe"));
        assert!(view.single_region);
        assert_eq!(view.events.len(), events.len());
        for event in &view.events {
            assert!(event.event_box.width <= 100.0 - cfg.single_region_padding);
        }
        let punic = view
            .events
            .iter()
            .find(|event| event.name == "Punic Wars")
            .map(|event| event.tone);
        assert_eq!(punic, Some(EventTone::Conflict));
    }
}
