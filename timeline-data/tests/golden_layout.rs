use std::fs;

use serde_json::Value;
use timeline_core::{
    apply_cascade, events_for_region, filter_events, place_events, Region, TagSelection,
};
use timeline_data::{default_dataset, load_dataset_str, Dataset};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn fixture_dataset() -> Dataset {
    let tags =
        fs::read_to_string(fixture_path("taxonomy.json")).expect("Không đọc được taxonomy mẫu");
    let events =
        fs::read_to_string(fixture_path("events.json")).expect("Không đọc được sự kiện mẫu");
    load_dataset_str(&tags, &events).expect("Không tạo được dataset")
}

#[test]
fn political_selection_matches_golden_layout() {
    let dataset = fixture_dataset();
    let selected = apply_cascade(&TagSelection::new(), "Political", &dataset.taxonomy);

    let filtered = filter_events(&dataset.events, &selected, &dataset.taxonomy);
    let placed = place_events(&filtered);
    let actual = serde_json::to_value(&placed).expect("Không serialize layout");

    let expected = fs::read_to_string(fixture_path("political_layout.json"))
        .expect("Không đọc được golden layout");
    let expected: Value = serde_json::from_str(&expected).expect("Golden không hợp lệ");

    assert_eq!(actual, expected);
}

#[test]
fn child_selection_spans_regions() {
    let dataset = fixture_dataset();
    let selected = apply_cascade(&TagSelection::new(), "Trade & Commerce", &dataset.taxonomy);
    assert_eq!(selected.as_slice(), ["Trade & Commerce", "Markets", "Maritime Trade"]);

    let filtered = filter_events(&dataset.events, &selected, &dataset.taxonomy);
    let placed = place_events(&filtered);
    let ids: Vec<_> = placed.iter().map(|placed| placed.event.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "4"]);
    assert!(placed.iter().all(|placed| placed.lane.total_in_row == 1));
}

#[test]
fn region_page_ignores_tag_selection() {
    let dataset = fixture_dataset();
    let europe = events_for_region(&dataset.events, "europe");
    assert_eq!(europe.len(), 3);

    let placed = place_events(&europe);
    let densest = placed
        .iter()
        .find(|placed| placed.event.id == "1")
        .map(|placed| placed.lane.total_in_row);
    assert_eq!(densest, Some(2));
}

#[test]
fn bundled_dataset_loads_cleanly() {
    let dataset = default_dataset().expect("Không đọc được dataset mặc định");
    assert!(!dataset.events.is_empty());
    assert_eq!(
        dataset.taxonomy.top_level_tags(),
        vec!["Cultural", "Economic", "Environmental", "Political", "Scientific", "Social"]
    );
    for region in Region::ALL {
        assert!(
            dataset.events.iter().any(|event| event.region == region),
            "thiếu sự kiện cho {region}"
        );
    }
    // "Empire" chỉ dùng cho độ đậm chữ, không nằm trong taxonomy.
    assert!(dataset
        .unknown_tags()
        .iter()
        .all(|(_, tag)| *tag == "Empire"));
}
