//! JSON loader for the tag taxonomy and the historical event store.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use timeline_core::{Region, TagNode, TagTaxonomy, TimelineError, TimelineEvent};
use tracing::{debug, warn};

const DEFAULT_TAGS_JSON: &str = include_str!("../data/tags.json");
const DEFAULT_EVENTS_JSON: &str = include_str!("../data/events.json");

/// Taxonomy and events loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub taxonomy: TagTaxonomy,
    pub events: Vec<TimelineEvent>,
}

impl Dataset {
    /// Tags referenced by events but missing from the taxonomy, as `(event id, tag)`.
    pub fn unknown_tags(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .flat_map(|event| {
                event
                    .tags
                    .iter()
                    .filter(|tag| !self.taxonomy.contains(tag))
                    .map(move |tag| (event.id.as_str(), tag.as_str()))
            })
            .collect()
    }
}

/// The dataset bundled with the crate.
pub fn default_dataset() -> Result<Dataset, TimelineError> {
    load_dataset_str(DEFAULT_TAGS_JSON, DEFAULT_EVENTS_JSON)
}

/// Load a dataset from separate taxonomy and event JSON documents.
pub fn load_dataset_str(tags_json: &str, events_json: &str) -> Result<Dataset, TimelineError> {
    let taxonomy = load_taxonomy_str(tags_json)?;
    let events = load_events_str(events_json)?;
    Ok(finish_dataset(taxonomy, events))
}

/// Load a dataset from a single `{ "tags": [...], "events": [...] }` value.
pub fn load_dataset_value(value: &Value) -> Result<Dataset, TimelineError> {
    let tags = value.get("tags").ok_or(TimelineError::MissingData)?;
    let events = value.get("events").ok_or(TimelineError::MissingData)?;
    let taxonomy = load_taxonomy_value(tags)?;
    let events = load_events_value(events)?;
    Ok(finish_dataset(taxonomy, events))
}

fn finish_dataset(taxonomy: TagTaxonomy, events: Vec<TimelineEvent>) -> Dataset {
    let dataset = Dataset { taxonomy, events };
    for (event_id, tag) in dataset.unknown_tags() {
        warn!(event_id, tag, "event references a tag missing from the taxonomy");
    }
    debug!(
        tags = dataset.taxonomy.all_tags().len(),
        events = dataset.events.len(),
        "dataset loaded"
    );
    dataset
}

/// Parse the taxonomy forest from a JSON string.
pub fn load_taxonomy_str(tags_json: &str) -> Result<TagTaxonomy, TimelineError> {
    let value: Value =
        serde_json::from_str(tags_json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    load_taxonomy_value(&value)
}

/// Parse the taxonomy forest from a `serde_json::Value`.
pub fn load_taxonomy_value(value: &Value) -> Result<TagTaxonomy, TimelineError> {
    if !value.is_array() {
        return Err(TimelineError::Parse(
            "Expected the tag taxonomy to be an array of root nodes".to_string(),
        ));
    }
    let forest = Vec::<TagNode>::deserialize(value)
        .map_err(|err| TimelineError::Parse(format!("Invalid tag node: {err}")))?;
    let taxonomy = TagTaxonomy::new(&forest);

    for name in taxonomy.duplicate_names() {
        warn!(
            tag = name,
            parent = taxonomy.parent_of(name),
            "tag name appears more than once, lookups resolve to the first occurrence"
        );
    }
    Ok(taxonomy)
}

/// Event record as stored on disk. Ids may be numbers or strings.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: Value,
    name: String,
    #[serde(default)]
    description: Option<String>,
    region: String,
    start_year: i32,
    end_year: i32,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse and validate the event list from a JSON string.
pub fn load_events_str(events_json: &str) -> Result<Vec<TimelineEvent>, TimelineError> {
    let value: Value =
        serde_json::from_str(events_json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    load_events_value(&value)
}

/// Parse and validate the event list from a `serde_json::Value`.
///
/// Events with an unknown region are skipped. Reversed spans and repeated ids
/// reject the whole list.
pub fn load_events_value(value: &Value) -> Result<Vec<TimelineEvent>, TimelineError> {
    let entries = value.as_array().ok_or(TimelineError::MissingData)?;

    let mut events = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let raw = RawEvent::deserialize(entry)
            .map_err(|err| TimelineError::Parse(format!("Event #{index}: {err}")))?;

        let Some(id) = event_id(&raw.id) else {
            return Err(TimelineError::Parse(format!(
                "Event #{index} has no usable id"
            )));
        };

        let Some(region) = Region::from_name(&raw.region) else {
            warn!(event_id = %id, region = %raw.region, "skipping event with unknown region");
            continue;
        };

        events.push(TimelineEvent {
            id,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            region,
            start_year: raw.start_year,
            end_year: raw.end_year,
            tags: dedup_tags(raw.tags),
        });
    }

    validate_events(&events)?;
    Ok(events)
}

/// Reject reversed spans and repeated ids.
pub fn validate_events(events: &[TimelineEvent]) -> Result<(), TimelineError> {
    let mut seen = HashSet::with_capacity(events.len());
    for event in events {
        if event.start_year > event.end_year {
            return Err(TimelineError::InvalidSpan {
                id: event.id.clone(),
                start_year: event.start_year,
                end_year: event.end_year,
            });
        }
        if !seen.insert(event.id.as_str()) {
            return Err(TimelineError::DuplicateEvent(event.id.clone()));
        }
    }
    Ok(())
}

fn event_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
