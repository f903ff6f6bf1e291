//! Chọn thẻ theo tầng và lọc sự kiện theo tập thẻ mở rộng.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{TagTaxonomy, TimelineEvent};

/// Tập thẻ người dùng đã chọn, giữ thứ tự thêm vào.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TagSelection(Vec<String>);

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|selected| selected == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn with(mut self, tag: &str) -> Self {
        if !self.contains(tag) {
            self.0.push(tag.to_string());
        }
        self
    }
}

impl<S: Into<String>> FromIterator<S> for TagSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |selection, tag| {
            let tag: String = tag.into();
            selection.with(&tag)
        })
    }
}

/// Bật/tắt `tag` theo tầng và trả về tập chọn mới.
///
/// Bật: thêm `tag` rồi lần lượt thêm các hậu duệ chưa được chọn.
/// Tắt: bỏ `tag` cùng mọi hậu duệ đang được chọn. Cờ chọn của thẻ cha không đổi.
pub fn apply_cascade(selected: &TagSelection, tag: &str, taxonomy: &TagTaxonomy) -> TagSelection {
    let descendants = taxonomy.descendants(tag);

    if selected.contains(tag) {
        let removed: HashSet<&str> = descendants.into_iter().chain([tag]).collect();
        TagSelection(
            selected
                .0
                .iter()
                .filter(|name| !removed.contains(name.as_str()))
                .cloned()
                .collect(),
        )
    } else {
        descendants
            .into_iter()
            .fold(selected.clone().with(tag), |next, descendant| next.with(descendant))
    }
}

/// Hợp của {thẻ} ∪ hậu duệ, lấy trên mọi thẻ đang chọn. Chỉ mở rộng xuống dưới.
pub fn expanded_selection<'a>(
    selected: &'a TagSelection,
    taxonomy: &'a TagTaxonomy,
) -> HashSet<&'a str> {
    selected
        .iter()
        .flat_map(|tag| std::iter::once(tag).chain(taxonomy.descendants(tag)))
        .collect()
}

/// Giữ các sự kiện có ít nhất một thẻ thuộc tập mở rộng; tập chọn rỗng thì giữ tất cả.
pub fn filter_events<'e>(
    events: &'e [TimelineEvent],
    selected: &TagSelection,
    taxonomy: &TagTaxonomy,
) -> Vec<&'e TimelineEvent> {
    if selected.is_empty() {
        return events.iter().collect();
    }

    let expanded = expanded_selection(selected, taxonomy);
    let filtered: Vec<_> = events
        .iter()
        .filter(|event| event.tags.iter().any(|tag| expanded.contains(tag.as_str())))
        .collect();
    debug!(
        selected = selected.len(),
        expanded = expanded.len(),
        kept = filtered.len(),
        total = events.len(),
        "lọc sự kiện theo thẻ"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::tests::sample_taxonomy;
    use crate::Region;

    fn event(id: &str, tags: &[&str]) -> TimelineEvent {
        TimelineEvent {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            region: Region::Europe,
            start_year: 1900,
            end_year: 1901,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    #[test]
    fn toggling_parent_on_selects_every_descendant() {
        let taxonomy = sample_taxonomy();
        let next = apply_cascade(&TagSelection::new(), "Political", &taxonomy);
        assert_eq!(
            next.as_slice(),
            ["Political", "Conflict", "War", "Revolution", "Governance", "Empires"]
        );
        assert!(taxonomy.is_group_fully_selected("Political", next.as_slice()));
    }

    #[test]
    fn toggling_on_skips_already_selected_descendants() {
        let taxonomy = sample_taxonomy();
        let start: TagSelection = ["War"].into_iter().collect();
        let next = apply_cascade(&start, "Conflict", &taxonomy);
        assert_eq!(next.as_slice(), ["War", "Conflict", "Revolution"]);
    }

    #[test]
    fn toggle_on_then_off_restores_previous_selection() {
        let taxonomy = sample_taxonomy();
        let start: TagSelection = ["Trade Routes", "Empires"].into_iter().collect();
        let on = apply_cascade(&start, "Conflict", &taxonomy);
        assert_ne!(on, start);
        let off = apply_cascade(&on, "Conflict", &taxonomy);
        assert_eq!(off, start);
    }

    #[test]
    fn clicking_a_child_leaves_the_parent_flag_alone() {
        let taxonomy = sample_taxonomy();
        let all = apply_cascade(&TagSelection::new(), "Political", &taxonomy);
        let next = apply_cascade(&all, "Conflict", &taxonomy);
        assert!(next.contains("Political"));
        assert!(!next.contains("Conflict"));
        assert!(!next.contains("War"));
        assert!(next.contains("Empires"));
        assert!(!taxonomy.is_group_fully_selected("Political", next.as_slice()));
    }

    #[test]
    fn cascade_does_not_touch_its_input() {
        let taxonomy = sample_taxonomy();
        let start: TagSelection = ["Economic"].into_iter().collect();
        let _ = apply_cascade(&start, "Political", &taxonomy);
        assert_eq!(start.as_slice(), ["Economic"]);
    }

    #[test]
    fn empty_selection_passes_everything() {
        let taxonomy = sample_taxonomy();
        let events = vec![event("a", &[]), event("b", &["War"])];
        assert_eq!(filter_events(&events, &TagSelection::new(), &taxonomy).len(), 2);
    }

    #[test]
    fn parent_selection_matches_child_tagged_events() {
        let taxonomy = sample_taxonomy();
        let events = vec![
            event("war", &["War"]),
            event("trade", &["Trade Routes"]),
            event("untagged", &[]),
        ];
        let selected: TagSelection = ["Political"].into_iter().collect();
        let ids: Vec<_> = filter_events(&events, &selected, &taxonomy)
            .into_iter()
            .map(|event| event.id.as_str())
            .collect();
        assert_eq!(ids, vec!["war"]);
    }

    #[test]
    fn child_selection_does_not_match_parent_tagged_events() {
        let taxonomy = sample_taxonomy();
        let events = vec![event("conflict", &["Conflict"]), event("war", &["War"])];
        let selected: TagSelection = ["War"].into_iter().collect();
        let ids: Vec<_> = filter_events(&events, &selected, &taxonomy)
            .into_iter()
            .map(|event| event.id.as_str())
            .collect();
        assert_eq!(ids, vec!["war"]);
    }

    #[test]
    fn unknown_selected_tag_matches_only_itself() {
        let taxonomy = sample_taxonomy();
        let selected: TagSelection = ["Piracy"].into_iter().collect();
        let expanded = expanded_selection(&selected, &taxonomy);
        assert_eq!(expanded, HashSet::from(["Piracy"]));
    }

    #[test]
    fn selection_ignores_repeated_tags() {
        let selected: TagSelection = ["War", "War", "Empires"].into_iter().collect();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected.iter().collect::<Vec<_>>(), vec!["War", "Empires"]);
    }
}
