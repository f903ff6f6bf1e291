//! Định danh khu vực trên đường dẫn và trang chi tiết theo khu vực.

use serde::{Deserialize, Serialize};

use crate::{Region, TimelineEvent};

/// `"Africa & Middle East"` → `"africa-middle east"`.
pub fn region_slug(region: Region) -> String {
    region.display_name().to_lowercase().replace(" & ", "-")
}

impl Region {
    /// Tìm khu vực có slug trùng `segment`, không phân biệt hoa thường.
    pub fn from_slug(segment: &str) -> Option<Region> {
        Region::ALL
            .into_iter()
            .find(|region| region_slug(*region).eq_ignore_ascii_case(segment.trim()))
    }
}

/// Tiêu đề hiển thị từ một đoạn đường dẫn.
///
/// Slug của khu vực đã biết trả về đúng tên khu vực; các đoạn khác được đổi
/// gạch nối thành khoảng trắng và viết hoa chữ đầu mỗi từ.
pub fn region_title(segment: &str) -> String {
    if let Some(region) = Region::from_slug(segment) {
        return region.display_name().to_string();
    }
    title_case(&segment.replace('-', " "))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_boundary = true;
    for ch in text.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && at_boundary {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_boundary = !is_word;
    }
    out
}

/// Sự kiện thuộc khu vực ứng với `segment`; đoạn không khớp khu vực nào trả về rỗng.
pub fn events_for_region<'e>(events: &'e [TimelineEvent], segment: &str) -> Vec<&'e TimelineEvent> {
    let title = region_title(segment);
    events
        .iter()
        .filter(|event| event.region.display_name().eq_ignore_ascii_case(&title))
        .collect()
}

/// Hai khung nhìn logic của ứng dụng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "view", content = "segment", rename_all = "snake_case")]
pub enum Route {
    Root,
    Region(String),
}

impl Route {
    /// Đọc đường dẫn (có thể kèm `#` của hash routing).
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_start_matches('#');
        match path.strip_prefix("/region/") {
            Some(rest) => {
                let segment = rest.trim_end_matches('/').replace("%20", " ");
                if segment.is_empty() {
                    Route::Root
                } else {
                    Route::Region(segment)
                }
            }
            None => Route::Root,
        }
    }

    pub fn for_region(region: Region) -> Self {
        Route::Region(region_slug(region))
    }

    pub fn href(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Region(segment) => format!("/region/{segment}"),
        }
    }

    /// Khu vực đang mở, nếu có.
    pub fn region(&self) -> Option<Region> {
        match self {
            Route::Root => None,
            Route::Region(segment) => Region::from_slug(segment)
                .or_else(|| Region::from_name(&region_title(segment))),
        }
    }
}
