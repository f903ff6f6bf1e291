//! Cây phân loại thẻ (danh mục → nhóm con → thẻ lá).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Nút thẻ ở dạng lồng nhau, đúng định dạng dữ liệu nguồn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TagNode>,
}

impl TagNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TagNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatNode {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Rừng thẻ lưu dưới dạng mảng phẳng, con trỏ tới con bằng chỉ số.
///
/// Nút được đánh số theo thứ tự duyệt trước, nên tìm theo tên luôn trả về
/// lần xuất hiện đầu tiên khi một tên lặp lại ở nhiều nhánh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTaxonomy {
    nodes: Vec<FlatNode>,
    roots: Vec<usize>,
}

impl TagTaxonomy {
    pub fn new(forest: &[TagNode]) -> Self {
        let mut taxonomy = Self::default();
        for root in forest {
            let index = taxonomy.push(root, None);
            taxonomy.roots.push(index);
        }
        taxonomy
    }

    fn push(&mut self, node: &TagNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(FlatNode {
            name: node.name.clone(),
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        for child in &node.children {
            let child_index = self.push(child, Some(index));
            self.nodes[index].children.push(child_index);
        }
        index
    }

    /// Dựng lại dạng lồng nhau (dùng khi serialize sang JS).
    pub fn to_forest(&self) -> Vec<TagNode> {
        self.roots.iter().map(|&root| self.to_node(root)).collect()
    }

    fn to_node(&self, index: usize) -> TagNode {
        let node = &self.nodes[index];
        TagNode {
            name: node.name.clone(),
            children: node.children.iter().map(|&child| self.to_node(child)).collect(),
        }
    }

    fn find(&self, tag: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.find(tag).is_some()
    }

    /// Tên các nút gốc theo thứ tự khai báo.
    pub fn top_level_tags(&self) -> Vec<&str> {
        self.roots
            .iter()
            .map(|&root| self.nodes[root].name.as_str())
            .collect()
    }

    /// Con trực tiếp của `tag`; thẻ không tồn tại được coi là lá.
    pub fn children_of(&self, tag: &str) -> Vec<&str> {
        self.find(tag)
            .map(|index| {
                self.nodes[index]
                    .children
                    .iter()
                    .map(|&child| self.nodes[child].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mọi thẻ nằm dưới `tag` (không gồm chính nó), theo thứ tự duyệt trước.
    pub fn descendants(&self, tag: &str) -> Vec<&str> {
        let Some(index) = self.find(tag) else {
            return Vec::new();
        };
        let mut seen = HashSet::from([self.nodes[index].name.as_str()]);
        let mut out = Vec::new();
        self.collect_descendants(index, &mut seen, &mut out);
        out
    }

    fn collect_descendants<'a>(
        &'a self,
        index: usize,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<&'a str>,
    ) {
        for &child in &self.nodes[index].children {
            let name = self.nodes[child].name.as_str();
            if seen.insert(name) {
                out.push(name);
            }
            self.collect_descendants(child, seen, out);
        }
    }

    /// Thẻ cha gần nhất; `None` với nút gốc hoặc thẻ không tồn tại.
    pub fn parent_of(&self, tag: &str) -> Option<&str> {
        let index = self.find(tag)?;
        self.nodes[index]
            .parent
            .map(|parent| self.nodes[parent].name.as_str())
    }

    /// Đúng khi chính `tag` và toàn bộ hậu duệ của nó đều đang được chọn.
    pub fn is_group_fully_selected<S: AsRef<str>>(&self, tag: &str, selected: &[S]) -> bool {
        let is_selected = |name: &str| selected.iter().any(|item| item.as_ref() == name);
        is_selected(tag) && self.descendants(tag).into_iter().all(is_selected)
    }

    /// Tất cả tên thẻ theo thứ tự duyệt trước, không lặp.
    pub fn all_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|node| node.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Các tên xuất hiện nhiều hơn một lần trong rừng.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for node in &self.nodes {
            let name = node.name.as_str();
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }

    /// Tập thẻ cần hiển thị cho ô tìm kiếm: thẻ khớp chuỗi cùng toàn bộ tổ tiên.
    ///
    /// Chuỗi rỗng trả về toàn bộ cây.
    pub fn search(&self, query: &str) -> HashSet<&str> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.nodes.iter().map(|node| node.name.as_str()).collect();
        }

        let mut visible = HashSet::new();
        for node in &self.nodes {
            if !node.name.to_lowercase().contains(&needle) {
                continue;
            }
            visible.insert(node.name.as_str());
            let mut parent = node.parent;
            while let Some(index) = parent {
                visible.insert(self.nodes[index].name.as_str());
                parent = self.nodes[index].parent;
            }
        }
        visible
    }
}
