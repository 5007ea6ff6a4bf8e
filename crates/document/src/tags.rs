use std::collections::BTreeMap;
use std::ops::Bound;

use crate::span::TextSpan;
use crate::style::StyleAttrs;

/// Tag identifier; larger ids have higher priority.
/// （標籤識別碼；數值越大優先權越高。）
///
/// Ids are handed out in registration order, so a tag registered later wins
/// over an earlier one when both set the same attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a tag is used for.
/// （標籤用途。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Regular syntax or user styling.
    /// （一般語法或使用者樣式。）
    Style,
    /// Bracket-match highlight; on-screen only.
    /// （括號配對高亮，僅供畫面顯示。）
    BracketMatch,
}

/// A registered style tag.
/// （已註冊的樣式標籤。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTag {
    pub name: String,
    pub kind: TagKind,
    pub attrs: StyleAttrs,
}

/// Tag intervals stored as a sorted boundary list.
/// （以排序邊界清單儲存的標籤區間表。）
///
/// Each key of `segments` is a boundary offset; its value lists the tags
/// active from that offset up to the next key, sorted by [`TagId`].
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    tags: Vec<StyleTag>,
    segments: BTreeMap<usize, Vec<TagId>>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new tag with the next (highest) priority.
    /// （註冊新標籤。）
    pub fn register(&mut self, name: impl Into<String>, kind: TagKind, attrs: StyleAttrs) -> TagId {
        let id = TagId(self.tags.len() as u32);
        self.tags.push(StyleTag {
            name: name.into(),
            kind,
            attrs,
        });
        id
    }

    pub fn tag(&self, id: TagId) -> Option<&StyleTag> {
        self.tags.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<TagId> {
        self.tags
            .iter()
            .position(|tag| tag.name == name)
            .map(|idx| TagId(idx as u32))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Applies `id` over `span`.
    /// （將標籤套用到區間。）
    pub fn apply(&mut self, id: TagId, span: TextSpan) {
        if span.is_empty() || self.tag(id).is_none() {
            return;
        }
        self.split_at(span.start);
        self.split_at(span.end);
        for (_, active) in self.segments.range_mut(span.start..span.end) {
            if let Err(pos) = active.binary_search(&id) {
                active.insert(pos, id);
            }
        }
        self.coalesce(span);
    }

    /// Removes `id` from `span`.
    /// （自區間移除標籤。）
    pub fn remove(&mut self, id: TagId, span: TextSpan) {
        if span.is_empty() {
            return;
        }
        self.split_at(span.start);
        self.split_at(span.end);
        for (_, active) in self.segments.range_mut(span.start..span.end) {
            if let Ok(pos) = active.binary_search(&id) {
                active.remove(pos);
            }
        }
        self.coalesce(span);
    }

    /// Tags covering `offset`, in priority order.
    /// （位移 `offset` 上生效的標籤（依優先權排序）。）
    pub fn tags_at(&self, offset: usize) -> &[TagId] {
        self.segments
            .range(..=offset)
            .next_back()
            .map(|(_, active)| active.as_slice())
            .unwrap_or(&[])
    }

    /// The next tag boundary strictly after `offset`.
    /// （`offset` 之後的下一個標籤邊界。）
    pub fn next_boundary(&self, offset: usize) -> Option<usize> {
        self.segments
            .range((Bound::Excluded(offset), Bound::Unbounded))
            .next()
            .map(|(boundary, _)| *boundary)
    }

    fn split_at(&mut self, offset: usize) {
        if self.segments.contains_key(&offset) {
            return;
        }
        let inherited = self.tags_at(offset).to_vec();
        self.segments.insert(offset, inherited);
    }

    fn coalesce(&mut self, span: TextSpan) {
        let keys: Vec<usize> = self
            .segments
            .range(span.start..=span.end)
            .map(|(key, _)| *key)
            .collect();
        for key in keys {
            let previous = self
                .segments
                .range(..key)
                .next_back()
                .map(|(_, active)| active.clone());
            let redundant = match (&previous, self.segments.get(&key)) {
                (Some(prev), Some(current)) => prev == current,
                (None, Some(current)) => current.is_empty(),
                _ => false,
            };
            if redundant {
                self.segments.remove(&key);
            }
        }
    }
}
