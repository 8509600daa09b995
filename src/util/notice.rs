use std::collections::VecDeque;

use serde::Serialize;

use super::generate_id;

pub const DEFAULT_NOTICE_CAPACITY: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub id: String,
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            id: generate_id("notice"),
            kind,
            text: text.into(),
        }
    }
}

/// Bounded queue of user-facing messages; the oldest entry is evicted first.
#[derive(Clone, Debug)]
pub struct NoticeQueue {
    entries: VecDeque<Notice>,
    capacity: usize,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTICE_CAPACITY)
    }
}

impl NoticeQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> &Notice {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Notice::new(kind, message));
        &self.entries[self.entries.len() - 1]
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|notice| notice.id != id);
        self.entries.len() != before
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.entries.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut queue = NoticeQueue::with_capacity(3);
        for n in 0..10 {
            queue.push(NoticeKind::Info, format!("notice {n}"));
            assert!(queue.len() <= 3);
        }
        let texts: Vec<_> = queue.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["notice 7", "notice 8", "notice 9"]);
    }

    #[test]
    fn dismiss_by_id() {
        let mut queue = NoticeQueue::default();
        let id = queue.push(NoticeKind::Error, "boom").id.clone();
        queue.push(NoticeKind::Success, "ok");
        assert!(queue.dismiss(&id));
        assert!(!queue.dismiss(&id));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut queue = NoticeQueue::with_capacity(usize::MAX);
        queue.push(NoticeKind::Info, "a");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut queue = NoticeQueue::with_capacity(0);
        queue.push(NoticeKind::Info, "a");
        queue.push(NoticeKind::Info, "b");
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }
}
