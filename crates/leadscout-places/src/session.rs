use std::collections::HashSet;

/// Place IDs already emitted during one session.
///
/// Owned by the caller and threaded by `&mut` through every search in the
/// session, so repeated searches never emit the same business twice. An ID
/// is never removed once inserted.
#[derive(Debug, Clone, Default)]
pub struct ProcessedIdSet {
    ids: HashSet<String>,
}

impl ProcessedIdSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.ids.contains(place_id)
    }

    /// Claims `place_id` for this session. Returns `false` if it was already
    /// claimed.
    pub fn insert(&mut self, place_id: &str) -> bool {
        if self.ids.contains(place_id) {
            return false;
        }
        self.ids.insert(place_id.to_owned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
