//! Global tag vocabulary offered by the tag filter

use crate::models::{Tag, TagId};

/// Changes applied by [`TagVocabulary::reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyDiff {
    pub added: Vec<Tag>,
    pub removed: Vec<Tag>,
    /// Entries whose id was kept but whose name changed
    pub renamed: Vec<Tag>,
}

impl VocabularyDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.renamed.is_empty()
    }
}

/// Ordered set of known tags, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    tags: Vec<Tag>,
}

impl TagVocabulary {
    #[must_use]
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    #[must_use]
    pub fn from_tags(tags: Vec<Tag>) -> Self {
        let mut vocabulary = Self::new();
        for tag in tags {
            vocabulary.insert(tag);
        }
        vocabulary
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Append `tag` unless its id is already known; returns whether it was added
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.get(tag.id).is_some() {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Bring the vocabulary in line with the server's list
    ///
    /// Entries that disappeared are removed and new ones appended in server
    /// order. Surviving entries keep their position.
    pub fn reconcile(&mut self, server: Vec<Tag>) -> VocabularyDiff {
        let mut diff = VocabularyDiff::default();

        let mut kept = Vec::with_capacity(self.tags.len());
        for tag in self.tags.drain(..) {
            match server.iter().find(|t| t.id == tag.id) {
                Some(current) if current.name != tag.name => {
                    diff.renamed.push(current.clone());
                    kept.push(current.clone());
                }
                Some(_) => kept.push(tag),
                None => diff.removed.push(tag),
            }
        }
        self.tags = kept;

        for tag in server {
            if self.get(tag.id).is_none() {
                diff.added.push(tag.clone());
                self.tags.push(tag);
            }
        }

        diff
    }
}
