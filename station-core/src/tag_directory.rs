use station_types::{Tag, TagId};

/// Every tag seen at the enrollment reader, in display order.
/// Tags are never removed.
#[derive(Debug, Default, Clone)]
pub struct TagDirectory {
    tags: Vec<Tag>,
}

impl TagDirectory {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Register a freshly presented tag and make it the selected one.
    /// The caller is responsible for detaching the tag from its previous owner.
    pub fn observe(&mut self, tag_id: &str) {
        self.clear_selection();

        match self.tags.iter_mut().find(|t| t.id == tag_id) {
            Some(tag) => {
                tag.is_selected = true;
                tag.is_assigned = false;
            }
            None => {
                let mut tag = Tag::new(tag_id.to_string());
                tag.is_selected = true;
                self.tags.push(tag);
            }
        }

        // Vec::sort_by_key is stable, unassigned tags keep their relative order
        self.tags.sort_by_key(|t| t.is_assigned);
    }

    /// Returns false if the tag is unknown
    pub fn select(&mut self, tag_id: &str) -> bool {
        if !self.contains(tag_id) {
            return false;
        }
        for tag in &mut self.tags {
            tag.is_selected = tag.id == tag_id;
        }
        true
    }

    pub fn currently_selected(&self) -> Option<&TagId> {
        self.tags.iter().find(|t| t.is_selected).map(|t| &t.id)
    }

    /// Flag the tag as owned by a member and move the selection to the next
    /// unassigned tag. Returns the newly selected tag, if any.
    pub fn mark_assigned(&mut self, tag_id: &str) -> Option<TagId> {
        match self.tags.iter_mut().find(|t| t.id == tag_id) {
            Some(tag) => {
                tag.is_assigned = true;
                tag.is_selected = false;
            }
            None => {
                let mut tag = Tag::new(tag_id.to_string());
                tag.is_assigned = true;
                self.tags.push(tag);
            }
        }

        let next = self
            .tags
            .iter()
            .find(|t| !t.is_selected && !t.is_assigned)
            .map(|t| t.id.clone())?;
        self.select(&next);
        Some(next)
    }

    /// Tag lost its owner without being re-enrolled
    pub fn mark_unassigned(&mut self, tag_id: &str) {
        if let Some(tag) = self.tags.iter_mut().find(|t| t.id == tag_id) {
            tag.is_assigned = false;
        }
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    pub fn get(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == tag_id)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn clear_selection(&mut self) {
        for tag in &mut self.tags {
            tag.is_selected = false;
        }
    }
}
