use station_types::BoxId;

/// Online flags for stations `1..=len`, fed only by health reports
#[derive(Debug, Clone)]
pub struct BoxStatus {
    online: Vec<bool>,
}

impl BoxStatus {
    pub fn new(box_count: usize) -> Self {
        Self {
            online: vec![false; box_count],
        }
    }

    /// Returns `Some(changed)` or `None` if the id is outside the grid
    pub fn set_online(&mut self, box_id: BoxId, online: bool) -> Option<bool> {
        let slot = self.slot_mut(box_id)?;
        let changed = *slot != online;
        *slot = online;
        Some(changed)
    }

    pub fn is_online(&self, box_id: BoxId) -> bool {
        let Some(index) = (box_id as usize).checked_sub(1) else {
            return false;
        };
        self.online.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    pub fn online_count(&self) -> usize {
        self.online.iter().filter(|o| **o).count()
    }

    pub fn to_vec(&self) -> Vec<bool> {
        self.online.clone()
    }

    fn slot_mut(&mut self, box_id: BoxId) -> Option<&mut bool> {
        let index = (box_id as usize).checked_sub(1)?;
        self.online.get_mut(index)
    }
}
