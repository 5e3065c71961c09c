use station_types::{BlockState, Millis, Timestamp};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use tracing::{debug, info};

/// Activation was attempted with nothing staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotConfigured;

/// Block lifecycle for one kind of entity (boxes, members).
///
/// Staging (`set_pending`) and activation are separate steps: the operator
/// configures a duration or permanence first, then switches the block on.
#[derive(Debug, Clone)]
pub struct BlockTable<K> {
    entries: HashMap<K, BlockState>,
}

impl<K> Default for BlockTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K> BlockTable<K>
where
    K: Eq + Hash + Clone + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a block configuration.
    ///
    /// `permanent` wins over a duration. With neither, the staged
    /// configuration is cancelled and any running block is lifted.
    pub fn set_pending(
        &mut self,
        id: K,
        duration_seconds: Option<u64>,
        permanent: bool,
        now: Timestamp,
    ) {
        let state = self.entries.entry(id.clone()).or_default();

        if permanent {
            state.permanent = true;
            state.block_duration = None;
            state.block_start = None;
            state.remaining_time = None;
        } else if let Some(seconds) = duration_seconds.filter(|s| *s > 0) {
            let was_permanent = state.permanent;
            state.permanent = false;
            state.block_duration = Some(seconds.saturating_mul(1000));
            if state.is_blocked && was_permanent {
                // A permanent block switched to timed starts counting now
                state.block_start = Some(now);
                state.remaining_time = state.block_duration;
            }
        } else {
            if state.is_blocked {
                info!("Block on {} lifted by cancelled configuration", id);
            }
            *state = BlockState::default();
        }
    }

    pub fn activate(&mut self, id: &K, now: Timestamp) -> Result<(), NotConfigured> {
        let state = self.entries.get_mut(id).ok_or(NotConfigured)?;

        if state.permanent {
            state.is_blocked = true;
            state.remaining_time = None;
            info!("Permanent block on {}", id);
            Ok(())
        } else if let Some(duration) = state.block_duration {
            state.is_blocked = true;
            state.block_start = Some(now);
            state.remaining_time = Some(duration);
            info!("Block on {} until {}", id, now.saturating_add(duration));
            Ok(())
        } else {
            Err(NotConfigured)
        }
    }

    /// Manual unblock, also lifts permanent blocks. Returns whether a block was active.
    pub fn deactivate(&mut self, id: &K) -> bool {
        match self.entries.get_mut(id) {
            Some(state) => {
                let was_blocked = state.is_blocked;
                *state = BlockState::default();
                was_blocked
            }
            None => false,
        }
    }

    /// Recompute remaining time of timed blocks and clear the expired ones.
    /// Returns the ids whose block expired during this sweep.
    pub fn tick(&mut self, now: Timestamp) -> Vec<K> {
        let mut expired = Vec::new();

        for (id, state) in self.entries.iter_mut() {
            if !state.is_blocked || state.permanent {
                continue;
            }

            let (Some(start), Some(duration)) = (state.block_start, state.block_duration) else {
                continue;
            };

            let elapsed = now.saturating_sub(start);
            let remaining: Millis = duration.saturating_sub(elapsed);
            if remaining == 0 {
                *state = BlockState::default();
                expired.push(id.clone());
            } else {
                state.remaining_time = Some(remaining);
            }
        }

        if !expired.is_empty() {
            debug!("Tick cleared {} expired block(s)", expired.len());
        }
        expired
    }

    pub fn is_blocked(&self, id: &K) -> bool {
        self.entries.get(id).is_some_and(|s| s.is_blocked)
    }

    pub fn get(&self, id: &K) -> Option<&BlockState> {
        self.entries.get(id)
    }

    pub fn active(&self) -> impl Iterator<Item = (&K, &BlockState)> {
        self.entries.iter().filter(|(_, s)| s.is_blocked)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_block_lifecycle() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(7, Some(10), false, 0);
        assert!(!table.is_blocked(&7));

        table.activate(&7, 1_000).unwrap();
        assert!(table.is_blocked(&7));
        let state = table.get(&7).unwrap();
        assert_eq!(state.block_start, Some(1_000));
        assert_eq!(state.block_duration, Some(10_000));

        assert!(table.tick(6_000).is_empty());
        assert_eq!(table.get(&7).unwrap().remaining_time, Some(5_000));

        assert_eq!(table.tick(11_000), vec![7]);
        assert!(!table.is_blocked(&7));
        assert_eq!(table.get(&7), Some(&BlockState::default()));
    }

    #[test]
    fn test_permanent_block_survives_ticks() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(3, Some(5), true, 0);
        table.activate(&3, 0).unwrap();

        assert!(table.tick(u64::MAX / 2).is_empty());
        let state = table.get(&3).unwrap();
        assert!(state.is_blocked);
        assert!(state.permanent);
        assert!(state.remaining_time.is_none());
        assert!(state.block_duration.is_none());
    }

    #[test]
    fn test_activate_without_configuration() {
        let mut table: BlockTable<u32> = BlockTable::new();
        assert_eq!(table.activate(&1, 0), Err(NotConfigured));

        table.set_pending(1, Some(0), false, 0);
        assert_eq!(table.activate(&1, 0), Err(NotConfigured));
        assert!(!table.is_blocked(&1));
    }

    #[test]
    fn test_deactivate_overrides_permanence() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(2, None, true, 0);
        table.activate(&2, 0).unwrap();

        assert!(table.deactivate(&2));
        assert!(!table.is_blocked(&2));
        assert!(!table.get(&2).unwrap().permanent);
        assert!(!table.deactivate(&2));
    }

    #[test]
    fn test_cancel_pending_clears_everything() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(4, Some(30), false, 0);
        table.activate(&4, 0).unwrap();

        table.set_pending(4, None, false, 1_000);
        assert_eq!(table.get(&4), Some(&BlockState::default()));
    }

    #[test]
    fn test_permanent_switched_to_timed_restarts_clock() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(5, None, true, 0);
        table.activate(&5, 0).unwrap();

        table.set_pending(5, Some(2), false, 50_000);
        let state = table.get(&5).unwrap();
        assert!(state.is_blocked);
        assert_eq!(state.block_start, Some(50_000));

        assert_eq!(table.tick(52_000), vec![5]);
    }

    #[test]
    fn test_new_duration_keeps_running_timer() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(6, Some(10), false, 0);
        table.activate(&6, 1_000).unwrap();

        table.set_pending(6, Some(30), false, 5_000);
        let state = table.get(&6).unwrap();
        assert_eq!(state.block_start, Some(1_000));
        assert_eq!(state.block_duration, Some(30_000));

        assert!(table.tick(30_000).is_empty());
        assert_eq!(table.tick(31_000), vec![6]);
    }

    #[test]
    fn test_huge_duration_saturates() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(8, Some(u64::MAX), false, 0);
        assert_eq!(table.get(&8).unwrap().block_duration, Some(u64::MAX));

        table.activate(&8, 1_000).unwrap();
        assert!(table.tick(u64::MAX / 2).is_empty());
        assert!(table.is_blocked(&8));
    }

    #[test]
    fn test_active_lists_only_blocked() {
        let mut table: BlockTable<u32> = BlockTable::new();
        table.set_pending(1, Some(10), false, 0);
        table.set_pending(2, Some(10), false, 0);
        table.activate(&2, 0).unwrap();

        let active: Vec<_> = table.active().map(|(id, _)| *id).collect();
        assert_eq!(active, vec![2]);
    }
}
