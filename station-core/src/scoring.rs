use station_types::{Member, Millis};

pub struct CodeSchedule;

impl CodeSchedule {
    /// Index of the code that should be visible `elapsed` ms into the session
    pub fn expected_index(elapsed: Millis, code_interval: Millis) -> u32 {
        if code_interval == 0 {
            return 0;
        }
        u32::try_from(elapsed / code_interval).unwrap_or(u32::MAX)
    }

    /// Decide which code index, if any, an accepted scan reveals.
    ///
    /// A member's first accepted scan reveals index 0. After that codes are
    /// handed out one step at a time and never past the expected index, so a
    /// member who falls behind has to keep scanning to catch up.
    pub fn next_code(elapsed: Millis, code_interval: Millis, member: &Member) -> Option<u32> {
        let expected = Self::expected_index(elapsed, code_interval);

        if member.has_code(expected) {
            return None;
        }

        match member.last_code_index() {
            None => Some(0),
            Some(last) if last < expected => Some(last + 1),
            Some(_) => None,
        }
    }
}
