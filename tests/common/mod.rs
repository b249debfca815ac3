#![allow(dead_code)]

pub mod mock_bridge;
pub mod mock_capabilities;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use pagetalks::recents::RecentFiles;

/// Recent files list with `names` opened one minute apart, the last one most recently
pub fn recents_with(names: &[&str]) -> RecentFiles {
    let mut recents = RecentFiles::in_memory(pagetalks::recents::DEFAULT_CAPACITY);
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    for (i, name) in names.iter().enumerate() {
        let path = format!("/docs/{}", name);
        recents.record_open_at(name, &path, base + ChronoDuration::minutes(i as i64));
    }
    recents
}
