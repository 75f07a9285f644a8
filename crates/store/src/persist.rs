//! Snapshot persistence: the whole campaign set is replaced on every
//! sync, so backends stay trivial.

use budget_core::error::BudgetResult;
use budget_core::types::Campaign;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Receives the full campaign set on each sync.
pub trait PersistenceBackend: Send + Sync {
    fn replace_all(&self, campaigns: &[Campaign]) -> BudgetResult<()>;
}

/// Writes the campaign set to one JSON file.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn replace_all(&self, campaigns: &[Campaign]) -> BudgetResult<()> {
        let payload = serde_json::to_string_pretty(campaigns)?;
        std::fs::write(&self.path, payload)?;
        debug!(path = %self.path.display(), count = campaigns.len(), "Campaign snapshot written");
        Ok(())
    }
}

/// Keeps the last snapshot in memory. Stands in when no file path is
/// configured, and lets tests observe what would have been written.
#[derive(Default)]
pub struct MemoryBackend {
    snapshot: Mutex<Vec<Campaign>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_snapshot(&self) -> Vec<Campaign> {
        self.snapshot.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl PersistenceBackend for MemoryBackend {
    fn replace_all(&self, campaigns: &[Campaign]) -> BudgetResult<()> {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = campaigns.to_vec();
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::types::{Campaign, MarketingObjective, MediaChannel};
    use chrono::NaiveDate;

    fn make_campaign(name: &str) -> Campaign {
        Campaign::new(
            MediaChannel::Meta,
            name.to_string(),
            MarketingObjective::Conversion,
            "Tous".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            10_000.0,
            30,
        )
    }

    #[test]
    fn test_json_file_backend_writes_the_full_set() {
        let path = std::env::temp_dir().join("budget-pilot-persist-test.json");
        let backend = JsonFileBackend::new(&path);
        let campaigns = vec![make_campaign("Une"), make_campaign("Deux")];
        backend.replace_all(&campaigns).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Campaign> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].campaign_name, "Une");
        assert_eq!(parsed[0].weekly_budgets.len(), 52);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_memory_backend_replaces_and_counts() {
        let backend = MemoryBackend::new();
        backend.replace_all(&[make_campaign("Première")]).unwrap();
        backend
            .replace_all(&[make_campaign("A"), make_campaign("B")])
            .unwrap();

        assert_eq!(backend.write_count(), 2);
        let snapshot = backend.last_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].campaign_name, "A");
    }
}
