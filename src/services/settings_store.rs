use tokio::sync::watch;

use crate::{
    error::AppResult,
    models::{ContentDisplaySettings, RecommendationSettings},
};

/// Current value of both settings domains
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSnapshot {
    /// Bumped on every recommendations write; compositions are keyed by it
    pub version: u64,
    pub recommendations: RecommendationSettings,
    pub content_display: ContentDisplaySettings,
}

/// In-memory settings with change notification.
///
/// Writers replace a whole domain at once. Subscribers see the latest
/// snapshot, never intermediate ones.
#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<SettingsSnapshot>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(SettingsSnapshot::default())
    }
}

impl SettingsStore {
    pub fn new(initial: SettingsSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.tx.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    pub fn recommendations(&self) -> RecommendationSettings {
        self.tx.borrow().recommendations.clone()
    }

    pub fn content_display(&self) -> ContentDisplaySettings {
        self.tx.borrow().content_display.clone()
    }

    /// Validates and stores new recommendation settings, returning the new version
    pub fn write_recommendations(&self, settings: RecommendationSettings) -> AppResult<u64> {
        settings.validate()?;

        let mut version = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.recommendations = settings;
            version = snapshot.version;
        });

        tracing::info!(version, "Recommendation settings updated");
        Ok(version)
    }

    /// Display settings never affect composition, so the version stays put
    pub fn write_content_display(&self, settings: ContentDisplaySettings) {
        self.tx.send_modify(|snapshot| snapshot.content_display = settings);
        tracing::info!("Content display settings updated");
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.tx.subscribe()
    }
}
