use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    services::{
        carousel::{Carousel, RailView},
        compose_home, find_section, HomeRails, MetadataGateway, SettingsStore,
    },
};

/// A composed home screen plus one carousel per rail
pub struct HomeSession {
    /// Settings version the rails were composed from
    pub version: u64,
    pub rails: HomeRails,
    carousels: Vec<Arc<Mutex<Carousel>>>,
    /// Last viewport width a client reported for this screen
    viewport_width: AtomicU32,
}

impl HomeSession {
    /// Every rail gets a fresh, empty carousel
    fn new(version: u64, rails: HomeRails, viewport_width: u32) -> Self {
        let carousels = rails
            .categories
            .iter()
            .map(|category| Arc::new(Mutex::new(Carousel::new(category, viewport_width))))
            .collect();

        Self {
            version,
            rails,
            carousels,
            viewport_width: AtomicU32::new(viewport_width),
        }
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width.load(Ordering::Relaxed)
    }

    fn remember_width(&self, viewport_width: u32) {
        self.viewport_width.store(viewport_width, Ordering::Relaxed);
    }

    /// Applies a new viewport width to every rail
    pub async fn resize(&self, viewport_width: u32) {
        self.remember_width(viewport_width);
        for carousel in &self.carousels {
            carousel.lock().await.resize(viewport_width);
        }
    }

    pub fn carousel(&self, index: usize) -> AppResult<Arc<Mutex<Carousel>>> {
        self.carousels
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Rail {} not found", index)))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn MetadataGateway>,
    pub settings: Arc<SettingsStore>,
    sessions: Arc<RwLock<HashMap<u32, Arc<HomeSession>>>>,
    pub on_deck_refresh_delay: Duration,
    pub default_viewport_width: u32,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn MetadataGateway>,
        settings: Arc<SettingsStore>,
        on_deck_refresh_delay: Duration,
        default_viewport_width: u32,
    ) -> Self {
        Self {
            gateway,
            settings,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            on_deck_refresh_delay,
            default_viewport_width,
        }
    }

    fn fresh_rng() -> StdRng {
        StdRng::from_rng(&mut rand::rng())
    }

    /// The section's current composition, recomposing if settings moved on
    pub async fn home(&self, section_id: u32) -> AppResult<Arc<HomeSession>> {
        let version = self.settings.version();

        if let Some(session) = self.sessions.read().await.get(&section_id) {
            if session.version >= version {
                return Ok(Arc::clone(session));
            }
        }

        self.recompose(section_id).await
    }

    /// Runs a fresh composition and stores it unless a newer one landed first
    pub async fn recompose(&self, section_id: u32) -> AppResult<Arc<HomeSession>> {
        let snapshot = self.settings.snapshot();
        let section = find_section(self.gateway.as_ref(), section_id).await?;

        let rails = compose_home(
            self.gateway.as_ref(),
            &section,
            &snapshot.recommendations,
            Self::fresh_rng(),
        )
        .await;

        let mut sessions = self.sessions.write().await;

        let viewport_width = match sessions.get(&section_id) {
            Some(existing) if existing.version > snapshot.version => {
                tracing::debug!(
                    section_id,
                    stale = snapshot.version,
                    current = existing.version,
                    "Discarding stale composition"
                );
                return Ok(Arc::clone(existing));
            }
            Some(existing) => existing.viewport_width(),
            None => self.default_viewport_width,
        };

        let session = Arc::new(HomeSession::new(snapshot.version, rails, viewport_width));
        sessions.insert(section_id, Arc::clone(&session));

        Ok(session)
    }

    async fn carousel(&self, section_id: u32, index: usize) -> AppResult<Arc<Mutex<Carousel>>> {
        self.home(section_id).await?.carousel(index)
    }

    /// Fetches the rail's items and settles the result
    async fn load(&self, carousel: &Mutex<Carousel>) -> RailView {
        let ticket = carousel.lock().await.begin_load();
        let outcome = ticket.fetch(self.gateway.as_ref()).await;

        let mut carousel = carousel.lock().await;
        carousel.settle(ticket, outcome, &mut rand::rng());
        carousel.view()
    }

    /// The rail's view, loading it on first access
    pub async fn rail_view(
        &self,
        section_id: u32,
        index: usize,
        viewport_width: Option<u32>,
    ) -> AppResult<RailView> {
        let session = self.home(section_id).await?;
        let carousel = session.carousel(index)?;
        if let Some(width) = viewport_width {
            session.remember_width(width);
        }

        let needs_load = {
            let mut guard = carousel.lock().await;
            if let Some(width) = viewport_width {
                guard.resize(width);
            }
            !guard.is_loaded()
        };

        if needs_load {
            return Ok(self.load(&carousel).await);
        }

        let view = carousel.lock().await.view();
        Ok(view)
    }

    /// Applies a navigation step to a rail and returns the updated view
    pub async fn navigate<F>(&self, section_id: u32, index: usize, step: F) -> AppResult<RailView>
    where
        F: FnOnce(&mut Carousel),
    {
        let carousel = self.carousel(section_id, index).await?;
        let mut guard = carousel.lock().await;
        step(&mut guard);
        Ok(guard.view())
    }

    /// Re-runs the rail's fetch from scratch
    pub async fn refresh_rail(&self, section_id: u32, index: usize) -> AppResult<RailView> {
        let carousel = self.carousel(section_id, index).await?;
        Ok(self.load(&carousel).await)
    }

    /// Removes an item from continue watching, then refetches the rail after a
    /// short settle delay. Only on-deck rails accept this.
    pub async fn remove_on_deck_item(
        &self,
        section_id: u32,
        index: usize,
        rating_key: &str,
    ) -> AppResult<RailView> {
        let carousel = self.carousel(section_id, index).await?;

        if !carousel.lock().await.is_on_deck() {
            return Err(AppError::InvalidInput(format!(
                "Rail {} does not support item removal",
                index
            )));
        }

        self.gateway.remove_from_continue_watching(rating_key).await?;
        tracing::info!(section_id, rail = index, rating_key, "Removed from continue watching");

        tokio::time::sleep(self.on_deck_refresh_delay).await;
        Ok(self.load(&carousel).await)
    }

    /// Recomposes every open section whenever recommendation settings change
    pub fn spawn_settings_listener(&self) -> JoinHandle<()> {
        let state = self.clone();
        let mut rx = self.settings.subscribe();

        tokio::spawn(async move {
            let mut seen = rx.borrow_and_update().version;

            while rx.changed().await.is_ok() {
                let version = rx.borrow_and_update().version;
                if version == seen {
                    continue;
                }
                seen = version;

                let section_ids: Vec<u32> = state.sessions.read().await.keys().copied().collect();
                tracing::info!(version, sections = section_ids.len(), "Settings changed, recomposing");

                for section_id in section_ids {
                    if let Err(e) = state.recompose(section_id).await {
                        tracing::warn!(section_id, error = %e, "Recomposition failed");
                    }
                }
            }

            tracing::debug!("Settings listener stopped");
        })
    }
}
