//! Player progress carried between runs
//!
//! Tracks coins, the best distance and placed garden items. Every change is
//! written through a [`ProgressStore`]; where it ends up is up to the store.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::runner::RunSummary;

/// A decoration placed in the garden
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub item_id: String,
    pub x: f32,
    pub z: f32,
}

/// Everything that survives between sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub coins: u64,
    pub high_score: u64,
    pub garden_items: Vec<PlacedItem>,
}

/// Persistence collaborator for player progress
pub trait ProgressStore {
    fn load(&mut self) -> Result<Option<Progress>>;
    fn save(&mut self, progress: &Progress) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Keeps progress in memory; also counts saves for inspection
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub saved: Option<Progress>,
    pub save_count: usize,
}

impl ProgressStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Progress>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        self.saved = Some(progress.clone());
        self.save_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.saved = None;
        Ok(())
    }
}

/// Player progress bound to a store
pub struct Wallet {
    progress: Progress,
    store: Box<dyn ProgressStore + Send + Sync>,
}

impl Wallet {
    /// Load progress from `store`, starting fresh if it holds nothing
    pub fn open(mut store: Box<dyn ProgressStore + Send + Sync>) -> Result<Self> {
        let progress = store
            .load()
            .context("Failed to load saved progress")?
            .unwrap_or_default();
        Ok(Self { progress, store })
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn coins(&self) -> u64 {
        self.progress.coins
    }

    pub fn high_score(&self) -> u64 {
        self.progress.high_score
    }

    /// Check if the player can afford a purchase
    pub fn can_afford(&self, cost: u64) -> bool {
        self.progress.coins >= cost
    }

    /// Deduct coins for a purchase.
    /// Returns true if successful, false if insufficient funds
    pub fn spend(&mut self, cost: u64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.progress.coins -= cost;
        self.persist();
        true
    }

    pub fn earn(&mut self, amount: u64) {
        self.progress.coins += amount;
        self.persist();
    }

    /// Bank the coins from a finished run and keep the best distance
    pub fn record_run(&mut self, summary: &RunSummary) {
        self.progress.coins += summary.coins;
        if summary.distance > self.progress.high_score {
            debug!("New high score: {}", summary.distance);
            self.progress.high_score = summary.distance;
        }
        self.persist();
    }

    pub(crate) fn push_item(&mut self, item: PlacedItem) -> usize {
        self.progress.garden_items.push(item);
        self.persist();
        self.progress.garden_items.len() - 1
    }

    pub(crate) fn take_item(&mut self, index: usize) -> Option<PlacedItem> {
        if index >= self.progress.garden_items.len() {
            return None;
        }
        let item = self.progress.garden_items.remove(index);
        self.persist();
        Some(item)
    }

    /// Forget all progress, including what the store holds
    pub fn reset(&mut self) -> Result<()> {
        self.progress = Progress::default();
        self.store.clear().context("Failed to clear saved progress")
    }

    // A failed save must not interrupt play; the next mutation retries it
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.progress) {
            warn!("Failed to save progress: {:#}", err);
        }
    }
}
