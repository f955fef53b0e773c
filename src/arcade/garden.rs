//! Buying and placing garden decorations with run coins

use anyhow::{bail, Context, Result};
use log::info;

use super::wallet::{PlacedItem, Wallet};

/// Half the side of the square garden plot
pub const GARDEN_HALF_EXTENT: f32 = 15.0;

/// A catalog entry, as supplied by whoever owns the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub id: String,
    pub price: u64,
}

impl Decoration {
    pub fn new(id: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            price,
        }
    }
}

/// Pay for `decoration` and place it at (x, z). Returns its index.
pub fn place(wallet: &mut Wallet, decoration: &Decoration, x: f32, z: f32) -> Result<usize> {
    if !x.is_finite() || !z.is_finite() || x.abs() > GARDEN_HALF_EXTENT || z.abs() > GARDEN_HALF_EXTENT
    {
        bail!("({:.1}, {:.1}) is outside the garden", x, z);
    }
    if !wallet.spend(decoration.price) {
        bail!(
            "{} costs {} coins, only {} available",
            decoration.id,
            decoration.price,
            wallet.coins()
        );
    }

    let index = wallet.push_item(PlacedItem {
        item_id: decoration.id.clone(),
        x,
        z,
    });
    info!("Placed {} at ({:.1}, {:.1})", decoration.id, x, z);
    Ok(index)
}

/// Remove a placed item. Coins are not refunded.
pub fn remove(wallet: &mut Wallet, index: usize) -> Result<PlacedItem> {
    wallet
        .take_item(index)
        .with_context(|| format!("No garden item at index {}", index))
}
