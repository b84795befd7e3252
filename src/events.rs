//! Gameplay events.
//!
//! Cross-entity side effects are expressed as events emitted during one pass
//! and applied by consumer systems later in the same tick: the player's
//! head-hit on a question block sends `ItemDispensed`, and the item module
//! spawns the mushroom. No entity ever appends into another module's
//! collection directly, which keeps ordering explicit and testable.

use bevy::prelude::*;

pub struct GameEventsPlugin;

impl Plugin for GameEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ScoreAwarded>()
            .add_event::<CoinCollected>()
            .add_event::<ItemDispensed>()
            .add_event::<BlockBroken>()
            .add_event::<PlayerJumped>();
    }
}

/// Points were added to the score; a floating score-text particle is spawned
/// at the given position.
#[derive(Event, Clone, Copy, Debug)]
pub struct ScoreAwarded {
    pub amount: u32,
    pub x: i32,
    pub y: i32,
}

/// A coin was collected from a block; spawns the coin pop particle above the
/// block and drives the coin sound effect.
#[derive(Event, Clone, Copy, Debug)]
pub struct CoinCollected {
    pub x: i32,
    pub y: i32,
}

/// A question block dispensed its item. Position is the block's top-left;
/// the consumer spawns the mushroom one item-height above it.
#[derive(Event, Clone, Copy, Debug)]
pub struct ItemDispensed {
    pub x: i32,
    pub y: i32,
}

/// A breakable block was destroyed; drives the debris burst and sound.
#[derive(Event, Clone, Copy, Debug)]
pub struct BlockBroken {
    pub x: i32,
    pub y: i32,
}

/// The player left the ground under jump input. Audio-only cue.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct PlayerJumped;
