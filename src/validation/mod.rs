//! Format validation for operator-entered entropy.
//!
//! Dice rolls and transcribed computer entropy arrive as free text.
//! This module normalizes that text and checks it against the format
//! rules before anything is hashed. Validators are pure: they report
//! the failed rule and leave the retry loop to the caller.

mod seed;

pub use seed::{
    unchunk, validate_dice_seed, validate_rng_seed, EntropySeed, SeedError, SeedOrigin,
};
