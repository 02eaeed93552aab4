//! Percentage-table bill-of-materials explosion.
//!
//! A product recipe is a table of mixes (columns) and ingredients (rows). The
//! requirements engine turns it into absolute raw material quantities for a
//! requested amount of the final mix.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
