//! UI module root: exposes drawing functions for individual panels.

pub mod cards;
pub mod charts;
pub mod disks;
pub mod header;
pub mod stats;
pub mod theme;
