//! Collection utilities

pub use slotmap::{SlotMap, SecondaryMap, Key};
