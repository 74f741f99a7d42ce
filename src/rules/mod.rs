//! Rule engine - effects that change rolls and actions without the
//! resolution code knowing about them
//!
//! Terrain, commands and rituals register `Rule`s under a `Trigger`. The
//! resolver builds a `RuleContext` at each trigger point, lets the engine run
//! every matching rule over it, then reads back modifiers and blocks.

pub mod commands;
pub mod context;
pub mod engine;
pub mod terrain;
pub mod trigger;

pub use context::{Axis, Modifier, Modifiers, RuleContext};
pub use engine::{Rule, RuleEngine};
pub use trigger::{RuleSource, Trigger};
