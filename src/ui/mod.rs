//! Presentation layer: the controller that owns session state and the HTML
//! fragments it renders.

mod controller;
pub mod templates;

pub use controller::{Controller, Panel};
