//! # tally-cli
//!
//! Terminal rendering for tally trackers: field templates, line
//! renderers, an `indicatif` bridge, styled messages and shell completion.

pub mod completion;
pub mod indicatif_bridge;
pub mod output;
pub mod render;
pub mod template;
pub mod ui;

pub use indicatif_bridge::IndicatifHook;
pub use render::{build_hook, BarRenderer, CounterRenderer, RenderStyle, SpinnerRenderer};
pub use template::{Template, TemplateError};
