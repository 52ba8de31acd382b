pub mod input;
pub mod labels;
pub mod legend;
pub mod tooltip;
