pub mod alpha_blend;
mod compositor;
pub mod font;
pub mod shapes;

pub use alpha_blend::{blend_panel, overlay_alpha};
pub use compositor::{Compositor, HudData};
pub use font::HudFont;
