mod canvas;
mod chrome;
mod renderer;
mod text;
mod transform;

pub use canvas::Canvas;
pub use chrome::{draw_chrome, draw_menu, overlay_lines, HudView};
pub use renderer::{draw_frame, draw_scene, Renderer};
pub use text::wrap_text;
pub use transform::{camera_offset, world_to_screen_px, Camera, TileSpan, Viewport};
