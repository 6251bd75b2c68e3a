// Display module - frame buffer handling
//
// The PPU composes directly into an RGBA8 buffer; this module carries
// the resolution constants and the scaling used by
// `render_main_screen_rgba` when a frontend asks for a different
// output size.

mod framebuffer;

pub use framebuffer::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
