pub mod paint;
pub mod widget;

pub use paint::{DrawCommand, PaintContext};
pub use widget::{Color, Event, EventResponse, Key, MouseButton, Rect, Widget};
