//! Color model used by the overlay (linear, premultiplied alpha).

mod color;

pub use color::Color;
