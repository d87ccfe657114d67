pub mod content;
pub mod image;
pub mod style;

pub use content::*;
pub use image::*;
pub use style::*;
