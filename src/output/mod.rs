//! Output decoration module
//!
//! Pure text decoration used by both the runner and the verifier.

mod decorate;

pub use decorate::{
    bold_green, bold_red, bold_yellow, color_for_token, decorate, green, red, yellow, Background,
    Color, Style,
};
