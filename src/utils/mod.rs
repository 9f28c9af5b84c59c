pub mod string;

pub use string::{humanize_name, strip_color_codes};
