//! Line-oriented JSON front end
//!
//! Each input line is a request object tagged by `"type"`; each gets exactly
//! one response line back.

pub mod dispatch;
pub mod messages;

pub use dispatch::{dispatch, serve_lines};
pub use messages::{parse_request, FurnaceMsg, ItemMsg, RecipeMsg, Request, Response};
