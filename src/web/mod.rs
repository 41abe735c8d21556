//! Web page acquisition

mod fetch;
mod html;

pub use fetch::{HttpPageFetcher, PageFetcher, is_blocked_ip};
pub use html::strip_html_to_text;
