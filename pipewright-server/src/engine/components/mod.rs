//! Built-in executable components.

mod base64;
mod http;
mod json;
mod text;

pub use self::base64::Base64Component;
pub use self::http::HttpComponent;
pub use self::json::JsonComponent;
pub use self::text::TextComponent;
