pub mod accept;
pub mod json;
pub mod multipart;
pub mod path;
