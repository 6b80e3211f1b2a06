mod text;

pub use text::{sanitize_filename, truncate};
