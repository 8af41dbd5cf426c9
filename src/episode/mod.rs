mod format;
mod model;

pub use format::{duration_to_time_string, format_published_at, parse_duration, parse_published_at};
pub use model::Episode;
