pub mod spaced_repetition;
pub mod speed;

pub use spaced_repetition::{moving_average_ms, update_mastery};
pub use speed::{speed_badge, speed_threshold_ms, SpeedBadge};
