pub mod schedule;
pub mod timer;
pub mod virtual_timer;

pub use schedule::Schedule;
pub use timer::{HighPrecisionTimer, Timer};
pub use virtual_timer::VirtualTimer;
