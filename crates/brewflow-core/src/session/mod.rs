mod clock;
mod display;
mod driver;
mod engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display::DisplayState;
pub use driver::{SessionDriver, SessionHandle, SessionIntent};
pub use engine::{SessionEngine, SessionPhase};
