pub mod flight;
pub mod signal;
pub mod ticker;

pub use flight::{FlightGuard, SingleFlight};
pub use signal::{wait_for_stop_signal, StopSignal};
pub use ticker::every;
