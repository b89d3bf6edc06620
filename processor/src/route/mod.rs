use utils::SingleFlight;

use crate::pipeline::Processor;

pub mod health;
pub mod process;

#[derive(Clone)]
pub struct AppState {
    pub processor: Processor,
    pub flight: SingleFlight,
}
