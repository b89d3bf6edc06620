use utils::SingleFlight;

use crate::sync::Registrar;

pub mod health;
pub mod sync;

#[derive(Clone)]
pub struct AppState {
    pub registrar: Registrar,
    pub flight: SingleFlight,
}
