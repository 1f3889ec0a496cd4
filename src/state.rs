use crate::client::ChargeClient;
use crate::view::ViewRegistry;

#[derive(Clone)]
pub struct AppState {
    pub client: ChargeClient,
    pub views: ViewRegistry,
    pub charge_rate: f64,
}

impl AppState {
    pub fn new(client: ChargeClient, charge_rate: f64) -> Self {
        Self {
            client,
            views: ViewRegistry::new(),
            charge_rate,
        }
    }
}
