use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::delivery::DeliveryGateway;
use crate::dispatch::Dispatcher;
use crate::hosts::HostRegistry;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub dispatcher: Arc<Dispatcher>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, gateway: Arc<dyn DeliveryGateway>) -> Self {
        let registry = Arc::new(HostRegistry::from_settings(&settings));
        let dispatcher = Arc::new(Dispatcher::new(registry, gateway));

        Self {
            settings: Arc::new(settings),
            dispatcher,
            start_time: Instant::now(),
        }
    }
}
