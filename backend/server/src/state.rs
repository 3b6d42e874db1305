use std::sync::Arc;

use reqwest::Client;

use super::{config::Config, upstream::Upstream};

pub struct State {
    pub config: Config,
    pub upstream: Upstream,
}

impl State {
    pub fn new(config: Config) -> Arc<Self> {
        let upstream = Upstream::new(Client::new(), config.fsa_base_url.clone());

        Arc::new(Self { config, upstream })
    }
}
