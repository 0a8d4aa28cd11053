pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::time::Instant;

use config::Config;
use services::AnswerService;

#[derive(Clone)]
pub struct AppState {
    pub answer_service: AnswerService,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, answer_service: AnswerService) -> Self {
        Self {
            answer_service,
            config,
            start_time: Instant::now(),
        }
    }
}
