mod env;

pub use crate::state::env::AppEnv;
use actix_web::web;

/// Common data provided to endpoints.
pub struct AppState {
    env: AppEnv,
}

impl AppState {
    pub fn new(env: AppEnv) -> Self {
        Self { env }
    }

    pub fn get_env(&self) -> &AppEnv {
        &self.env
    }
}

/// Create a new object web::Data<AppState>.
pub fn new_app_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(AppEnv::default()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::env::{LayoutEnvData, ServerEnvData};

    /// State with built-in defaults, independent of the process environment.
    pub fn test_app_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(AppEnv {
            server: ServerEnvData::from_lookup(|_| None),
            layout: LayoutEnvData::from_lookup(|_| None),
        }))
    }
}
