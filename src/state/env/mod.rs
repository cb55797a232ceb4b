pub mod layout;
pub mod server;

pub use self::layout::LayoutEnvData;
pub use self::server::ServerEnvData;

#[derive(Clone, Debug, Default)]
pub struct AppEnv {
    pub server: ServerEnvData,
    pub layout: LayoutEnvData,
}
