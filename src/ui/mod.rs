pub mod app;
pub mod components;
pub mod composer;
pub mod markup;
pub mod state;

pub use app::ChatApp;
pub use state::AppState;
