pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{build_screen, build_screen_as};
pub use config::AppConfig;
pub use crate::core::{
    guard::BusyPolicy,
    screen::{Screen, ScreenReport, Variant},
    view::{ScreenView, ViewState},
    viper::MergePolicy,
};
pub use utils::error::{AppError, FetchError, ParseError, Result, ScreenError};
