use crate::domain::model::DisplayValue;
use crate::domain::ports::RenderSurface;
use crate::utils::error::ScreenError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    #[default]
    Stdout,
    Tracing,
    Null,
}

impl FromStr for SurfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(SurfaceKind::Stdout),
            "tracing" => Ok(SurfaceKind::Tracing),
            "null" | "none" => Ok(SurfaceKind::Null),
            other => Err(format!("unknown surface '{}'", other)),
        }
    }
}

impl SurfaceKind {
    pub fn writes_stdout(self) -> bool {
        matches!(self, SurfaceKind::Stdout)
    }

    pub fn build(self) -> Box<dyn RenderSurface> {
        match self {
            SurfaceKind::Stdout => Box::new(StdoutSurface),
            SurfaceKind::Tracing => Box::new(TracingSurface),
            SurfaceKind::Null => Box::new(NullSurface),
        }
    }
}

/// 直接印到終端機
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSurface;

impl RenderSurface for StdoutSurface {
    fn render_data(&self, screen: &str, value: &DisplayValue) {
        println!("[{}] {}", screen, value);
    }

    fn render_error(&self, screen: &str, error: &ScreenError) {
        eprintln!("[{}] ❌ {}", screen, error);
    }

    fn announce_request(&self, screen: &str) {
        println!("[{}] needs data", screen);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSurface;

impl RenderSurface for TracingSurface {
    fn render_data(&self, screen: &str, value: &DisplayValue) {
        tracing::info!(screen, value = value.as_str(), "render");
    }

    fn render_error(&self, screen: &str, error: &ScreenError) {
        tracing::error!(screen, %error, "render error");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render_data(&self, _screen: &str, _value: &DisplayValue) {}

    fn render_error(&self, _screen: &str, _error: &ScreenError) {}
}
