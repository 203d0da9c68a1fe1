use crate::domain::model::{DisplayValue, RawPayload, SourceKind, TriggerOutcome};
use crate::utils::error::{FetchError, ParseError, ScreenError};
use async_trait::async_trait;
use std::sync::Arc;

pub type FetchResult = std::result::Result<RawPayload, FetchError>;

/// Produces one raw payload per call. Failures come back through the same result.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> SourceKind;
    async fn fetch(&self) -> FetchResult;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    async fn fetch(&self) -> FetchResult {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    async fn fetch(&self) -> FetchResult {
        (**self).fetch().await
    }
}

pub trait PayloadParser: Send + Sync {
    fn parse(&self, raw: &RawPayload) -> std::result::Result<DisplayValue, ParseError>;
}

/// Something a view can ask for data.
#[async_trait]
pub trait Triggerable: Send + Sync {
    async fn trigger(&self) -> TriggerOutcome;
}

/// The two sinks a mediator pushes into.
pub trait DataDisplayable: Send + Sync {
    fn display(&self, value: DisplayValue);
    fn show_error(&self, error: ScreenError);
}

/// External UI surface a view renders onto.
pub trait RenderSurface: Send + Sync {
    fn render_data(&self, screen: &str, value: &DisplayValue);
    fn render_error(&self, screen: &str, error: &ScreenError);

    fn announce_request(&self, _screen: &str) {}
}
