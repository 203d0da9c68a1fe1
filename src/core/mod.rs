pub mod guard;
pub mod mediator;
pub mod mvc;
pub mod mvp;
pub mod mvvm;
pub mod parse;
pub mod screen;
pub mod view;
pub mod viper;

pub use crate::domain::model::{Delivery, DisplayValue, Fetched, RawPayload, SourceKind, TriggerOutcome};
pub use crate::domain::ports::{DataDisplayable, DataSource, PayloadParser, RenderSurface, Triggerable};
pub use crate::utils::error::Result;
