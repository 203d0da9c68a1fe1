// Adapters layer: concrete implementations of the ports for external systems (http, local store, callbacks, render surfaces).

pub mod callback;
pub mod http;
pub mod store;
pub mod stub;
pub mod surface;

pub use callback::{CallbackSource, Completion};
pub use http::HttpSource;
pub use store::LocalStoreSource;
pub use stub::StubSource;
pub use surface::{NullSurface, StdoutSurface, SurfaceKind, TracingSurface};
