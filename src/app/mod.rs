pub mod bootstrap;

pub use bootstrap::{assemble, build_screen, build_screen_as, Sources, Wiring};
