pub mod args;
pub mod commands;
pub mod explore;
pub mod render;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
pub use explore::{explore, ExploreCommand};
pub use render::Renderer;
