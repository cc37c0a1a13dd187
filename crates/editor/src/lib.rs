mod editor;
mod extension;
mod extensions;
mod listeners;
mod menu;
mod plugins;
mod rules;
mod schema;

pub use crate::editor::*;
pub use crate::extension::*;
pub use crate::extensions::*;
pub use crate::listeners::*;
pub use crate::menu::*;
pub use crate::plugins::*;
pub use crate::rules::*;
pub use crate::schema::*;
