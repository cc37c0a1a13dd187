mod command;
mod doc;
mod dom;
mod history;
mod input;
mod keymap;
mod plugin;
mod schema;
mod serialize;
mod state;
mod steps;
mod view;

pub use crate::command::*;
pub use crate::doc::*;
pub use crate::dom::*;
pub use crate::history::*;
pub use crate::input::*;
pub use crate::keymap::*;
pub use crate::plugin::*;
pub use crate::schema::*;
pub use crate::serialize::*;
pub use crate::state::*;
pub use crate::steps::*;
pub use crate::view::*;
