//! Image catalog construction.
//!
//! Raw image paths are parsed into [`ImageRecord`]s and bucketed into a
//! [`GroupedCatalog`] keyed by algorithm and episode. An episode is addressed
//! from the outside by its [`EpisodeKey`].

pub use self::{episode_key::*, grouped::*, image_record::*};

mod episode_key;
mod grouped;
mod image_record;
