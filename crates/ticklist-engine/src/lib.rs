/// Event-sourced undo/redo engine for nested checklist documents.
///
/// A `History` owns a linear log of reversible `Event`s over a
/// groups-of-items `State`, replayable forward and backward. State is
/// published through a `ticklist_store::Store` and mirrored into a shared
/// storage blob under the engine's feature key on every mutation.
pub mod event;
pub mod history;
pub mod model;

pub use event::Event;
pub use history::History;
pub use model::{Group, Item, State};
