//! Session state and logic (UI-agnostic).

mod debounce;
mod io;
mod ops;
mod state;
mod store;
mod view;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use state::Session;
pub use store::DatasetStore;
pub use view::CurrentView;
