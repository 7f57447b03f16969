//! destajo-core - UI-agnostic session state, rendering, export and sources.

pub mod error;
pub mod render;
pub mod session;
pub mod source;
pub mod storage;

pub use error::{DestajoError, Result};
pub use render::{ColumnLayout, IncrementalRenderer, RenderSurface, TableSurface};
pub use session::{CurrentView, DatasetStore, Session};
pub use source::{DataSource, GvizSource, LocalFileSource, SourceChain};

pub use destajo_engine::engine::{FilterState, NormalizedRecord, RawValue, Record};
