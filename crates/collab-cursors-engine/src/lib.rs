pub mod collaborator;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod render;
pub mod selection;
pub mod surface;

// Re-export key types for easier usage
pub use collaborator::{
    Clock, CollaboratorHandle, CollaboratorId, CollaboratorState, Color, ManualClock, SystemClock,
};
pub use editor::{CollaborativeEditor, EditorBuilder, TextBuffer};
pub use error::{CollaboratorError, ConfigurationError};
pub use geometry::{CaretCoordinate, GeometryOracle, Layout, Row, SurfaceMetrics, compute_rows};
pub use manager::{OverlayOptions, SelectionManager};
pub use render::{
    CursorPlacement, Element, ElementMetrics, RecordingRenderer, RenderOp, Renderer, RowHandle,
    RowPatch, reconcile_rows,
};
pub use selection::{NormalizedSelection, SelectionRange, SelectionState};
pub use surface::{Glyph, HostEdit, MonospaceSurface, ScrollOffset, SurfaceBounds, TextSurface};
