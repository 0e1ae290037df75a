//! Map layer of the census explorer: boundary resolution, render
//! descriptors, the [`MapView`] seam, and the [`Session`] that drives them.

pub mod boundary;
pub mod districts;
pub mod geometry;
pub mod legend;
pub mod render;
pub mod search;
pub mod session;
pub mod shape;
pub mod view;

pub use boundary::{expand_mirror, BoundaryResolver, BoundarySettings, ResolvedBoundary};
pub use districts::{district_popup_text, DistrictShape};
pub use geometry::{boundary_paths, district_paths, GeometryError, Path};
pub use legend::{Legend, LegendRow, SchoolScorePanel, SchoolScoreRow};
pub use render::{
    marker_color, normalize, record_count_text, record_popup, HeatPoint, Heatmap, LayerScale,
    Marker,
};
pub use search::{report_filename, Report};
pub use session::{LayerToggles, SearchContext, SearchInputs, Session, SessionSettings};
pub use shape::{BoundaryShape, BoundarySource, ShapeId, ShapeStyle, ZipShape};
pub use view::{InfoPopup, MapView, SceneEvent, SceneRecorder, TemporaryShape};
