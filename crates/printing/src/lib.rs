//! Print pagination and page layout: style runs, header/footer templates,
//! page geometry, pagination and page drawing.

pub mod baseline;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod font;
pub mod geometry;
pub mod job;
pub mod layout;
pub mod measure;
pub mod preview;
pub mod render;
pub mod runs;
pub mod settings;
pub mod template;

pub use baseline::{align, LayoutMetrics, RowAlignment};
pub use clock::{strftime, Clock, FixedClock, SystemClock, TimeFormatError, Timestamp};
pub use config::{ConfigError, HeaderFooterSpec, LineSelection, PrintConfig};
pub use controller::{FileInfo, JobWarning, PrintJob, PrintJobError, PrintJobOptions};
pub use display::{DisplayCommand, DisplayList, GlyphRun, Point, RenderSurface, Stroke};
pub use font::{FontDescriptor, FontParseError, PrintFonts};
pub use geometry::{
    compute, compute_with_fallback, BandMetrics, GeometryError, GeometryRequest,
    LineNumberColumn, PageGeometry, PrintableArea,
};
pub use job::{JobState, Margin, Orientation, PageSetup, PaperId, PaperSize, PrintJobId};
pub use layout::{
    paginate, CancelFlag, LineLayouter, MeasuredChunk, PageStart, Pagination, PaginationStatus,
};
pub use measure::{
    MeasureRequest, Measurer, MonospaceMeasurer, Overflow, TextLayout, VisualLine,
};
pub use preview::{render_preview_png, PagePreview, PreviewError};
pub use render::{draw_band, draw_body, BandPosition};
pub use runs::{extract_runs, StyleRun};
pub use settings::{
    BandPreferences, MemorySettingsStore, PrintSettings, SettingsStore, PRINT_SETTINGS_VERSION,
};
pub use template::{
    Alignment, HFChunk, HeaderFooterBand, HeaderFooterTemplate, TemplateContext, TemplateError,
};
