use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintJobId(u64);

impl PrintJobId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PrintJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print-job-{}", self.0)
    }
}

/// Orientation of a print page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Margin values expressed in points (1/72").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margin {
    pub const fn zero() -> Self {
        Self::uniform(0.0)
    }

    pub const fn uniform(points: f32) -> Self {
        Self {
            top: points,
            bottom: points,
            left: points,
            right: points,
        }
    }

    fn sanitized(self) -> Self {
        let clamp = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            top: clamp(self.top),
            bottom: clamp(self.bottom),
            left: clamp(self.left),
            right: clamp(self.right),
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(36.0)
    }
}

/// Supported paper identifiers for quick selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperId {
    A4,
    Letter,
    Legal,
    A3,
    Custom,
}

impl PaperId {
    /// Looks up a preset by its name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PaperId::A4),
            "letter" => Some(PaperId::Letter),
            "legal" => Some(PaperId::Legal),
            "a3" => Some(PaperId::A3),
            _ => None,
        }
    }
}

/// Represents a paper size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSize {
    pub id: PaperId,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PaperSize {
    pub const A4: PaperSize = PaperSize::new(PaperId::A4, 210.0, 297.0);
    pub const LETTER: PaperSize = PaperSize::new(PaperId::Letter, 215.9, 279.4);
    pub const LEGAL: PaperSize = PaperSize::new(PaperId::Legal, 215.9, 355.6);
    pub const A3: PaperSize = PaperSize::new(PaperId::A3, 297.0, 420.0);

    pub const fn new(id: PaperId, width_mm: f32, height_mm: f32) -> Self {
        Self {
            id,
            width_mm,
            height_mm,
        }
    }

    /// Builds a custom paper from a size in points.
    pub fn from_points(width_pt: f32, height_pt: f32) -> Self {
        Self::new(PaperId::Custom, width_pt / 72.0 * MM_PER_INCH, height_pt / 72.0 * MM_PER_INCH)
    }

    pub fn preset(id: PaperId) -> Option<Self> {
        match id {
            PaperId::A4 => Some(Self::A4),
            PaperId::Letter => Some(Self::LETTER),
            PaperId::Legal => Some(Self::LEGAL),
            PaperId::A3 => Some(Self::A3),
            PaperId::Custom => None,
        }
    }

    /// Sheet size in points, rounded to hundredths.
    pub fn to_points(&self, orientation: Orientation) -> (f32, f32) {
        let width_pt = mm_to_points(self.width_mm);
        let height_pt = mm_to_points(self.height_mm);
        match orientation {
            Orientation::Portrait => (width_pt, height_pt),
            Orientation::Landscape => (height_pt, width_pt),
        }
    }
}

const MM_PER_INCH: f32 = 25.4;

fn mm_to_points(mm: f32) -> f32 {
    (mm / MM_PER_INCH * 7200.0).round() / 100.0
}

/// Paper, orientation and margins chosen for a job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub paper: PaperSize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub margins: Margin,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            margins: Margin::default(),
        }
    }
}

impl PageSetup {
    pub fn new(paper: PaperSize, orientation: Orientation, margins: Margin) -> Self {
        Self {
            paper,
            orientation,
            margins,
        }
    }

    /// Full sheet size in points, after orientation.
    pub fn page_size_pt(&self) -> (f32, f32) {
        self.paper.to_points(self.orientation)
    }

    pub(crate) fn sanitize(&mut self) {
        if !(self.paper.width_mm.is_finite() && self.paper.width_mm > 0.0)
            || !(self.paper.height_mm.is_finite() && self.paper.height_mm > 0.0)
        {
            self.paper = PaperSize::A4;
        }
        self.margins = self.margins.sanitized();
    }
}

/// Lifecycle of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Paginating,
    Ready,
    Drawing,
    Finished,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Cancelled)
    }
}
