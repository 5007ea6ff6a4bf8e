use std::fmt;
use std::path::Path;

use textprint_document::{DocumentSource, TextSpan};
use thiserror::Error;

use crate::clock::{Clock, Timestamp};
use crate::config::{ConfigError, HeaderFooterSpec, LineSelection, PrintConfig};
use crate::display::{DisplayList, RenderSurface};
use crate::font::{FontDescriptor, PrintFonts};
use crate::geometry::{
    compute, compute_with_fallback, BandMetrics, GeometryError, GeometryRequest, PageGeometry,
    PrintableArea,
};
use crate::job::{JobState, PageSetup, PrintJobId};
use crate::layout::{paginate, CancelFlag, LineLayouter, PageStart, Pagination, PaginationStatus};
use crate::measure::Measurer;
use crate::preview::{render_preview_png, PagePreview, PreviewError};
use crate::render::{draw_band, draw_body, BandPosition};
use crate::settings::{PrintSettings, SettingsStore};
use crate::template::{HeaderFooterBand, TemplateContext, TemplateError};

/// File identity shown by `%EF` and `%Ef`.
/// （供 `%EF` 與 `%Ef` 使用的檔案名稱。）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub filename: Option<String>,
    pub basename: Option<String>,
}

impl FileInfo {
    /// Untitled documents have neither name.
    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            filename: Some(path.display().to_string()),
            basename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }
}

/// Everything a job needs besides its collaborators.
/// （建立列印作業所需的選項。）
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJobOptions {
    pub config: PrintConfig,
    pub page_setup: PageSetup,
    pub file: FileInfo,
    /// Font the document is displayed with, used unless a custom font is set.
    pub document_font: Option<FontDescriptor>,
}

impl Default for PrintJobOptions {
    fn default() -> Self {
        Self::from_settings(&PrintSettings::default())
    }
}

impl PrintJobOptions {
    pub fn from_settings(settings: &PrintSettings) -> Self {
        Self {
            config: PrintConfig::from_settings(settings),
            page_setup: settings.page_setup,
            file: FileInfo::untitled(),
            document_font: None,
        }
    }

    pub fn with_file(mut self, file: FileInfo) -> Self {
        self.file = file;
        self
    }

    pub fn with_line_range(mut self, first_line: usize, last_line: i64) -> Self {
        self.config = self.config.with_line_range(first_line, last_line);
        self
    }

    pub fn with_document_font(mut self, font: FontDescriptor) -> Self {
        self.document_font = Some(font);
        self
    }
}

/// Recoverable problems surfaced to the host.
/// （可復原、需告知使用者的狀況。）
#[derive(Debug, Clone, PartialEq)]
pub enum JobWarning {
    BandDisabled {
        position: BandPosition,
        error: TemplateError,
    },
    DegradedGeometry(GeometryError),
}

impl fmt::Display for JobWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobWarning::BandDisabled { position, error } => {
                let band = match position {
                    BandPosition::Header => "header",
                    BandPosition::Footer => "footer",
                };
                write!(f, "{band} disabled: {error}")
            }
            JobWarning::DegradedGeometry(error) => {
                write!(f, "{error}; using the full page height")
            }
        }
    }
}

/// Errors raised while running a print job.
/// （列印作業執行時可能發生的錯誤。）
#[derive(Debug, Error)]
pub enum PrintJobError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("failed to load print settings: {0}")]
    Settings(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("the job has not been paginated yet")]
    NotPaginated,
    #[error("pagination was cancelled after {pages} page(s)")]
    Cancelled { pages: usize },
    #[error("page {index} is out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

/// One print job over a borrowed document.
/// （借用文件的單一列印作業。）
///
/// The job validates the line range, parses the header/footer templates,
/// computes the page geometry and captures the timestamp up front. Pages are
/// drawn only after [`PrintJob::paginate`] has run over the whole selection.
pub struct PrintJob<'a, D: ?Sized, M: ?Sized, C: ?Sized> {
    id: PrintJobId,
    document: &'a D,
    measurer: &'a M,
    clock: &'a C,
    config: PrintConfig,
    page_setup: PageSetup,
    file: FileInfo,
    fonts: PrintFonts,
    header: Option<HeaderFooterBand>,
    footer: Option<HeaderFooterBand>,
    geometry: PageGeometry,
    selection: LineSelection,
    timestamp: Timestamp,
    pagination: Option<Pagination>,
    state: JobState,
    current_page: usize,
    warnings: Vec<JobWarning>,
}

impl<'a, D, M, C> PrintJob<'a, D, M, C>
where
    D: DocumentSource + ?Sized,
    M: Measurer + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(
        document: &'a D,
        measurer: &'a M,
        clock: &'a C,
        options: PrintJobOptions,
    ) -> Result<Self, PrintJobError> {
        let PrintJobOptions {
            config,
            page_setup,
            file,
            document_font,
        } = options;
        let id = PrintJobId::new();
        let selection = config.resolve_lines(document)?;
        let fonts = PrintFonts::resolve(&config, document_font.as_ref());
        let mut warnings = Vec::new();

        let header = parse_band(config.header.as_ref(), BandPosition::Header, &mut warnings);
        let footer = parse_band(config.footer.as_ref(), BandPosition::Footer, &mut warnings);

        let mut request = GeometryRequest::new(PrintableArea::from_setup(&page_setup));
        if let Some(band) = &header {
            request = request.with_header(BandMetrics::measure(measurer, &fonts.band, band.show_separator));
        }
        if let Some(band) = &footer {
            request = request.with_footer(BandMetrics::measure(measurer, &fonts.band, band.show_separator));
        }
        if config.show_line_numbers {
            request = request.with_line_numbers(selection.max_line_number(), &fonts.line_number);
        }
        let geometry = match compute(&request, measurer) {
            Err(error @ GeometryError::BandsExceedPage { .. }) => {
                warnings.push(JobWarning::DegradedGeometry(error));
                compute_with_fallback(&request, measurer)?
            }
            other => other?,
        };

        let timestamp = clock.now();
        log::info!(
            "{id}: lines {}..={} on {:.0}x{:.0}pt text area",
            selection.first_line,
            selection.last_line,
            geometry.text.width,
            geometry.text.height
        );

        Ok(Self {
            id,
            document,
            measurer,
            clock,
            config,
            page_setup,
            file,
            fonts,
            header,
            footer,
            geometry,
            selection,
            timestamp,
            pagination: None,
            state: JobState::Idle,
            current_page: 0,
            warnings,
        })
    }

    /// Builds a job from settings loaded through `store`.
    pub fn from_store<S>(
        document: &'a D,
        measurer: &'a M,
        clock: &'a C,
        store: &S,
        file: FileInfo,
    ) -> Result<Self, PrintJobError>
    where
        S: SettingsStore + ?Sized,
    {
        let settings = store
            .load()
            .map_err(|err| PrintJobError::Settings(Box::new(err)))?;
        Self::new(
            document,
            measurer,
            clock,
            PrintJobOptions::from_settings(&settings).with_file(file),
        )
    }

    pub fn id(&self) -> PrintJobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn page_setup(&self) -> &PageSetup {
        &self.page_setup
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn selection(&self) -> LineSelection {
        self.selection
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn warnings(&self) -> &[JobWarning] {
        &self.warnings
    }

    pub fn header(&self) -> Option<&HeaderFooterBand> {
        self.header.as_ref()
    }

    pub fn footer(&self) -> Option<&HeaderFooterBand> {
        self.footer.as_ref()
    }

    /// Splits the selection into pages, replacing any earlier result.
    pub fn paginate(&mut self, cancel: &CancelFlag) -> Result<&Pagination, PrintJobError> {
        self.state = JobState::Paginating;
        let pagination = paginate(
            self.document,
            &self.config,
            &self.geometry,
            self.measurer,
            &self.fonts,
            cancel,
        )?;
        self.state = match pagination.status {
            PaginationStatus::Complete => JobState::Ready,
            PaginationStatus::Cancelled => JobState::Cancelled,
        };
        self.current_page = 0;
        log::info!("{}: {} page(s), {:?}", self.id, pagination.page_count(), pagination.status);
        let pagination = &*self.pagination.insert(pagination);
        Ok(pagination)
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn pages(&self) -> &[PageStart] {
        self.pagination
            .as_ref()
            .map_or(&[], |pagination| pagination.pages.as_slice())
    }

    pub fn page_count(&self) -> Option<usize> {
        self.pagination.as_ref().map(Pagination::page_count)
    }

    pub fn page_span(&self, index: usize) -> Option<TextSpan> {
        self.pagination.as_ref()?.page_span(index)
    }

    /// Draws page `index` (0-based) onto `surface`.
    pub fn draw_page<S>(&mut self, index: usize, surface: &mut S) -> Result<(), PrintJobError>
    where
        S: RenderSurface + ?Sized,
    {
        let (span, total_pages) = self.checked_page(index)?;
        self.state = JobState::Drawing;
        self.current_page = index + 1;
        self.draw_contents(index, span, total_pages, surface);
        if self.current_page == total_pages {
            self.state = JobState::Finished;
        }
        Ok(())
    }

    /// Records page `index` into a fresh display list.
    pub fn render_page(&mut self, index: usize) -> Result<DisplayList, PrintJobError> {
        let mut list = DisplayList::new();
        self.draw_page(index, &mut list)?;
        Ok(list)
    }

    /// Records every page, stopping early when `cancel` is raised between pages.
    pub fn render_all(&mut self, cancel: &CancelFlag) -> Result<Vec<DisplayList>, PrintJobError> {
        let (_, total_pages) = self.checked_page(0)?;
        let mut pages = Vec::with_capacity(total_pages);
        for index in 0..total_pages {
            if cancel.is_cancelled() {
                self.state = JobState::Cancelled;
                break;
            }
            pages.push(self.render_page(index)?);
        }
        Ok(pages)
    }

    /// Rasterises page `index` to PNG at `dpi`.
    pub fn preview_page(&mut self, index: usize, dpi: u32) -> Result<PagePreview, PrintJobError> {
        let list = self.render_page(index)?;
        let preview = render_preview_png(
            &list,
            self.page_setup.page_size_pt(),
            self.geometry.area,
            dpi,
        )?;
        Ok(preview)
    }

    /// Status line for progress reporting.
    pub fn progress_text(&self) -> String {
        match (self.state, self.page_count()) {
            (JobState::Finished, _) => "Finished printing".to_string(),
            (JobState::Cancelled, _) => "Printing cancelled".to_string(),
            (JobState::Drawing, Some(total)) => {
                format!("Printing page {} of {}", self.current_page, total)
            }
            (JobState::Ready, Some(total)) => format!("Ready to print {total} page(s)"),
            (JobState::Paginating, _) => "Paginating".to_string(),
            _ => "Idle".to_string(),
        }
    }

    fn checked_page(&self, index: usize) -> Result<(TextSpan, usize), PrintJobError> {
        let pagination = self.pagination.as_ref().ok_or(PrintJobError::NotPaginated)?;
        if !pagination.is_complete() {
            return Err(PrintJobError::Cancelled {
                pages: pagination.page_count(),
            });
        }
        let count = pagination.page_count();
        let span = pagination
            .page_span(index)
            .ok_or(PrintJobError::PageOutOfRange { index, count })?;
        Ok((span, count))
    }

    fn draw_contents<S>(&self, index: usize, span: TextSpan, total_pages: usize, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        let context = TemplateContext {
            timestamp: self.timestamp,
            page_number: index + 1,
            total_pages,
            filename: self.file.filename.as_deref(),
            basename: self.file.basename.as_deref(),
        };

        if let Some(band) = &self.header {
            draw_band(
                surface,
                band,
                BandPosition::Header,
                &self.geometry,
                &context,
                self.clock,
                self.measurer,
                &self.fonts.band,
            );
        }

        let layouter = LineLayouter::new(
            self.document,
            self.measurer,
            &self.config,
            &self.fonts,
            &self.geometry,
        );
        draw_body(surface, &layouter, &self.geometry, span);

        if let Some(band) = &self.footer {
            draw_band(
                surface,
                band,
                BandPosition::Footer,
                &self.geometry,
                &context,
                self.clock,
                self.measurer,
                &self.fonts.band,
            );
        }
        log::debug!("{}: drew page {} of {}", self.id, index + 1, total_pages);
    }
}

fn parse_band(
    spec: Option<&HeaderFooterSpec>,
    position: BandPosition,
    warnings: &mut Vec<JobWarning>,
) -> Option<HeaderFooterBand> {
    match HeaderFooterBand::parse(spec?) {
        Ok(band) if band.is_empty() => None,
        Ok(band) => Some(band),
        Err(error) => {
            log::warn!("disabling {position:?} band: {error}");
            warnings.push(JobWarning::BandDisabled { position, error });
            None
        }
    }
}
