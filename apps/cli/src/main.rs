use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use textprint_document::{DocumentSource, TextBuffer};
use textprint_printing::{
    CancelFlag, FileInfo, FontDescriptor, JobWarning, MonospaceMeasurer, Orientation, PaperId,
    PaperSize, PrintJob, PrintJobOptions, PrintSettings, SettingsStore, SystemClock,
};
use textprint_settings::JsonSettingsStore;

#[derive(Parser)]
#[command(
    name = "textprint",
    about = "Paginate and lay out text files for printing",
    author,
    version
)]
struct Cli {
    /// Workspace root (defaults to current directory).
    /// （指定工作區根目錄；預設為目前目錄。）
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    /// Increase log verbosity (repeatable).
    /// （提高日誌詳細程度（可重複）。）
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate a file and list where each page starts.
    /// （計算分頁並列出每頁起點。）
    Paginate(PaginateArgs),
    /// Dump page drawing commands as JSON.
    /// （以 JSON 輸出頁面繪製指令。）
    Render(RenderArgs),
    /// Rasterise one page to a PNG preview.
    /// （將單頁繪製為 PNG 預覽。）
    Preview(PreviewArgs),
    /// Show or initialise the print settings file.
    /// （檢視或初始化列印設定。）
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct PrintArgs {
    /// Text file to print.
    /// （要列印的文字檔。）
    input: PathBuf,

    /// Disable wrapping of long lines.
    /// （停用自動換行。）
    #[arg(long)]
    no_wrap: bool,

    /// Truncate long lines with an ellipsis (implies --no-wrap).
    /// （不換行時以省略號截斷長行。）
    #[arg(long)]
    ellipsize: bool,

    /// Print line numbers.
    /// （顯示行號。）
    #[arg(long)]
    line_numbers: bool,

    /// Number every Nth line.
    /// （每隔幾行顯示行號。）
    #[arg(long, value_name = "N")]
    ln_step: Option<u32>,

    /// Body font, e.g. "Monospace 10".
    /// （內文字型，例如 "Monospace 10"。）
    #[arg(long, value_name = "FONT")]
    font: Option<String>,

    /// Ignore document styling.
    /// （不套用文件樣式。）
    #[arg(long)]
    no_styles: bool,

    /// Disable the header band.
    /// （停用頁首。）
    #[arg(long)]
    no_header: bool,

    /// Disable the footer band.
    /// （停用頁尾。）
    #[arg(long)]
    no_footer: bool,

    /// Paper size.
    /// （紙張大小。）
    #[arg(long, value_enum)]
    paper: Option<PaperChoice>,

    /// Print in landscape orientation.
    /// （橫向列印。）
    #[arg(long)]
    landscape: bool,

    /// First line to print (1-based).
    /// （起始行（1 起算）。）
    #[arg(long, value_name = "LINE")]
    first_line: Option<usize>,

    /// Last line to print (1-based, inclusive).
    /// （結束行（1 起算，含）。）
    #[arg(long, value_name = "LINE")]
    last_line: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaperChoice {
    A4,
    Letter,
    Legal,
    A3,
}

impl From<PaperChoice> for PaperId {
    fn from(choice: PaperChoice) -> Self {
        match choice {
            PaperChoice::A4 => PaperId::A4,
            PaperChoice::Letter => PaperId::Letter,
            PaperChoice::Legal => PaperId::Legal,
            PaperChoice::A3 => PaperId::A3,
        }
    }
}

#[derive(Args)]
struct PaginateArgs {
    #[command(flatten)]
    print: PrintArgs,

    /// Emit JSON instead of text.
    /// （以 JSON 輸出。）
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    print: PrintArgs,

    /// Only render this page (1-based).
    /// （只輸出指定頁（1 起算）。）
    #[arg(long, value_name = "N")]
    page: Option<usize>,

    /// Output file; defaults to stdout.
    /// （輸出檔案；預設為標準輸出。）
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PreviewArgs {
    #[command(flatten)]
    print: PrintArgs,

    /// Page to preview (1-based).
    /// （預覽頁碼（1 起算）。）
    #[arg(long, value_name = "N", default_value_t = 1)]
    page: usize,

    /// Raster resolution in dots per inch.
    /// （解析度。）
    #[arg(long, default_value_t = 96)]
    dpi: u32,

    /// Destination PNG file.
    /// （PNG 輸出路徑。）
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the effective settings as JSON.
    /// （顯示目前生效的設定。）
    Show,
    /// Write the default settings file.
    /// （寫入預設設定檔。）
    Init(SettingsInitArgs),
}

#[derive(Args)]
struct SettingsInitArgs {
    /// Overwrite an existing settings file.
    /// （覆寫既有設定檔。）
    #[arg(long)]
    force: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);
    let workspace_root = resolve_workspace(workspace)?;
    match command {
        Commands::Paginate(args) => execute_paginate(args, &workspace_root),
        Commands::Render(args) => execute_render(args, &workspace_root),
        Commands::Preview(args) => execute_preview(args, &workspace_root),
        Commands::Settings(subcommand) => execute_settings_command(subcommand, &workspace_root),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// A loaded document together with the options to print it with.
/// （已載入的文件與作業選項。）
struct LoadedInput {
    path: PathBuf,
    document: TextBuffer,
    options: PrintJobOptions,
}

fn load_input(args: &PrintArgs, workspace_root: &Path) -> Result<LoadedInput> {
    let path = resolve_input_path(&args.input)?;
    let document =
        TextBuffer::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let store = JsonSettingsStore::in_workspace(workspace_root);
    let mut settings = store
        .load()
        .with_context(|| format!("failed to load settings from {}", store.path().display()))?;
    apply_overrides(&mut settings, args)?;

    let mut options = PrintJobOptions::from_settings(&settings)
        .with_file(FileInfo::from_path(&path));
    if args.first_line.is_some() || args.last_line.is_some() {
        let first_line = match args.first_line {
            Some(0) => bail!("--first-line is 1-based"),
            Some(line) => line - 1,
            None => 0,
        };
        let last_line = match args.last_line {
            Some(0) => bail!("--last-line is 1-based"),
            Some(line) => i64::try_from(line - 1).context("--last-line is too large")?,
            None => -1,
        };
        options = options.with_line_range(first_line, last_line);
    }
    log::debug!(
        "loaded {} ({} lines, {} chars)",
        path.display(),
        document.line_count(),
        document.char_len()
    );
    Ok(LoadedInput {
        path,
        document,
        options,
    })
}

fn apply_overrides(settings: &mut PrintSettings, args: &PrintArgs) -> Result<()> {
    if args.no_wrap || args.ellipsize {
        settings.wrap = false;
    }
    if args.ellipsize {
        settings.ellipsize = true;
    }
    if args.line_numbers {
        settings.show_line_numbers = true;
    }
    if let Some(step) = args.ln_step {
        if step == 0 {
            bail!("--ln-step must be at least 1");
        }
        settings.line_number_step = step;
    }
    if let Some(font) = &args.font {
        let font = FontDescriptor::parse(font).with_context(|| format!("invalid font '{font}'"))?;
        settings.font = Some(font);
        settings.use_custom_font = true;
    }
    if args.no_styles {
        settings.use_styles = false;
    }
    if args.no_header {
        settings.header.enabled = false;
    }
    if args.no_footer {
        settings.footer.enabled = false;
    }
    if let Some(paper) = args.paper {
        if let Some(size) = PaperSize::preset(paper.into()) {
            settings.page_setup.paper = size;
        }
    }
    if args.landscape {
        settings.page_setup.orientation = Orientation::Landscape;
    }
    settings.sanitize();
    Ok(())
}

fn execute_paginate(args: PaginateArgs, workspace_root: &Path) -> Result<()> {
    let input = load_input(&args.print, workspace_root)?;
    let measurer = MonospaceMeasurer::default();
    let clock = SystemClock;
    let mut job = PrintJob::new(&input.document, &measurer, &clock, input.options)
        .with_context(|| format!("failed to prepare {}", input.path.display()))?;
    report_warnings(job.warnings());
    job.paginate(&CancelFlag::new())?;

    let pages: Vec<_> = job
        .pages()
        .iter()
        .map(|page| (page.offset, input.document.position_at(page.offset)))
        .collect();
    if args.json {
        let entries: Vec<_> = pages
            .iter()
            .enumerate()
            .map(|(index, (offset, position))| {
                json!({
                    "page": index + 1,
                    "offset": offset,
                    "line": position.line + 1,
                    "column": position.column + 1,
                })
            })
            .collect();
        let payload = json!({
            "file": input.path.display().to_string(),
            "page_count": pages.len(),
            "pages": entries,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}: {} page(s)", input.path.display(), pages.len());
        for (index, (offset, position)) in pages.iter().enumerate() {
            println!(
                "page {}: offset {} (line {}, column {})",
                index + 1,
                offset,
                position.line + 1,
                position.column + 1
            );
        }
    }
    Ok(())
}

fn execute_render(args: RenderArgs, workspace_root: &Path) -> Result<()> {
    let input = load_input(&args.print, workspace_root)?;
    let measurer = MonospaceMeasurer::default();
    let clock = SystemClock;
    let mut job = PrintJob::new(&input.document, &measurer, &clock, input.options)
        .with_context(|| format!("failed to prepare {}", input.path.display()))?;
    report_warnings(job.warnings());
    job.paginate(&CancelFlag::new())?;

    let pages = match args.page {
        Some(0) => bail!("--page is 1-based"),
        Some(page) => vec![job.render_page(page - 1)?],
        None => job.render_all(&CancelFlag::new())?,
    };
    let payload = serde_json::to_string_pretty(&json!({
        "file": input.path.display().to_string(),
        "geometry": job.geometry(),
        "pages": pages,
    }))?;

    match args.output {
        Some(output) => {
            let output = resolve_input_path(&output)?;
            write_output(&output, payload.as_bytes())?;
            println!("Wrote {} page(s) to {}", pages.len(), output.display());
        }
        None => println!("{payload}"),
    }
    Ok(())
}

fn execute_preview(args: PreviewArgs, workspace_root: &Path) -> Result<()> {
    if args.page == 0 {
        bail!("--page is 1-based");
    }
    let input = load_input(&args.print, workspace_root)?;
    let measurer = MonospaceMeasurer::default();
    let clock = SystemClock;
    let mut job = PrintJob::new(&input.document, &measurer, &clock, input.options)
        .with_context(|| format!("failed to prepare {}", input.path.display()))?;
    report_warnings(job.warnings());
    job.paginate(&CancelFlag::new())?;

    let preview = job.preview_page(args.page - 1, args.dpi)?;
    let output = resolve_input_path(&args.output)?;
    write_output(&output, &preview.data)?;
    println!(
        "Wrote page {} ({}x{} px at {} dpi) to {}",
        args.page,
        preview.width_px,
        preview.height_px,
        preview.dpi,
        output.display()
    );
    Ok(())
}

fn execute_settings_command(command: SettingsCommand, workspace_root: &Path) -> Result<()> {
    let mut store = JsonSettingsStore::in_workspace(workspace_root);
    match command {
        SettingsCommand::Show => {
            let settings = store
                .load()
                .with_context(|| format!("failed to load {}", store.path().display()))?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::Init(args) => {
            if store.exists() && !args.force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    store.path().display()
                );
            }
            store
                .save(&PrintSettings::default())
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            println!("Wrote default print settings to {}", store.path().display());
        }
    }
    Ok(())
}

fn report_warnings(warnings: &[JobWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
