//! docrecon CLI - document reconstruction tool

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docrecon::backend::{parse_tsv, JsonLinesRecordStore};
use docrecon::{
    map_tokens, CanvasSize, Conversion, ConversionRecord, Docrecon, ExtractabilityClassifier,
    FieldExtractor, LopdfTextReader, NormalizeOptions, OcrOptions, Quality, TextLayerReader,
    TextNormalizer, Token,
};

#[derive(Parser)]
#[command(name = "docrecon")]
#[command(version)]
#[command(about = "Reconstruct PDFs into positioned, editable text layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert documents, falling back from native text to OCR to images
    Convert {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Rendering quality
        #[arg(short, long, value_enum, default_value = "medium")]
        quality: QualityLevel,

        /// Destination canvas in points (e.g., "720x540")
        #[arg(long, value_name = "WxH", value_parser = parse_canvas)]
        dest: Option<CanvasSize>,

        /// OCR language hint
        #[arg(long, default_value = "kor+eng")]
        lang: String,

        /// Keep output names instead of renaming after extracted fields
        #[arg(long)]
        no_rename: bool,

        /// Convert one document at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Append conversion records to this JSON Lines log
        #[arg(long, value_name = "FILE", env = "DOCRECON_RECORDS")]
        records: Option<PathBuf>,

        /// pdftoppm binary
        #[arg(long, value_name = "PATH", env = "DOCRECON_PDFTOPPM")]
        pdftoppm: Option<PathBuf>,

        /// tesseract binary
        #[arg(long, value_name = "PATH", env = "DOCRECON_TESSERACT")]
        tesseract: Option<PathBuf>,
    },

    /// Normalize raw text (stdin if no file)
    Normalize {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Maximum output length in characters
        #[arg(long, default_value = "600")]
        max_length: usize,
    },

    /// Extract identifier fields from text (stdin if no file)
    Fields {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Report whether a PDF's native text layer is usable
    Classify {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map OCR token dumps (tesseract TSV or token JSON) onto a destination canvas
    Layout {
        /// Token files (.tsv or .json)
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Source page size in pixels (e.g., "1700x2200")
        #[arg(long, value_name = "WxH", value_parser = parse_canvas)]
        source: CanvasSize,

        /// Destination canvas in points
        #[arg(long, value_name = "WxH", value_parser = parse_canvas, default_value = "720x540")]
        dest: CanvasSize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Summarize a conversion record log
    Records {
        /// JSON Lines log
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum QualityLevel {
    /// Fast, lower resolution
    Low,
    /// Balanced (default)
    Medium,
    /// Highest resolution
    High,
}

impl From<QualityLevel> for Quality {
    fn from(level: QualityLevel) -> Self {
        match level {
            QualityLevel::Low => Quality::Low,
            QualityLevel::Medium => Quality::Medium,
            QualityLevel::High => Quality::High,
        }
    }
}

/// Parse "WIDTHxHEIGHT" into a canvas size.
fn parse_canvas(value: &str) -> Result<CanvasSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: f32 = width.trim().parse().map_err(|_| format!("invalid width '{}'", width))?;
    let height: f32 = height.trim().parse().map_err(|_| format!("invalid height '{}'", height))?;
    let canvas = CanvasSize::new(width, height);
    if !canvas.is_valid() {
        return Err(format!("canvas must be positive, got '{}'", value));
    }
    Ok(canvas)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            quality,
            dest,
            lang,
            no_rename,
            sequential,
            compact,
            records,
            pdftoppm,
            tesseract,
        }) => {
            let mut builder = Docrecon::new()
                .with_quality(quality.into())
                .with_ocr_options(OcrOptions::default().with_language_hint(lang));
            if let Some(dest) = dest {
                builder = builder.with_destination(dest);
            }
            if no_rename {
                builder = builder.without_renaming();
            }
            if sequential {
                builder = builder.sequential();
            }
            if compact {
                builder = builder.compact_json();
            }
            if let Some(path) = records {
                builder = builder.with_record_log(path);
            }
            if let Some(path) = pdftoppm {
                builder = builder.with_pdftoppm_binary(path);
            }
            if let Some(path) = tesseract {
                builder = builder.with_tesseract_binary(path);
            }
            cmd_convert(builder, &inputs, output.as_deref())
        }
        Some(Commands::Normalize { input, max_length }) => {
            cmd_normalize(input.as_deref(), max_length)
        }
        Some(Commands::Fields { input }) => cmd_fields(input.as_deref()),
        Some(Commands::Classify { input, json }) => cmd_classify(&input, json),
        Some(Commands::Layout {
            inputs,
            source,
            dest,
            compact,
        }) => cmd_layout(&inputs, source, dest, compact),
        Some(Commands::Records { input }) => cmd_records(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docrecon <COMMAND>".yellow());
            println!("       docrecon --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<&Path>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn cmd_convert(
    builder: Docrecon,
    inputs: &[PathBuf],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let orchestrator = builder.build()?;
    let jobs: Vec<(PathBuf, PathBuf)> = inputs
        .iter()
        .cloned()
        .zip(output_targets(inputs, &output_dir, "json"))
        .collect();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Converting {} document(s)...", jobs.len()));

    let conversions = orchestrator.convert_batch(&jobs);
    pb.finish_with_message("Done!");

    println!("\n{}", "Results:".green().bold());
    let mut failed = 0;
    for (i, conversion) in conversions.iter().enumerate() {
        let branch = if i + 1 == conversions.len() { "└─" } else { "├─" };
        print_conversion(branch, conversion);
        if !conversion.is_success() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} conversions failed", failed, conversions.len()).into());
    }
    Ok(())
}

/// One output path per input; repeated stems get `_2`, `_3`, ... suffixes.
fn output_targets(inputs: &[PathBuf], output_dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let mut name = format!("{}.{}", stem, extension);
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}_{}.{}", stem, n, extension);
                n += 1;
            }
            output_dir.join(name)
        })
        .collect()
}

fn print_conversion(branch: &str, conversion: &Conversion) {
    let record = &conversion.record;
    let source = record.source.display();
    match (&record.method, &record.output) {
        (Some(method), Some(output)) => {
            println!(
                "  {} {} {} {} ({}/{} pages, {} ms)",
                branch.dimmed(),
                source,
                "->".dimmed(),
                output.display(),
                record.pages_converted,
                record.pages_total,
                record.processing_time_ms
            );
            println!("     {}: {}", "method".bold(), method.as_str().cyan());
            for error in &record.page_errors {
                println!("     {} {}", "warning:".yellow(), error);
            }
        }
        _ => {
            println!(
                "  {} {} {}",
                branch.dimmed(),
                source,
                "failed".red().bold()
            );
            if let Some(diagnostic) = &record.diagnostic {
                println!("     {}", diagnostic.dimmed());
            }
        }
    }
}

fn cmd_normalize(input: Option<&Path>, max_length: usize) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(input)?;
    let normalizer = TextNormalizer::new(NormalizeOptions::default().with_max_length(max_length))?;
    let text = normalizer.normalize(&raw);
    if text.is_empty() {
        eprintln!("{}", "No usable text after normalization".yellow());
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn cmd_fields(input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(input)?;
    let fields = FieldExtractor::new()?.extract(&text);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn cmd_classify(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let layer = LopdfTextReader::new().open(input)?;
    let verdict = ExtractabilityClassifier::new().classify(layer.as_ref());

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    println!("{}", "Text Layer".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), layer.page_count());
    println!("{}: {}", "Sampled".bold(), verdict.sampled_pages);
    println!("{}: {:.1}", "Average length".bold(), verdict.avg_text_length);
    println!("{}: {:.2}", "Meaningful ratio".bold(), verdict.meaningful_page_ratio);
    println!(
        "{}: {}",
        "Extractable".bold(),
        if verdict.extractable {
            "Yes".green()
        } else {
            "No".red()
        }
    );
    Ok(())
}

fn cmd_layout(
    inputs: &[PathBuf],
    source: CanvasSize,
    dest: CanvasSize,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = OcrOptions::default();

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut pages = Vec::with_capacity(inputs.len());
    for input in inputs {
        pb.set_message(input.display().to_string());
        let tokens = read_tokens(input)?;
        let regions = map_tokens(&tokens, source, dest, &options);
        log::info!(
            "{}: {} tokens -> {} regions",
            input.display(),
            tokens.len(),
            regions.len()
        );
        pages.push(serde_json::json!({
            "file": input.display().to_string(),
            "regions": regions,
        }));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let json = if compact {
        serde_json::to_string(&pages)?
    } else {
        serde_json::to_string_pretty(&pages)?
    };
    println!("{}", json);
    Ok(())
}

/// Tokens from a tesseract TSV dump or a JSON token array.
fn read_tokens(input: &Path) -> Result<Vec<Token>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    let is_json = input
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(parse_tsv(&content)?)
    }
}

fn cmd_records(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<ConversionRecord> = JsonLinesRecordStore::new(input).load_records()?;

    println!("{}", "Conversion Records".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let succeeded = records.iter().filter(|r| r.success).count();
    for (i, record) in records.iter().enumerate() {
        let method = record.method.map_or("failed", |m| m.as_str());
        println!(
            "{:>4}  {:<8} {:>5.0}%  {}",
            i + 1,
            method,
            record.success_ratio() * 100.0,
            record.source.display()
        );
    }

    println!();
    println!("{}: {}", "Total".bold(), records.len());
    println!("{}: {}", "Succeeded".bold(), succeeded.to_string().green());
    println!(
        "{}: {}",
        "Failed".bold(),
        (records.len() - succeeded).to_string().red()
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docrecon".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document reconstruction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrecon::RecordStore;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("720x540").unwrap(), CanvasSize::new(720.0, 540.0));
        assert_eq!(parse_canvas("1700X2200").unwrap(), CanvasSize::new(1700.0, 2200.0));
        assert!(parse_canvas("720").is_err());
        assert!(parse_canvas("0x540").is_err());
        assert!(parse_canvas("ax540").is_err());
    }

    #[test]
    fn test_output_targets_unique_for_repeated_stems() {
        let inputs = vec![
            PathBuf::from("a/x.pdf"),
            PathBuf::from("b/x.pdf"),
            PathBuf::from("x_2.pdf"),
            PathBuf::from("c/y.pdf"),
        ];
        let targets = output_targets(&inputs, Path::new("out"), "json");
        assert_eq!(
            targets,
            vec![
                PathBuf::from("out/x.json"),
                PathBuf::from("out/x_2.json"),
                PathBuf::from("out/x_2_2.json"),
                PathBuf::from("out/y.json"),
            ]
        );
    }

    #[test]
    fn test_read_tokens_tsv_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let tsv = dir.path().join("page.tsv");
        fs::write(
            &tsv,
            "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
             5\t1\t1\t1\t1\t1\t100\t200\t300\t40\t91.5\t안내\n",
        )
        .unwrap();
        let tokens = read_tokens(&tsv).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "안내");
        assert_eq!(tokens[0].confidence, 91.5);

        let json = dir.path().join("page.json");
        fs::write(&json, serde_json::to_string(&tokens).unwrap()).unwrap();
        assert_eq!(read_tokens(&json).unwrap(), tokens);

        fs::write(&tsv, "5\t1\t1").unwrap();
        assert!(read_tokens(&tsv).is_err());
    }

    #[test]
    fn test_text_commands_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notice.txt");
        fs::write(&input, "회의 일정은 다음 주 월요일로 변경되었습니다\n문서번호: ADM-2024-17").unwrap();

        assert!(cmd_normalize(Some(input.as_path()), 600).is_ok());
        assert!(cmd_fields(Some(input.as_path())).is_ok());
        assert!(cmd_normalize(Some(dir.path().join("missing.txt").as_path()), 600).is_err());
    }

    #[test]
    fn test_records_command_reads_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("records.jsonl");
        let store = JsonLinesRecordStore::new(&log);
        store
            .save_record(&ConversionRecord::failed(
                PathBuf::from("scan.pdf"),
                "render failed".to_string(),
                5,
            ))
            .unwrap();

        assert!(cmd_records(&log).is_ok());

        fs::write(&log, "not json\n").unwrap();
        assert!(cmd_records(&log).is_err());
    }

    #[test]
    fn test_convert_failure_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let builder = Docrecon::new()
            .with_pdftoppm_binary("/nonexistent/pdftoppm")
            .with_tesseract_binary("/nonexistent/tesseract")
            .sequential();
        let inputs = vec![dir.path().join("a/x.pdf"), dir.path().join("b/x.pdf")];

        assert!(cmd_convert(builder, &inputs, Some(out.as_path())).is_err());
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }
}
