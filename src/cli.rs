use crate::{constants::*, utils::util::Result};
use anyhow::anyhow;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

/// Full version string shown by the command-line interface.
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| env!("CARGO_PKG_VERSION").to_string());

#[derive(Parser, Debug)]
#[command(name="vcx",
          author="Tom Mokveld <tmokveld@pacificbiosciences.com>",
          version=&**FULL_VERSION,
          about="VCF validator",
          long_about = None,
          help_template = "{name} {version}\n{author}{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Check(CheckArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Check(_) => "check",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["vcfs", "vcf_list"]),
))]
#[command(arg_required_else_help(true))]
pub struct CheckArgs {
    /// VCF files to validate
    #[arg(
        long = "vcf",
        value_name = "VCF",
        num_args = 1..,
        value_parser = check_file_exists
    )]
    pub vcfs: Option<Vec<PathBuf>>,

    /// File containing paths of VCF files to validate (one per line)
    #[arg(
        long = "vcf-list",
        value_name = "VCF_LIST",
        value_parser = check_file_exists
    )]
    pub vcf_list: Option<PathBuf>,

    /// Write the report to a file [default: standard output]
    #[arg(
        short = 'o',
        long = "report",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub report: Option<String>,

    /// Expected ploidy for contigs without an override
    #[arg(
        long = "ploidy",
        value_name = "PLOIDY",
        default_value_t = DEFAULT_PLOIDY,
        value_parser = ploidy_in_range
    )]
    pub ploidy: u32,

    /// Per-contig ploidy overrides (comma-separated list), e.g., (Y=1,MT=1)
    #[arg(
        long = "ploidy-contig",
        value_name = "CONTIG=PLOIDY",
        value_delimiter = ',',
        value_parser = parse_ploidy_override,
        help_heading = "Advanced"
    )]
    pub ploidy_contigs: Vec<(String, u32)>,

    /// Treat a ploidy mismatch against the configured ploidy as an error
    #[arg(long = "strict-ploidy", help_heading = "Advanced")]
    pub strict_ploidy: bool,
}

impl CheckArgs {
    pub fn process_vcf_paths(&self) -> Result<Vec<PathBuf>> {
        match (&self.vcfs, &self.vcf_list) {
            (Some(vcfs), None) => Ok(vcfs.clone()),
            (None, Some(list_path)) => Self::read_vcf_paths_from_file(list_path),
            _ => unreachable!("Either --vcf or --vcf-list is provided, never both"),
        }
    }

    pub fn ploidy_overrides(&self) -> HashMap<String, u32> {
        self.ploidy_contigs.iter().cloned().collect()
    }

    fn read_vcf_paths_from_file(path: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(path)
            .map_err(|e| crate::vcx_error!("Failed to open VCF list file {}: {}", path.display(), e))?;
        let reader = BufReader::new(file);

        let mut paths = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| crate::vcx_error!("Error reading line {}: {}", line_num + 1, e))?;
            let trimmed = line.trim();
            // Skip empty or comment lines
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let path = PathBuf::from(trimmed);
            if !path.exists() {
                Err(crate::vcx_error!("VCF file does not exist: {}", path.display()))?;
            }
            paths.push(path);
        }

        if paths.is_empty() {
            Err(crate::vcx_error!("No VCF paths found in the input file"))?;
        }

        Ok(paths)
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// Sets up the logger with a specific verbosity level that is determined
/// by the number of occurrences of the `-v` or `--verbose` flag in the command-line arguments.
///
/// # Arguments
///
/// * `args` - A reference to the parsed command-line arguments.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

/// Validates that the provided string represents a valid ploidy.
///
/// # Arguments
///
/// * `s` - A string slice representing the ploidy.
///
/// # Returns
///
/// Returns an `anyhow::Result<u32>` which is Ok if the ploidy is valid, or an Err with a descriptive message if not.
fn ploidy_in_range(s: &str) -> anyhow::Result<u32> {
    let ploidy: u32 = s
        .parse::<u32>()
        .map_err(|_| anyhow!("`{}` is not a valid ploidy", s))?;
    if ploidy == 0 {
        return Err(anyhow!("Ploidy must be >= 1"));
    }
    Ok(ploidy)
}

fn parse_ploidy_override(s: &str) -> anyhow::Result<(String, u32)> {
    let (contig, ploidy) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Ploidy override must be in 'contig=ploidy' format: '{}'", s))?;
    if contig.is_empty() {
        return Err(anyhow!("Ploidy override has an empty contig name: '{}'", s));
    }
    Ok((contig.to_string(), ploidy_in_range(ploidy)?))
}

/// Checks if the provided file path exists.
///
/// # Arguments
///
/// * `s` - A string slice representing the file path to check.
///
/// # Returns
///
/// Returns an `anyhow::Result<PathBuf>` which is Ok if the file exists, or an Err with a descriptive message if not.
fn check_file_exists(s: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> anyhow::Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}
