use std::fs;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use lfm_bop::types::{BopData, CarClass, CarModelId};
use lfm_bop::utils::{BopFilter, BopStats};
use lfm_bop::{BopExtractor, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "lfm-bop")]
#[command(about = "A lowfuelmotorsport.com BoP scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the live BoP page (launches a headless browser) and write the combined dataset
    Scrape {
        #[arg(
            short = 'o',
            long = "output",
            default_value = "dist/bop.json",
            help = "Path of the JSON file to write"
        )]
        output: PathBuf,

        #[arg(
            long,
            value_parser = parse_car_class,
            help = "Scrape only this class"
        )]
        class: Option<CarClass>,

        #[arg(long, help = "Keep only entries for this track slug")]
        track: Option<String>,

        #[arg(long, help = "Keep only entries for this car model id")]
        car_model: Option<CarModelId>,

        #[arg(long, help = "Maximum number of entries to keep")]
        limit: Option<usize>,

        #[arg(long, help = "Number of entries to skip from the beginning")]
        offset: Option<usize>,
    },
    /// Extract BoP entries from an already captured HTML file
    Parse {
        #[arg(help = "Path of the HTML file to parse")]
        path: PathBuf,

        #[arg(
            long = "class-filter",
            help = "Keep only rows whose class column contains this substring"
        )]
        class_filter: Option<String>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long, help = "Keep only entries for this track slug")]
        track: Option<String>,

        #[arg(long, help = "Keep only entries for this car model id")]
        car_model: Option<CarModelId>,

        #[arg(long, help = "Maximum number of entries to keep")]
        limit: Option<usize>,

        #[arg(long, help = "Number of entries to skip from the beginning")]
        offset: Option<usize>,
    },
}

fn parse_car_class(s: &str) -> Result<CarClass, String> {
    CarClass::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn validated_filter(filter: BopFilter) -> BopFilter {
    filter.validate().unwrap_or_else(|e| {
        log::error!("Invalid args: {e}");
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Scrape {
            output,
            class,
            track,
            car_model,
            limit,
            offset,
        } => {
            let filter = validated_filter(BopFilter {
                track,
                car_model,
                limit,
                offset,
            });

            log::info!("Launching headless browser...");
            let scraper = WebScraper::launch().await.unwrap_or_else(|e| {
                log::error!("Error launching browser: {}", e);
                process::exit(1);
            });

            log::info!("Loading https://lowfuelmotorsport.com/seasonsv2/bop ...");
            let pages = scraper.fetch_bop_pages().await.unwrap_or_else(|e| {
                log::error!("Error fetching BoP page: {}", e);
                process::exit(1);
            });

            if let Err(e) = scraper.close().await {
                log::warn!("Failed to close browser: {}", e);
            }

            let extractor = BopExtractor::builtin();
            let mut gt3_entries = Vec::new();
            let mut gt4_entries = Vec::new();
            for (captured, html) in &pages {
                if let Some(only) = class
                    && *captured != only
                {
                    continue;
                }
                let run = extractor.extract(html, captured.class_filter());
                for warning in &run.warnings {
                    log::warn!("[{captured}] {warning}");
                }
                match captured {
                    CarClass::Gt3 => gt3_entries = run.entries,
                    CarClass::Gt4 => gt4_entries = run.entries,
                }
            }

            let stats = BopStats::from_class_runs(&gt3_entries, &gt4_entries);
            log::info!(
                "Found {} GT3, {} GT4 = {} total",
                stats.gt3,
                stats.gt4,
                stats.total
            );

            let mut entries = gt3_entries;
            entries.extend(gt4_entries);
            let entries = filter.apply(entries);
            let data = BopData { entries };

            if let Some(parent) = output.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).unwrap_or_else(|e| {
                    log::error!("Error creating {}: {}", parent.display(), e);
                    process::exit(1);
                });
            }

            let json = serde_json::to_string_pretty(&data).unwrap_or_else(|e| {
                log::error!("Error serializing to JSON: {}", e);
                process::exit(1);
            });
            fs::write(&output, json).unwrap_or_else(|e| {
                log::error!("Error writing {}: {}", output.display(), e);
                process::exit(1);
            });

            log::info!("Wrote {} entries to {}", data.entries.len(), output.display());
        }

        Commands::Parse {
            path,
            class_filter,
            format,
            track,
            car_model,
            limit,
            offset,
        } => {
            let filter = validated_filter(BopFilter {
                track,
                car_model,
                limit,
                offset,
            });

            let html = fs::read_to_string(&path).unwrap_or_else(|e| {
                log::error!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            });

            let run = BopExtractor::builtin().extract(&html, class_filter.as_deref());
            for warning in &run.warnings {
                log::warn!("{warning}");
            }

            let entries = filter.apply(run.entries);

            match format {
                OutputFormat::Json => serialize_json(&BopData { entries }),
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No entries to display.");
                    } else {
                        for (i, entry) in entries.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, entry);
                        }
                    }
                }
            }
        }
    }
}
