use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ef_extract::classify::EfMode;
use ef_extract::config::{ColumnConfig, PipelineConfig};
use ef_extract::data::filter::RecordFilter;
use ef_extract::data::model::NoteDataset;
use ef_extract::data::{loader, writer};
use ef_extract::nlp::{PatternMatcher, PatternSet};
use ef_extract::pipeline::{self, Pipeline, Summary};
use ef_extract::prompt;

#[derive(Parser)]
#[command(name = "ef-extract", version, about = "Extract ejection fraction values and methods from clinical notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalise notes, match phrase patterns, classify methods and extract values
    Run(RunArgs),
    /// Re-run method and value extraction on a previously saved dataset
    Reclassify(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Notes table (.csv, .json or .parquet)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to save the enriched dataset (.csv or .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep only notes mentioning this ejection fraction
    #[arg(long, value_enum)]
    require_ef: Option<EfMode>,

    /// Save without asking
    #[arg(short, long, conflicts_with = "discard")]
    yes: bool,

    /// Discard results without asking
    #[arg(long)]
    discard: bool,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Token pattern file
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Drop notes without any pattern mention
    #[arg(long)]
    drop_unmatched: bool,
}

impl CommonArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load_or_default(self.config.as_deref())?;
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if self.require_ef.is_some() {
            config.require_ef = self.require_ef;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let (dataset, config, common) = match &cli.command {
        Command::Run(args) => {
            let mut config = args.common.config()?;
            if let Some(patterns) = &args.patterns {
                config.patterns = patterns.clone();
            }
            config.drop_unmatched |= args.drop_unmatched;
            (run(&args.common, &config)?, config, &args.common)
        }
        Command::Reclassify(common) => {
            let config = common.config()?;
            (reclassify(common, &config)?, config, common)
        }
    };

    println!("{}", Summary::of(&dataset));
    save_or_discard(&dataset, &config, common)
}

fn run(args: &CommonArgs, config: &PipelineConfig) -> Result<NoteDataset> {
    // Patterns first: a bad pattern file must fail before any note is read.
    let patterns = PatternSet::from_path(&config.patterns)
        .with_context(|| format!("loading patterns from {}", config.patterns.display()))?;
    log::info!(
        "loaded {} patterns: {}",
        patterns.len(),
        patterns.names().collect::<Vec<_>>().join(", ")
    );

    let dataset = loader::load_file(&args.input, &config.columns)?;
    let filter = RecordFilter {
        require_mentions: config.drop_unmatched,
        require_ef: config.require_ef,
    };
    Ok(Pipeline::new(PatternMatcher::new(patterns))
        .with_filter(filter)
        .run(dataset))
}

fn reclassify(args: &CommonArgs, config: &PipelineConfig) -> Result<NoteDataset> {
    let mut columns = config.columns.clone();
    if columns.mentions.is_none() {
        let saved = ColumnConfig::saved_dataset();
        columns.text = saved.text;
        columns.mentions = saved.mentions;
    }
    let dataset = loader::load_file(&args.input, &columns)?;
    let filter = RecordFilter {
        require_mentions: false,
        require_ef: config.require_ef,
    };
    Ok(pipeline::reclassify(dataset, &filter))
}

fn save_or_discard(dataset: &NoteDataset, config: &PipelineConfig, args: &CommonArgs) -> Result<()> {
    let save = if args.yes {
        true
    } else if args.discard {
        false
    } else {
        prompt::confirm_save(&mut io::stdin().lock(), &mut io::stdout())
            .context("reading answer")?
    };

    if save {
        writer::write_file(&config.output, dataset)?;
        println!("Saved {} records to {}", dataset.len(), config.output.display());
    } else {
        println!("{}", prompt::DISCARD_MESSAGE);
    }
    Ok(())
}
