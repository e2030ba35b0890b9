use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::ValueEnum;
use gridfill::parse::{load_structure, load_word_list};
use gridfill::render::render_grid;
use gridfill::{
    find_fill, Assignment, FillFailure, FillOptions, GridFillError, GridFillResult, Propagation,
    ValueOrdering,
};
use instant::Duration;
use log::{error, info, LevelFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueOrderingArg {
    /// Try words in the order they appear in the word list.
    Vocabulary,
    /// Try words alphabetically.
    Lexicographic,
    /// Try words that rule out the fewest crossing options first.
    LeastConstraining,
}

impl From<ValueOrderingArg> for ValueOrdering {
    fn from(arg: ValueOrderingArg) -> ValueOrdering {
        match arg {
            ValueOrderingArg::Vocabulary => ValueOrdering::VocabularyOrder,
            ValueOrderingArg::Lexicographic => ValueOrdering::Lexicographic,
            ValueOrderingArg::LeastConstraining => ValueOrdering::LeastConstraining,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The grid structure: one line per row, `_` for letter cells and `#` for blocks.
    structure: PathBuf,

    /// The word list, one word per line.
    words: PathBuf,

    /// Where to write the rendered fill, if one is found.
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ValueOrderingArg::Lexicographic)]
    value_ordering: ValueOrderingArg,

    /// Only check each tentative assignment against the words already placed, without
    /// re-establishing arc consistency.
    #[arg(long)]
    no_propagation: bool,

    /// Give up after this many milliseconds of search.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log progress and search statistics.
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> GridFillResult<()> {
    let config = load_structure(&args.structure)?;
    let word_list = load_word_list(&args.words)?;

    let options = FillOptions {
        value_ordering: args.value_ordering.into(),
        propagation: if args.no_propagation {
            Propagation::CheckOnly
        } else {
            Propagation::MaintainArcConsistency
        },
        timeout: args.timeout_ms.map(Duration::from_millis),
    };

    let result = match find_fill(&config, &word_list, &options, None) {
        Ok(result) => result,
        Err(FillFailure::HardFailure) => {
            println!("No solution.");
            return Ok(());
        }
        Err(FillFailure::Timeout) => {
            println!("No solution found within the time limit.");
            return Ok(());
        }
        Err(FillFailure::Abort) => {
            println!("Search aborted.");
            return Ok(());
        }
    };

    info!("{:?}", result.statistics);
    let assignment = Assignment::from_choices(&config, &word_list, &result.choices);
    let display_grid = render_grid(&config, &assignment);
    println!("{}", display_grid);

    if let Some(output) = &args.output {
        fs::write(output, format!("{display_grid}\n"))
            .map_err(|err| GridFillError::FileWritingError(err, output.display().to_string()))?;
        info!("Wrote fill to {}", output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level_filter = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level_filter)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
