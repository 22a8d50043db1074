use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

const NAME: &str = "calculi";

const ABOUT: &str = "
calculi is an interactive proof-state engine for resolution, tableaux and sequent calculi.
The system reads JSON-lines requests and writes one JSON response per request on stdout.
Each request names a calculus and an action: parse, move or close.
";

#[derive(StructOpt)]
#[structopt(name = NAME, author, about = ABOUT)]
pub(crate) struct Options {
    #[structopt(
        parse(from_os_str),
        help = "path to request file (default: stdin)"
    )]
    pub(crate) path: Option<PathBuf>,

    #[structopt(long, help = "number of worker threads", default_value = "1")]
    pub(crate) jobs: usize,

    #[structopt(
        long,
        help = "log verbosity, written to stderr",
        possible_values = &["off", "error", "warn", "info", "debug", "trace"],
        default_value = "warn"
    )]
    pub(crate) log_level: LevelFilter,

    #[structopt(long, help = "list supported calculi and exit")]
    pub(crate) list: bool,
}

impl Options {
    pub(crate) fn parse() -> Self {
        Self::from_args()
    }
}
