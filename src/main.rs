mod options;

use calculi::io::log::start_logging;
use calculi::io::{batch, exit};
use calculi::statistics::Statistics;
use log::error;
use options::Options;
use std::io::Write;

fn main() {
    let options = Options::parse();
    start_logging(options.log_level);

    if options.list {
        for identifier in calculi::calculi::IDENTIFIERS {
            println!("{}", identifier);
        }
        exit::success()
    }

    let requests = batch::read_requests(options.path.as_deref())
        .unwrap_or_else(|err| {
            error!("failed to read requests: {}", err);
            exit::failure()
        });

    let statistics = Statistics::default();
    let responses = batch::process(&requests, options.jobs, &statistics);

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for response in responses {
        if let Err(err) = writeln!(stdout, "{}", response) {
            error!("failed to write response: {}", err);
            exit::failure()
        }
    }
    statistics.record();
    exit::finish(&statistics)
}
