use clap::{App, Arg, ArgMatches};
use slidenav::build::build_site;
use slidenav::config::Config;
use std::error::Error;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("slidenav")
        .version(clap::crate_version!())
        .about("Links a directory of HTML slides and builds an index page")
        .arg(
            Arg::with_name("directory")
                .help("The directory holding the slides")
                .index(1)
                .default_value("."),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("The project file (default: DIRECTORY/slidenav.yaml, if present)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Logs more detail; repeat for more"),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    // `directory` has a default value so it's always present.
    let directory = Path::new(matches.value_of("directory").unwrap_or("."));
    let config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(directory, Path::new(path))?,
        None => Config::from_directory(directory)?,
    };

    let report = build_site(&config)?;
    info!(
        linked = report.linked.len(),
        skipped = report.skipped.len(),
        "created {} and linked all slides",
        report.index.display()
    );
    Ok(())
}

// `RUST_LOG` wins when it's set; otherwise `-v` raises the level from `info`.
fn init_logging(verbosity: u64) {
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
