//! Print the cohomology of the BGG complex of a module.
//!
//! ```bash
//! # A module from bgg_modules/, over the root system given in the file
//! bgg exterior_u
//!
//! # The same module over A3, degree 2 only, checking that d ∘ d = 0 first
//! bgg exterior_u@A3 --degree 2 --verify
//!
//! # A module file anywhere
//! bgg path/to/module.json
//! ```

use std::path::Path;

use anyhow::Context;
use bgg::utils::{construct, format_cohomology, init_logging, Config};
use clap::Parser;

const BOLD_ANSI_CODE: &str = "\x1b[1m";
const WHITE_ANSI_CODE: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "bgg", version, about = "Cohomology of BGG complexes of composite modules")]
struct Args {
    /// A module file, or the name of a module in `bgg_modules`, optionally followed by
    /// `@root_system`.
    module: String,

    /// Only compute this degree.
    #[arg(long, short)]
    degree: Option<usize>,

    /// Check that the differentials square to zero before computing cohomology.
    #[arg(long, default_value_t = false)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let config = if Path::new(&args.module).is_file() {
        Config::from_path(&args.module)?
    } else {
        Config::try_from(args.module.as_str())?
    };
    let cohomology = construct(config)?;

    if args.verify {
        cohomology
            .check_all()
            .context("The BGG complex does not square to zero")?;
        tracing::info!("verified d ∘ d = 0");
    }

    let degrees = match args.degree {
        Some(degree) => degree..=degree,
        None => 0..=cohomology.graph().max_length(),
    };
    for degree in degrees {
        let result = cohomology.cohomology(degree)?;
        println!(
            "{BOLD_ANSI_CODE}{}{WHITE_ANSI_CODE}",
            format_cohomology(degree, &result)
        );
    }
    Ok(())
}
