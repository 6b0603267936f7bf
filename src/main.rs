use anyhow::Result;
use std::time;
use vcx::{
    cli::{parse_cli, init_verbose, Command, FULL_VERSION},
    commands::check,
    utils::util::handle_error_and_exit,
};

fn runner() -> Result<bool> {
    let cli = parse_cli();
    init_verbose(&cli);
    log::trace!("CLI options set: {:?}", cli);

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        cli.command.name()
    );

    let start_timer = time::Instant::now();
    let valid = match cli.command {
        Command::Check(args) => {
            log::trace!("Check arguments: {:#?}", args);
            let summary = check(args)?;
            log::info!(
                "Validation finished: {} error(s), {} warning(s)",
                summary.errors,
                summary.warnings
            );
            summary.is_valid()
        }
    };
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());

    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(valid)
}

fn main() {
    match runner() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => handle_error_and_exit(e),
    }
}
