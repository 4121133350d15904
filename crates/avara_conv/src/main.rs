use avara_utils::{ok, AnyResult};
use clap::Parser;

fn main() -> AnyResult {
    let cli = avara_conv::Cli::parse_from(wild::args());

    let mut logger = pretty_env_logger::formatted_builder();
    logger
        .format_indent(None)
        .format_timestamp(None)
        .filter_level(cli.log_level());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    avara_conv::run(cli)?;
    ok()
}
