use crate::cmd::{resolve_config, ConfigArgs};
use crate::exit::{pipeline_error, CliResult, SUCCESS};

/// Print the configuration a `run` with the same options would use.
pub fn run(args: ConfigArgs) -> CliResult<i32> {
    let config = resolve_config(args.config.as_deref(), &args.link, Some(&args.phy))?;
    let json = config
        .to_json_pretty()
        .map_err(|err| pipeline_error("failed to serialize configuration", err))?;
    println!("{json}");
    Ok(SUCCESS)
}
