use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

/// Target triple the binary was compiled for.
pub const BUILD_TARGET: &str = env!("OSISIM_BUILD_TARGET");

/// `--version` text: crate version plus build target.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OSISIM_BUILD_TARGET"),
    ")"
);

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("osisim {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: osisim");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("build_target: {BUILD_TARGET}");
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("framing: char-counting, byte-flag, bits-flag");
    println!("detection: parity, crc; correction: hamming");
    println!("modulation: nrz, bipolar, manchester, ask, fsk, psk, qam8");

    Ok(SUCCESS)
}
