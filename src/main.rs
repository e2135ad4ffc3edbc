use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    assets: Option<PathBuf>,
    no_audio: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = folio::logging::init_logging() {
        eprintln!("logging disabled: {err:#}");
    }

    folio::app::run(folio::app::AppOptions {
        asset_root: folio::config::asset_root(args.assets.as_deref()),
        force_silent: args.no_audio,
    })
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--no-audio" => out.no_audio = true,
            "--assets" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--assets requires a directory");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--assets cannot be empty");
                }
                out.assets = Some(PathBuf::from(value.trim()));
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("folio");
    println!("  --assets <dir>    Asset directory (default: $FOLIO_ASSET_DIR or ./assets)");
    println!("  --no-audio        Run with the silent playback engine");
}
