//! Convert journal map JSON (lines of lat/lng polylines) into a GPX track

use clap::Parser;
use gpx_map_lib::MapData;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Map data JSON file
    input: PathBuf,

    /// Output GPX file (stdout when omitted)
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> gpx_map_lib::Result<()> {
    let json = std::fs::read_to_string(&args.input)?;
    let data = MapData::from_json(&json)?;

    match data.map_id() {
        Some(id) => tracing::info!("Converting map {id} from {}", args.input.display()),
        None => tracing::info!("Converting {}", args.input.display()),
    }

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            data.write_gpx(std::io::BufWriter::new(file))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            data.write_gpx(&mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() {
    gpx_map_viewer::entrypoints::logging::setup_logging();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!("Conversion failed: {err}");
        std::process::exit(1);
    }
}
