#[macro_use]
extern crate log;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::exit;

use getopts::Options;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use mavgis::condition::Condition;
use mavgis::dataflash::DataFlashReader;
use mavgis::dispatcher::Dispatcher;
use mavgis::error::{ConvertError, Result};
use mavgis::geojson_converter::{GeoJsonConverter, DATAFLASH_AUXILIARY_TYPES, DATAFLASH_POSITION_TYPE};
use mavgis::kml_converter::{KmlConverter, KmlOptions, DEFAULT_POSITION_SOURCE};
use mavgis::track_segmenter::TrackOptions;


#[derive(Clone, Copy, Debug, PartialEq)]
enum Format {
    Kml,
    GeoJson,
}


/**
 * Everything the command line configures.
 */
#[derive(Debug)]
struct ConvertOptions {
    format: Format,
    source: Option<String>,
    auxiliary: Vec<String>,
    output: Option<String>,
    condition: Option<String>,
    waypoints: bool,
    color_by_mode: bool,
    extrude: bool,
    track_color: Option<String>,
    level: LevelFilter,
    logfiles: Vec<String>,
}


fn main() {
    let options = match handle_opts() {
        Ok(Some(options)) => options,
        Ok(None) => return,
        Err(e) => {
            eprintln!("{}", e);
            exit(2);
        },
    };

    let config = ConfigBuilder::new().set_location_level(LevelFilter::Debug).build();
    if let Err(e) = TermLogger::init(options.level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Unable to initialize logger: {}", e);
    }

    if let Err(e) = run(&options) {
        error!("{}", e);
        exit(1);
    }
}


fn run(options: &ConvertOptions) -> Result<()> {
    let condition = match options.condition {
        Some(ref text) => Some(Condition::parse(text)?),
        None => None,
    };
    // Fail on an unwritable output before spending time on the logs
    let mut out = open_output(&options.output)?;
    if options.logfiles.is_empty() {
        warn!("no log files given, output will be empty");
    }

    match options.format {
        Format::Kml => {
            let mut converter = KmlConverter::new(KmlOptions {
                source: options.source.clone().unwrap_or_else(|| DEFAULT_POSITION_SOURCE.to_string()),
                track: TrackOptions {
                    extrude: options.extrude,
                    color_by_mode: options.color_by_mode,
                    color: options.track_color.clone(),
                },
                extract_waypoints: options.waypoints,
            });
            let dispatcher = Dispatcher::for_converter(&converter, condition);
            for logfile in &options.logfiles {
                let mut reader = DataFlashReader::open(logfile)?;
                dispatcher.run(&mut converter, &mut reader, logfile)?;
            }
            out.write_all(&converter.serialize())?;
            out.flush()?;
        },
        Format::GeoJson => {
            let position_type = options.source.clone().unwrap_or_else(|| DATAFLASH_POSITION_TYPE.to_string());
            let mut converter = GeoJsonConverter::new(out, &position_type, &options.auxiliary)?;
            let dispatcher = Dispatcher::for_converter(&converter, condition);
            for logfile in &options.logfiles {
                let mut reader = DataFlashReader::open(logfile)?;
                dispatcher.run(&mut converter, &mut reader, logfile)?;
            }
            info!("wrote {} features", converter.feature_count());
            converter.close()?;
        },
    }
    Ok(())
}


fn open_output(path: &Option<String>) -> Result<Box<dyn Write>> {
    match *path {
        Some(ref path) => match File::create(path) {
            Ok(file) => Ok(Box::new(BufWriter::new(file))),
            Err(e) => Err(ConvertError::Open { path: path.clone(), source: e }),
        },
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}


/**
 * Parses the command line. Returns `None` if there is nothing left to do,
 * e.g. after printing help.
 */
fn handle_opts() -> Result<Option<ConvertOptions>> {
    let mut opts = Options::new();
    opts.optopt("f", "format", "Output format, kml or geojson (defaults to kml).", "FORMAT");
    opts.optopt(
        "s",
        "source",
        &format!(
            "Message type for position information (defaults to {} for kml, {} for geojson).",
            DEFAULT_POSITION_SOURCE,
            DATAFLASH_POSITION_TYPE),
        "TYPE");
    opts.optopt(
        "a",
        "aux",
        &format!(
            "Comma separated message types merged into each geojson point (defaults to {}).",
            DATAFLASH_AUXILIARY_TYPES.join(",")),
        "TYPES");
    opts.optopt("o", "output", "Write output to the named file (defaults to stdout).", "FILE");
    opts.optopt("c", "condition", "Filter messages on CONDITION.", "CONDITION");
    opts.optflag("w", "waypoints", "Extract waypoints from the log.");
    opts.optflag("k", "color-by-mode", "Color tracks by mode.");
    opts.optflag("e", "extrude", "Extend tracks to the ground.");
    opts.optopt("t", "track-color", "Color every track AABBGGRR.", "COLOR");
    opts.optflag("q", "quiet", "Only print warnings and errors.");
    opts.optflag("d", "debug", "Prints extra logging.");
    opts.optflag("h", "help", "Print this help menu.");

    let mut args = std::env::args();
    args.next();  // Skip the program name
    let matches = match opts.parse(args) {
        Ok(m) => m,
        Err(e) => return Err(ConvertError::Usage(format!("Unable to parse options: {}", e))),
    };
    if matches.opt_present("h") {
        print_usage(&opts);
        return Ok(None);
    }

    let format = match matches.opt_str("f").as_ref().map(|s| s.as_str()) {
        None | Some("kml") => Format::Kml,
        Some("geojson") | Some("json") => Format::GeoJson,
        Some(other) => return Err(ConvertError::Usage(format!("Unknown format: {}", other))),
    };

    let auxiliary = match matches.opt_str("a") {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DATAFLASH_AUXILIARY_TYPES.iter().map(|s| s.to_string()).collect(),
    };

    let track_color = matches.opt_str("t");
    if let Some(ref color) = track_color {
        if color.len() != 8 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConvertError::Usage(format!("Track color must be AABBGGRR hex: {}", color)));
        }
    }

    let level = if matches.opt_present("d") {
            LevelFilter::Debug
        } else if matches.opt_present("q") {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        };

    Ok(Some(ConvertOptions {
        format,
        source: matches.opt_str("s"),
        auxiliary,
        output: matches.opt_str("o"),
        condition: matches.opt_str("c"),
        waypoints: matches.opt_present("w"),
        color_by_mode: matches.opt_present("k"),
        extrude: matches.opt_present("e"),
        track_color: track_color.map(|c| c.to_lowercase()),
        level,
        logfiles: matches.free.clone(),
    }))
}


fn print_usage(opts: &Options) {
    let brief = "Usage: mavgis [options] LOGFILE...";
    print!("{}", opts.usage(brief));
}
