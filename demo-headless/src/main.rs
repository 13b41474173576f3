//! Headless fire-growth demo
//!
//! Runs one simulation from command-line weather and prints each frame as a
//! JSON line, ready to pipe into a map viewer or `jq`.

use clap::Parser;
use fire_growth_core::{
    simulate, FbpOptions, FuelCode, FwiOverrides, SimulationConfig, Weather,
};

#[derive(Parser, Debug)]
#[command(name = "demo-headless")]
#[command(about = "Headless FBP fire-growth simulation", long_about = None)]
struct Args {
    /// FBP fuel type code (C1..C7, D1, D2, M1..M4, O1a, O1b, S1..S3)
    #[arg(short, long, default_value = "C2")]
    fuel: String,

    /// Ignition latitude (degrees)
    #[arg(long, default_value_t = 51.0)]
    lat: f64,

    /// Ignition longitude (degrees)
    #[arg(long, default_value_t = -114.0)]
    lng: f64,

    /// 10 m wind speed (km/h)
    #[arg(short = 'w', long, default_value_t = 20.0)]
    wind_speed: f64,

    /// Wind direction, blowing from (degrees)
    #[arg(short = 'd', long, default_value_t = 270.0)]
    wind_dir: f64,

    /// Air temperature (°C)
    #[arg(short, long, default_value_t = 20.0)]
    temp: f64,

    /// Relative humidity (%)
    #[arg(short, long, default_value_t = 30.0)]
    rh: f64,

    /// 24-hour precipitation (mm)
    #[arg(long, default_value_t = 0.0)]
    precip: f64,

    /// Run duration (hours)
    #[arg(long, default_value_t = 4.0)]
    duration: f64,

    /// Snapshot interval (minutes)
    #[arg(long, default_value_t = 30.0)]
    interval: f64,

    /// Terrain slope (percent rise)
    #[arg(long)]
    slope: Option<f64>,

    /// Aspect: azimuth of steepest descent (degrees)
    #[arg(long)]
    aspect: Option<f64>,

    /// FFMC override
    #[arg(long)]
    ffmc: Option<f64>,

    /// DMC override
    #[arg(long)]
    dmc: Option<f64>,

    /// DC override
    #[arg(long)]
    dc: Option<f64>,

    /// Degree of grass curing for O1 fuels (%)
    #[arg(long)]
    curing: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let fuel_type: FuelCode = match args.fuel.parse() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let mut fbp_options = FbpOptions::default();
    if let Some(curing) = args.curing {
        fbp_options.grass_curing = curing;
    }

    let config = SimulationConfig {
        ignition_lat: args.lat,
        ignition_lng: args.lng,
        weather: Weather {
            wind_speed: args.wind_speed,
            wind_direction: args.wind_dir,
            temperature: args.temp,
            relative_humidity: args.rh,
            precipitation_24h: args.precip,
        },
        fwi_overrides: Some(FwiOverrides {
            ffmc: args.ffmc,
            dmc: args.dmc,
            dc: args.dc,
            ..FwiOverrides::default()
        }),
        fuel_type,
        duration_hours: args.duration,
        snapshot_interval_minutes: args.interval,
        slope_pct: args.slope,
        aspect_deg: args.aspect,
        fbp_options,
    };

    let sim = match simulate(config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    for frame in sim {
        match frame {
            Ok(frame) => match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    eprintln!("error: failed to serialise frame: {err}");
                    std::process::exit(1);
                }
            },
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }
}
