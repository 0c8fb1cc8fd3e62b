use clap::{Parser, Subcommand, ValueEnum};
use prp_core::request::{PPP_CONCENTRATION, PRP_CONCENTRATION, PRP_YIELD, THROMBOCYTES};
use prp_core::*;
use serde_json::{Map, Value};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "prp")]
#[command(about = "Platelet-rich plasma dosage calculator", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a dosing plan for the built-in zones
    Calculate {
        /// Patient blood platelet count (G/L)
        #[arg(long, allow_negative_numbers = true)]
        thrombocytes: Option<f64>,

        /// PRP volume extracted per tube (ml)
        #[arg(long, allow_negative_numbers = true)]
        prp_yield: Option<f64>,

        /// PRP concentration multiplier over baseline
        #[arg(long, allow_negative_numbers = true)]
        prp_concentration: Option<f64>,

        /// PPP concentration multiplier over baseline
        #[arg(long, allow_negative_numbers = true)]
        ppp_concentration: Option<f64>,

        /// Read a JSON request body from a file ('-' for stdin); flags override its keys
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Report service health
    Health,

    /// List the built-in treatment zones
    Zones,

    /// Describe the operations and request fields, with active defaults
    Info,

    /// Write a config file with the built-in defaults
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.verbose {
        prp_core::logging::init_with_level("debug");
    } else {
        prp_core::logging::init();
    }

    // init-config writes the file the other commands read
    let config = match (&cli.command, &cli.config) {
        (Commands::InitConfig { .. }, _) => Config::default(),
        (_, Some(path)) => Config::load_from(path)?,
        (_, None) => Config::load()?,
    };

    match cli.command {
        Commands::Calculate {
            thrombocytes,
            prp_yield,
            prp_concentration,
            ppp_concentration,
            input,
            format,
            pretty,
        } => {
            let flags = [
                (THROMBOCYTES, thrombocytes),
                (PRP_YIELD, prp_yield),
                (PRP_CONCENTRATION, prp_concentration),
                (PPP_CONCENTRATION, ppp_concentration),
            ];
            cmd_calculate(
                input.as_deref(),
                &flags,
                format,
                pretty || config.output.pretty,
                &config,
            )
        }
        Commands::Health => {
            print_json(&serde_json::to_value(response::health())?, config.output.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Zones => {
            print_json(&serde_json::to_value(ZONES)?, config.output.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info => {
            let info = response::service_info(&config.protocol);
            print_json(&serde_json::to_value(info)?, config.output.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::InitConfig { force } => cmd_init_config(cli.config.as_deref(), force),
    }
}

fn cmd_init_config(path: Option<&Path>, force: bool) -> Result<ExitCode> {
    let config = Config::default();
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);

    if target.exists() && !force {
        eprintln!(
            "Config already exists at {}. Use --force to overwrite.",
            target.display()
        );
        return Ok(ExitCode::from(2));
    }

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("✓ Wrote default config to {}", target.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_calculate(
    input: Option<&Path>,
    flags: &[(&str, Option<f64>)],
    format: OutputFormat,
    pretty: bool,
    config: &Config,
) -> Result<ExitCode> {
    let errors = zones::validate_zones(&ZONES);
    if !errors.is_empty() {
        eprintln!("Zone table validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid zone table".into()));
    }

    let result = build_request(input, flags)
        .and_then(|map| request::inputs_from_map(&map, &config.protocol))
        .and_then(|inputs| compute(&inputs));

    let response = match (format, result) {
        (OutputFormat::Text, Ok(plan)) => {
            display_plan(&plan);
            return Ok(ExitCode::SUCCESS);
        }
        (_, result) => response::respond_with(result),
    };

    print_json(&response.body, pretty)?;

    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else if response.status < 500 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Merge the optional JSON body with command-line flags
fn build_request(input: Option<&Path>, flags: &[(&str, Option<f64>)]) -> Result<Map<String, Value>> {
    let mut map = match input {
        Some(path) => request::parse_body(&read_input(path)?)?,
        None => Map::new(),
    };

    for (key, value) in flags {
        if let Some(value) = value {
            // Non-finite flags become null and fail coercion downstream
            map.insert((*key).to_string(), Value::from(*value));
        }
    }

    tracing::debug!("Calculation request: {}", serde_json::Value::Object(map.clone()));
    Ok(map)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

fn display_plan(plan: &DosagePlan) {
    let inputs = &plan.input_parameters;
    let c = &plan.calculated_concentrations;
    let feedback = &plan.concentration_feedback;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PRP DOSING PLAN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Thrombocytes:      {} G/L", inputs.thrombocytes_gl);
    println!("  PRP yield / tube:  {} ml", inputs.prp_yield_ml);
    println!(
        "  Concentration:     PRP {}x, PPP {}x",
        inputs.prp_concentration_x, inputs.ppp_concentration_x
    );
    println!(
        "  Final PRP:         {:.2}M platelets/µL",
        c.final_prp_concentration_millions
    );
    println!();
    println!("  [{}] {}", feedback.kind.as_str().to_uppercase(), feedback.message);

    for zone in ZONES.iter() {
        let Some(zone_plan) = plan.zone(zone.key) else {
            continue;
        };
        println!();
        println!("  {}", zone_plan.zone_name);
        println!("  → Tubes:            {}", zone_plan.tubes_needed);
        println!("  → PRP extracted:    {:.1} ml", zone_plan.total_prp_volume_ml);
        println!("  → PPP added:        {:.1} ml", zone_plan.total_ppp_needed_ml);
        println!(
            "  → Injection volume: {:.1} ml",
            zone_plan.total_injection_volume_ml
        );
        println!(
            "  → Per tube:         {:.1} ml",
            zone_plan.extract_volume_per_tube_ml
        );
    }

    println!();
}
