// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use garage_app::{HomeUiState, VehicleField, current_year};
use garage_db::{Store, VehicleRepository};
use garage_testkit::VehicleFaker;
use runtime::{AddVehicleViewModel, HomeViewModel};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEMO_SEED: u64 = 7;
const DEMO_FLEET_SIZE: usize = 24;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `garage --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init_logging(config.log_filter())?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or GARAGE_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        seed_demo_data(&store)?;
    }

    let grace = config.subscription_grace()?;
    if options.check_only {
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let repository = VehicleRepository::new(store)?;
    let command = options.command.unwrap_or_else(Command::home);
    runtime.block_on(execute(command, repository, grace))
}

fn seed_demo_data(store: &Store) -> Result<()> {
    let mut faker = VehicleFaker::new(DEMO_SEED);
    for vehicle in faker.fleet(DEMO_FLEET_SIZE) {
        store.insert_vehicle(&vehicle)?;
    }
    info!(vehicles = DEMO_FLEET_SIZE, "seeded demo data");
    Ok(())
}

async fn execute(command: Command, repository: VehicleRepository, grace: Duration) -> Result<()> {
    match command {
        Command::List {
            brands,
            fuels,
            json,
        } => {
            let home = HomeViewModel::new(repository, grace);
            for brand in &brands {
                home.update_brand_filter(brand, true);
            }
            for fuel in &fuels {
                home.update_fuel_filter(fuel, true);
            }
            let mut states = home.ui_state()?;
            states
                .changed()
                .await
                .context("home state pipeline stopped before producing a state")?;
            let state = states.borrow_and_update().clone();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print_vehicle_table(&state);
            }
        }
        Command::Summary => {
            let state = HomeViewModel::new(repository, grace).snapshot();
            println!("vehicles: {}", state.total_vehicles);
            println!("electric: {}", state.electric_count);
        }
        Command::Add { fields } => {
            let form = AddVehicleViewModel::new(repository);
            for (field, value) in fields {
                form.update(field, value);
            }
            form.save(|id| println!("saved vehicle {id}")).await?;
        }
        Command::Catalog => {
            let home = HomeViewModel::new(repository.clone(), grace);
            let form = AddVehicleViewModel::new(repository);
            println!("brands: {}", form.brands().join(", "));
            println!("filter brands: {}", home.brands().join(", "));
            println!("models: {}", form.models().join(", "));
            println!("fuel types: {}", form.fuel_types().join(", "));
            println!("years: {}", form.years().join(", "));
        }
    }
    Ok(())
}

fn print_vehicle_table(state: &HomeUiState) {
    println!(
        "{} vehicles, {} electric",
        state.total_vehicles, state.electric_count
    );
    if state.is_filter_active {
        println!(
            "filters: brands [{}] fuels [{}]",
            join_set(&state.selected_brands),
            join_set(&state.selected_fuels)
        );
    }
    if state.vehicles.is_empty() {
        println!("no vehicles match");
        return;
    }

    let year = current_year();
    println!(
        "{:>5}  {:<14} {:<12} {:<15} {:<9} {:<5} {:<20} {}",
        "ID", "BRAND", "MODEL", "NUMBER", "FUEL", "YEAR", "OWNER", "OWNED"
    );
    for vehicle in &state.vehicles {
        println!(
            "{:>5}  {:<14} {:<12} {:<15} {:<9} {:<5} {:<20} {}",
            vehicle.id.get(),
            vehicle.brand,
            vehicle.model,
            vehicle.number,
            vehicle.fuel,
            vehicle.year,
            vehicle.owner_name,
            vehicle.years_owned(year),
        );
    }
}

fn join_set(values: &std::collections::BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List {
        brands: Vec<String>,
        fuels: Vec<String>,
        json: bool,
    },
    Summary,
    Add {
        fields: Vec<(VehicleField, String)>,
    },
    Catalog,
}

impl Command {
    fn home() -> Self {
        Self::List {
            brands: Vec::new(),
            fuels: Vec::new(),
            json: false,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::home()),
            "summary" => Some(Self::Summary),
            "add" => Some(Self::Add { fields: Vec::new() }),
            "catalog" => Some(Self::Catalog),
            _ => None,
        }
    }

    /// Consumes a command-specific flag. Returns false when `arg` is not one.
    fn accept<I, S>(&mut self, arg: &str, rest: &mut I) -> Result<bool>
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
    {
        match self {
            Self::List {
                brands,
                fuels,
                json,
            } => match arg {
                "--brand" => brands.push(flag_value(arg, rest)?),
                "--fuel" => fuels.push(flag_value(arg, rest)?),
                "--json" => *json = true,
                _ => return Ok(false),
            },
            Self::Add { fields } => {
                let Some(field) = add_field_for_flag(arg) else {
                    return Ok(false);
                };
                fields.push((field, flag_value(arg, rest)?));
            }
            Self::Summary | Self::Catalog => return Ok(false),
        }
        Ok(true)
    }
}

fn add_field_for_flag(flag: &str) -> Option<VehicleField> {
    match flag {
        "--brand" => Some(VehicleField::Brand),
        "--model" => Some(VehicleField::Model),
        "--fuel" => Some(VehicleField::FuelType),
        "--number" => Some(VehicleField::VehicleNumber),
        "--year" => Some(VehicleField::Year),
        "--owner" => Some(VehicleField::OwnerName),
        _ => None,
    }
}

fn flag_value<I, S>(flag: &str, rest: &mut I) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    rest.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            other => {
                let consumed = if let Some(command) = options.command.as_mut() {
                    command.accept(other, &mut iter)?
                } else if let Some(command) = Command::from_name(other) {
                    options.command = Some(command);
                    true
                } else {
                    false
                };
                if !consumed {
                    return Err(anyhow!(
                        "unknown argument {other:?}; run with --help to see supported options"
                    ));
                }
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("garage (vehicle inventory)");
    println!("usage: garage [options] [command]");
    println!();
    println!("commands:");
    println!("  list [--brand B]... [--fuel F]... [--json]");
    println!("                           Show vehicles, newest first (default)");
    println!("  summary                  Show total and electric vehicle counts");
    println!("  add --brand B --model M --fuel F --number N --year Y --owner O");
    println!("                           Record a new vehicle");
    println!("  catalog                  Show the brand, model, fuel, and year choices");
    println!();
    println!("options:");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, Command, parse_cli_args};
    use anyhow::Result;
    use garage_app::VehicleField;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/garage-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
                command: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn list_collects_repeated_filters() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--demo", "list", "--brand", "Honda", "--fuel", "Electric", "--brand", "Tata",
                "--json",
            ],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert_eq!(
            options.command,
            Some(Command::List {
                brands: vec!["Honda".to_owned(), "Tata".to_owned()],
                fuels: vec!["Electric".to_owned()],
                json: true,
            })
        );
        Ok(())
    }

    #[test]
    fn add_maps_flags_to_form_fields() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "add", "--brand", "Hero", "--model", "Splendor", "--fuel", "Petrol", "--number",
                "KA 01 AB 0001", "--year", "2019", "--owner", "Ravi Kumar",
            ],
            default_options_path(),
        )?;
        let Some(Command::Add { fields }) = options.command else {
            panic!("expected add command, got {:?}", options.command);
        };
        assert_eq!(
            fields,
            vec![
                (VehicleField::Brand, "Hero".to_owned()),
                (VehicleField::Model, "Splendor".to_owned()),
                (VehicleField::FuelType, "Petrol".to_owned()),
                (VehicleField::VehicleNumber, "KA 01 AB 0001".to_owned()),
                (VehicleField::Year, "2019".to_owned()),
                (VehicleField::OwnerName, "Ravi Kumar".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn command_flags_require_values() {
        let error = parse_cli_args(vec!["list", "--brand"], default_options_path())
            .expect_err("missing brand value should fail");
        assert!(error.to_string().contains("--brand requires a value"));
    }

    #[test]
    fn command_flags_are_scoped_to_their_command() {
        let error = parse_cli_args(vec!["summary", "--json"], default_options_path())
            .expect_err("summary takes no flags");
        assert!(error.to_string().contains("unknown argument \"--json\""));

        let error = parse_cli_args(vec!["--brand", "Honda"], default_options_path())
            .expect_err("filters need the list command");
        assert!(error.to_string().contains("unknown argument"));
    }

    #[test]
    fn second_command_name_is_rejected() {
        let error = parse_cli_args(vec!["list", "summary"], default_options_path())
            .expect_err("only one command per run");
        assert!(error.to_string().contains("\"summary\""));
    }

    #[test]
    fn global_flags_work_after_the_command() -> Result<()> {
        let options = parse_cli_args(vec!["catalog", "--demo"], default_options_path())?;
        assert!(options.demo);
        assert_eq!(options.command, Some(Command::Catalog));
        Ok(())
    }
}
