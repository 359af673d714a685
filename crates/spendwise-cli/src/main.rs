// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::ApiRuntime;
use spendwise_app::{ExpenseBrowser, ExpenseGateway};
use spendwise_testkit::InMemoryGateway;
use spendwise_tui::AppRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

const DEMO_SEED: u64 = 42;

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
            "load config {}; run `spendwise --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let client = spendwise_api::Client::new(config.base_url(), config.timeout()?)
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    let log_path = config.log_file()?;
    if options.check_only {
        println!("config ok: {}", options.config_path.display());
        println!("api: {} (timeout {:?})", client.base_url(), client.timeout());
        println!("log: {}", log_path.display());
        return Ok(());
    }

    logging::init(config.log_level(), &log_path)?;

    if options.demo {
        let today = time::OffsetDateTime::now_utc().date();
        info!(seed = DEMO_SEED, "starting with in-memory demo backend");
        launch(
            ApiRuntime::new(InMemoryGateway::seeded(DEMO_SEED, today)),
            config.page_size(),
        )
    } else {
        info!(base_url = client.base_url(), "starting");
        launch(ApiRuntime::new(client), config.page_size())
    }
}

fn launch<G>(mut runtime: ApiRuntime<G>, page_size: u32) -> Result<()>
where
    G: ExpenseGateway + Clone + Send + 'static,
{
    let mut browser = ExpenseBrowser::new(runtime.today(), page_size);
    spendwise_tui::run_app(&mut browser, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
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
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("spendwise: browse and edit expenses by month");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch against seeded demo data (in-memory)");
    println!("  --check                  Validate config and API settings, then exit");
    println!("  --help                   Show this help");
}
