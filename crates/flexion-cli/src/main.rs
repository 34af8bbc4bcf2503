// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FlexION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! FlexION CLI - Entry point for the `flexion` binary
//!
//! Loads `flexion.toml`, builds the feed registry and runs one command.
//! Results go to stdout as pretty JSON, logs to stderr.

mod args;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("flexion=info".parse().context("Invalid log directive")?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, registry) = commands::load(&cli.config)?;
    debug!("Feeds registered for {:?}", registry.countries());

    match cli.command {
        Commands::Daily(args) => print_json(&commands::daily(&registry, &args)?),
        Commands::Flexibility(args) => {
            print_json(&commands::flexibility(&registry, &config.analysis, &args)?)
        }
        Commands::Summary(args) => {
            print_json(&commands::summary(&registry, &config.analysis, &args)?)
        }
        Commands::Precompute(args) => {
            match commands::precompute(&registry, &config.analysis, &args)? {
                Some(countries) => print_json(&countries),
                None => {
                    info!("Precompute finished");
                    Ok(())
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
