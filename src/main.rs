/*
 * Copyright 2025  Simon Arlott
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */
mod arguments;
mod config;
mod input;
mod launch;
mod logging;
mod process;
mod video;
mod window;

use std::process::ExitCode;

use anyhow::Error;
use clap::Parser;
use config::{CommandLineArgs, Layout, Settings};
use log::debug;

fn main() -> Result<ExitCode, Error> {
	let args: CommandLineArgs = CommandLineArgs::parse();

	let layout = Layout::new(args.root()?, args.config_file.as_deref());

	logging::init(module_path!(), usize::from(args.verbose) + 2, &layout.log_file)?;
	debug!("{layout:?}");

	let mut launcher = launch::Launcher::new(
		process::OsSpawner,
		window::WindowControllers::new(args.window_controller),
		input::Inputs::new(!args.no_input),
		launch::Timings::default(),
	);

	let outcome = launcher.run(&layout, || Settings::load(&layout.config_file));
	debug!("Stages: {:?}", launcher.stages());
	Ok(outcome.exit_code())
}
