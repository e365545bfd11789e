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
use std::{
	fs::{File, OpenOptions},
	io::Write,
	path::Path,
	sync::Mutex,
};

use anyhow::{Context, Error};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use stderrlog::StdErrLog;

/// Sends every record to stderr and appends a timestamped copy to a file.
struct Tee {
	stderr: StdErrLog,
	file: Mutex<File>,
}

impl Log for Tee {
	fn enabled(&self, metadata: &Metadata) -> bool {
		self.stderr.enabled(metadata)
	}

	fn log(&self, record: &Record) {
		if !self.enabled(record.metadata()) {
			return;
		}

		self.stderr.log(record);

		if let Ok(mut file) = self.file.lock() {
			/* Nowhere left to report a failed write */
			let _ = writeln!(
				file,
				"{}: [{}] {}",
				Local::now().format("%Y-%m-%d %H:%M:%S"),
				record.level(),
				record.args()
			);
		}
	}

	fn flush(&self) {
		self.stderr.flush();
		if let Ok(mut file) = self.file.lock() {
			let _ = file.flush();
		}
	}
}

fn stderr(module: &str, verbosity: usize) -> StdErrLog {
	let mut stderr = stderrlog::new();
	stderr
		.module(module)
		.show_module_names(true)
		.verbosity(verbosity);
	stderr
}

fn level_filter(verbosity: usize) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::Error,
		1 => LevelFilter::Warn,
		2 => LevelFilter::Info,
		3 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

/// Log to stderr, and to `log_file` when it can be opened for appending.
pub fn init(module: &str, verbosity: usize, log_file: &Path) -> Result<(), Error> {
	let mut stderr = stderr(module, verbosity);

	let file = match OpenOptions::new().create(true).append(true).open(log_file) {
		Ok(file) => file,
		Err(err) => {
			stderr.init()?;
			log::warn!("Unable to open {}: {err}", log_file.display());
			return Ok(());
		}
	};

	log::set_max_level(level_filter(verbosity));
	log::set_boxed_logger(Box::new(Tee {
		stderr,
		file: Mutex::new(file),
	}))
	.context("Logger already initialised")
}
