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
	io,
	path::{Path, PathBuf},
	process::ExitCode,
	thread,
	time::{Duration, Instant},
};

use anyhow::Error;
use log::{debug, error, info, warn};

use crate::{
	arguments,
	config::{Layout, Settings},
	input::InputPoller,
	process::{Exit, Spawner, Supervised},
	video,
	window::WindowController,
};

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
	#[error("Unable to load configuration {}: {reason}", .path.display())]
	ConfigMissing { path: PathBuf, reason: String },

	#[error("EmulationStation executable not found: {}", .0.display())]
	TargetExecutableMissing(PathBuf),

	#[error("Intro {} unavailable: {source}", .clip.display())]
	IntroUnavailable {
		clip: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("Unable to start {}: {source}", .program.display())]
	SpawnFailure {
		program: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("Lost track of {}: {source}", .program.display())]
	WaitFailure {
		program: PathBuf,
		#[source]
		source: io::Error,
	},
}

impl LaunchError {
	/// Process exit status for a launch that never produced a frontend status.
	pub fn status(&self) -> u8 {
		match self {
			Self::ConfigMissing { .. } => 78,
			Self::TargetExecutableMissing(_) => 127,
			Self::IntroUnavailable { .. } | Self::SpawnFailure { .. } => 126,
			Self::WaitFailure { .. } => 125,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Stage {
	Idle,
	ConfigLoaded,
	IntroPlaying,
	MainRunning,
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroEnd {
	/// The clip finished by itself
	Finished,
	TimedOut,
	Interrupted,
	Skipped,
}

#[derive(Debug)]
pub enum Outcome {
	Exited(Exit),
	Failed(LaunchError),
}

impl Outcome {
	pub fn status(&self) -> u8 {
		match self {
			Self::Exited(exit) => exit.status(),
			Self::Failed(err) => err.status(),
		}
	}

	pub fn exit_code(&self) -> ExitCode {
		ExitCode::from(self.status())
	}
}

fn failed(err: LaunchError) -> Outcome {
	error!("{err}");
	Outcome::Failed(err)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
	/// Time for a new process to start up before it is polled
	pub grace: Duration,
	pub tick: Duration,
	pub focus_attempts: u32,
	pub focus_delay: Duration,
}

impl Default for Timings {
	fn default() -> Self {
		Self {
			grace: Duration::from_secs(1),
			tick: Duration::from_millis(100),
			focus_attempts: 5,
			focus_delay: Duration::from_millis(200),
		}
	}
}

#[derive(Debug)]
pub struct Launcher<S, W, I> {
	spawner: S,
	windows: W,
	input: I,
	timings: Timings,
	stages: Vec<Stage>,
}

impl<S: Spawner, W: WindowController, I: InputPoller> Launcher<S, W, I> {
	pub fn new(spawner: S, windows: W, input: I, timings: Timings) -> Self {
		Self {
			spawner,
			windows,
			input,
			timings,
			stages: Vec::new(),
		}
	}

	/// Stages entered by the last run, in order.
	pub fn stages(&self) -> &[Stage] {
		&self.stages
	}

	fn enter(&mut self, stage: Stage) {
		debug!("Stage: {stage}");
		self.stages.push(stage);
	}

	fn fail(&mut self, err: LaunchError) -> Outcome {
		self.enter(Stage::Done);
		failed(err)
	}

	pub fn run<F>(&mut self, layout: &Layout, load: F) -> Outcome
	where
		F: FnOnce() -> Result<Settings, Error>,
	{
		self.stages.clear();
		self.enter(Stage::Idle);

		let settings = match load() {
			Ok(settings) => settings,
			Err(err) => {
				return self.fail(LaunchError::ConfigMissing {
					path: layout.config_file.clone(),
					reason: format!("{err:#}"),
				});
			}
		};
		self.enter(Stage::ConfigLoaded);

		if !self.spawner.exists(&layout.frontend_exe) {
			return self.fail(LaunchError::TargetExecutableMissing(
				layout.frontend_exe.clone(),
			));
		}

		let args = arguments::frontend(&settings, &layout.frontend_dir);

		if settings.enable_intro {
			match video::choose_clip(&settings, layout) {
				Some(clip) => {
					self.enter(Stage::IntroPlaying);
					let end = self.play_intro(layout, &clip, settings.video_duration());
					info!("Intro ended: {end:?}");
				}
				None => info!("Skipping intro"),
			}
		} else {
			debug!("Intro disabled");
		}

		self.enter(Stage::MainRunning);
		let outcome = self.run_frontend(layout, &args);
		self.enter(Stage::Done);
		outcome
	}

	/// Play `clip` for at most `duration`, returning once the player is gone.
	pub fn play_intro(&mut self, layout: &Layout, clip: &Path, duration: Duration) -> IntroEnd {
		/* The clip may have been removed since it was selected */
		if let Err(source) = clip.metadata() {
			warn!(
				"{}",
				LaunchError::IntroUnavailable {
					clip: clip.to_path_buf(),
					source
				}
			);
			return IntroEnd::Skipped;
		}

		/* Arming counts towards the duration */
		let started = Instant::now();
		self.input.arm();

		let mut child = match self.spawner.spawn(
			&layout.frontend_exe,
			&layout.frontend_dir,
			&arguments::intro(clip),
		) {
			Ok(child) => child,
			Err(source) => {
				warn!(
					"{}",
					LaunchError::IntroUnavailable {
						clip: clip.to_path_buf(),
						source
					}
				);
				return IntroEnd::Skipped;
			}
		};

		thread::sleep(self.timings.grace.min(duration));

		let end = loop {
			match child.has_exited() {
				Ok(true) => break IntroEnd::Finished,
				Ok(false) => {}
				Err(err) => {
					warn!("Unable to check intro process {}: {err}", child.id());
					break IntroEnd::Skipped;
				}
			}

			let elapsed = started.elapsed();
			if elapsed >= duration {
				break IntroEnd::TimedOut;
			}

			if self.input.interrupted() {
				break IntroEnd::Interrupted;
			}

			thread::sleep(self.timings.tick.min(duration - elapsed));
		};

		if end != IntroEnd::Finished {
			if let Err(err) = child.terminate() {
				error!("Unable to stop intro process {}: {err}", child.id());

				/* Don't start the frontend alongside a running intro */
				if let Err(err) = child.wait() {
					error!("Unable to wait for intro process {}: {err}", child.id());
				}
			}
		}

		end
	}

	fn run_frontend(&mut self, layout: &Layout, args: &[String]) -> Outcome {
		let mut child = match self.spawner.spawn(&layout.frontend_exe, &layout.frontend_dir, args)
		{
			Ok(child) => child,
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				return failed(LaunchError::TargetExecutableMissing(
					layout.frontend_exe.clone(),
				));
			}
			Err(source) => {
				return failed(LaunchError::SpawnFailure {
					program: layout.frontend_exe.clone(),
					source,
				});
			}
		};

		thread::sleep(self.timings.grace);

		if !self.bring_to_front(child.id()) {
			info!("Window manager ignored focus request");
		}

		match child.wait() {
			Ok(exit) => {
				info!("EmulationStation exited: {exit:?}");
				Outcome::Exited(exit)
			}
			Err(source) => failed(LaunchError::WaitFailure {
				program: layout.frontend_exe.clone(),
				source,
			}),
		}
	}

	fn bring_to_front(&mut self, pid: u32) -> bool {
		for attempt in 1..=self.timings.focus_attempts {
			if attempt > 1 {
				thread::sleep(self.timings.focus_delay);
			}

			let Some(window) = self.windows.find_main_window(pid) else {
				debug!("No window for process {pid} yet (attempt {attempt})");
				continue;
			};

			self.windows.allow_foreground_takeover(pid);
			self.windows.restore_window(window);

			let focused = self.windows.request_focus(window);
			let foreground = self.windows.request_foreground(window);

			if focused && foreground {
				debug!("Window {window} in foreground (attempt {attempt})");
				return true;
			}
		}

		false
	}
}
