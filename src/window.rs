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

use std::{fmt, process::Command};

use enum_dispatch::enum_dispatch;
use log::{error, trace};

pub type WindowId = u64;

/// Requests to the window manager. They are all best effort: `false` means the
/// request was refused or could not be made.
#[enum_dispatch]
pub trait WindowController {
	fn allow_foreground_takeover(&self, pid: u32) -> bool;
	fn find_main_window(&self, pid: u32) -> Option<WindowId>;
	fn restore_window(&self, window: WindowId) -> bool;
	fn request_focus(&self, window: WindowId) -> bool;
	fn request_foreground(&self, window: WindowId) -> bool;
}

#[enum_dispatch(WindowController)]
#[derive(strum::AsRefStr)]
pub enum WindowControllers {
	Xdotool,
	Headless,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ControllerKind {
	/// X11 via the xdotool command
	#[default]
	Xdotool,
	/// No window manager interaction
	Headless,
}

impl WindowControllers {
	pub fn new(kind: ControllerKind) -> Self {
		match kind {
			ControllerKind::Xdotool => Self::from(Xdotool),
			ControllerKind::Headless => Self::from(Headless),
		}
	}
}

impl fmt::Debug for WindowControllers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_ref())
	}
}

#[derive(Debug, Default)]
pub struct Xdotool;

#[derive(Debug, Default)]
pub struct Headless;

impl Xdotool {
	fn run(&self, args: &[&str]) -> Option<String> {
		trace!("xdotool {}", args.join(" "));

		match Command::new("xdotool").args(args).output() {
			Ok(output) if output.status.success() => {
				Some(String::from_utf8_lossy(&output.stdout).into_owned())
			}
			Ok(output) => {
				trace!(
					"xdotool {} failed ({}): {}",
					args.join(" "),
					output.status,
					String::from_utf8_lossy(&output.stderr).trim()
				);
				None
			}
			Err(err) => {
				error!("Unable to run xdotool {}: {err}", args.join(" "));
				None
			}
		}
	}

	fn window_command(&self, command: &str, window: WindowId) -> bool {
		self.run(&[command, window.to_string().as_str()]).is_some()
	}
}

/// First window id in `xdotool search` output.
fn parse_window_id(output: &str) -> Option<WindowId> {
	output
		.lines()
		.find_map(|line| line.trim().parse().ok())
}

impl WindowController for Xdotool {
	fn allow_foreground_takeover(&self, _pid: u32) -> bool {
		/* X11 has no foreground lock */
		true
	}

	fn find_main_window(&self, pid: u32) -> Option<WindowId> {
		parse_window_id(&self.run(&["search", "--pid", pid.to_string().as_str()])?)
	}

	fn restore_window(&self, window: WindowId) -> bool {
		self.window_command("windowmap", window)
	}

	fn request_focus(&self, window: WindowId) -> bool {
		self.window_command("windowfocus", window)
	}

	fn request_foreground(&self, window: WindowId) -> bool {
		self.window_command("windowactivate", window) && self.window_command("windowraise", window)
	}
}

impl WindowController for Headless {
	fn allow_foreground_takeover(&self, _pid: u32) -> bool {
		false
	}

	fn find_main_window(&self, _pid: u32) -> Option<WindowId> {
		None
	}

	fn restore_window(&self, _window: WindowId) -> bool {
		false
	}

	fn request_focus(&self, _window: WindowId) -> bool {
		false
	}

	fn request_foreground(&self, _window: WindowId) -> bool {
		false
	}
}
