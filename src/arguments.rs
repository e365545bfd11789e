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

use std::path::Path;

use crate::config::{InterfaceMode, Settings};

/// Command line for the frontend. `--home` is always the last pair.
pub fn frontend(settings: &Settings, home: &Path) -> Vec<String> {
	let mut args = Vec::new();

	if !settings.fullscreen {
		args.push("--windowed".to_owned());
	}
	if !settings.fullscreen || settings.force_fullscreen_res {
		args.push("--resolution".to_owned());
		args.push(settings.window_width.to_string());
		args.push(settings.window_height.to_string());
	}

	if settings.game_list_only {
		args.push("--gamelist-only".to_owned());
	}

	match settings.interface_mode {
		InterfaceMode::Kid => args.push("--force-kid".to_owned()),
		InterfaceMode::Kiosk => args.push("--force-kiosk".to_owned()),
		InterfaceMode::Normal => {}
	}

	if settings.monitor_index > 0 {
		args.push("--monitor".to_owned());
		args.push(settings.monitor_index.to_string());
	}

	if settings.no_exit_menu {
		args.push("--no-exit".to_owned());
	}

	args.push("--home".to_owned());
	args.push(home.to_string_lossy().into_owned());
	args
}

/// Command line that makes the frontend play a single clip and exit.
pub fn intro(clip: &Path) -> Vec<String> {
	vec!["--video".to_owned(), clip.to_string_lossy().into_owned()]
}
