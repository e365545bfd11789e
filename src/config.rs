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
	env, fs,
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{Context, Error};
use indexmap::IndexMap;
use ini::{Ini, ParseOption};
use log::{debug, info, trace, warn};

use crate::window::ControllerKind;

#[derive(Debug, Default, clap::Parser)]
#[command(version, about = "Play the intro clip and start EmulationStation")]
pub struct CommandLineArgs {
	/// Installation root (defaults to the current directory)
	#[arg(short, long, value_names = ["DIR"])]
	pub root: Option<PathBuf>,

	/// Configuration file (defaults to retrobat.ini in the root)
	#[arg(short, long = "config", value_names = ["FILE"])]
	pub config_file: Option<PathBuf>,

	/// How to bring the frontend window to the foreground
	#[arg(short, long, value_enum, default_value_t)]
	pub window_controller: ControllerKind,

	/// Don't let keyboard or mouse input skip the intro
	#[arg(long)]
	pub no_input: bool,

	/// Debug logging
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}

impl CommandLineArgs {
	pub fn root(&self) -> Result<PathBuf, Error> {
		match &self.root {
			Some(root) => Ok(root.clone()),
			None => env::current_dir().context("Unable to determine current directory"),
		}
	}
}

/// Locations inside an installation, all derived from its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
	pub config_file: PathBuf,
	pub log_file: PathBuf,
	/// Working directory of the frontend, also passed as `--home`
	pub frontend_dir: PathBuf,
	pub frontend_exe: PathBuf,
	pub default_video_dir: PathBuf,
}

impl Layout {
	pub const CONFIG_FILE: &str = "retrobat.ini";
	pub const LOG_FILE: &str = "retrobat.log";

	pub fn new<P: AsRef<Path>>(root: P, config_file: Option<&Path>) -> Self {
		let root = root.as_ref();
		let frontend_dir = root.join("emulationstation");

		Self {
			config_file: config_file
				.map(Path::to_path_buf)
				.unwrap_or_else(|| root.join(Self::CONFIG_FILE)),
			log_file: root.join(Self::LOG_FILE),
			frontend_exe: frontend_dir.join(format!("emulationstation{}", env::consts::EXE_SUFFIX)),
			default_video_dir: frontend_dir.join(".emulationstation").join("video"),
			frontend_dir,
		}
	}
}

/// Sections of an INI file with case-insensitive typed lookups.
///
/// Backslashes are kept as they are, values are commonly Windows paths.
#[derive(Debug, Default)]
pub struct IniStore {
	data: IndexMap<String, IndexMap<String, String>>,
}

impl IniStore {
	/// Load the file, writing the default configuration first if it is absent.
	pub fn load(path: &Path) -> Result<Self, Error> {
		Self::ensure_exists(path)?;

		let text =
			fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;

		Self::parse(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
	}

	pub fn parse(text: &str) -> Result<Self, Error> {
		let ini = Ini::load_from_str_opt(
			text,
			ParseOption {
				enabled_escape: false,
				..ParseOption::default()
			},
		)?;
		let mut data: IndexMap<String, IndexMap<String, String>> = IndexMap::new();

		for (section, properties) in ini.iter() {
			let Some(section) = section else {
				trace!("Ignoring {} values outside any section", properties.len());
				continue;
			};

			data.entry(section.to_owned()).or_default().extend(
				properties
					.iter()
					.map(|(key, value)| (key.to_owned(), value.to_owned())),
			);
		}

		Ok(Self { data })
	}

	pub fn ensure_exists(path: &Path) -> Result<(), Error> {
		if !path.exists() {
			warn!("{} not found, writing default configuration", path.display());
			fs::write(path, DEFAULT_INI)
				.with_context(|| format!("Unable to create {}", path.display()))?;
		}
		Ok(())
	}

	fn lookup(&self, section: &str, key: &str) -> Option<String> {
		let value = self
			.data
			.iter()
			.filter(|(name, _)| name.eq_ignore_ascii_case(section))
			.find_map(|(_, table)| {
				table
					.iter()
					.find(|(name, _)| name.eq_ignore_ascii_case(key))
					.map(|(_, value)| value)
			})?;

		trace!("{section}.{key} = {value:?}");
		Some(unquote(value.trim()).to_owned())
	}

	pub fn read_string(&self, section: &str, key: &str, default: &str) -> String {
		self.lookup(section, key)
			.unwrap_or_else(|| default.to_owned())
	}

	pub fn read_int(&self, section: &str, key: &str, default: i64) -> i64 {
		self.lookup(section, key)
			.and_then(|value| value.parse().ok())
			.unwrap_or(default)
	}

	pub fn read_bool(&self, section: &str, key: &str, default: bool) -> bool {
		match self.lookup(section, key).map(|value| value.to_ascii_lowercase()) {
			Some(value) if value == "1" || value == "true" => true,
			Some(value) if value == "0" || value == "false" => false,
			_ => default,
		}
	}
}

fn unquote(value: &str) -> &str {
	value
		.strip_prefix('"')
		.and_then(|value| value.strip_suffix('"'))
		.unwrap_or(value)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::FromRepr, strum::Display)]
#[repr(i64)]
pub enum InterfaceMode {
	#[default]
	Normal = 0,
	Kiosk = 1,
	Kid = 2,
}

impl InterfaceMode {
	/// Unknown values run the frontend normally.
	pub fn decode(value: i64) -> Self {
		Self::from_repr(value).unwrap_or_default()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntroDirectory {
	Default,
	Custom(PathBuf),
}

impl IntroDirectory {
	const DEFAULT: &str = "default";

	fn decode(value: &str) -> Self {
		if value.is_empty() || value.eq_ignore_ascii_case(Self::DEFAULT) {
			Self::Default
		} else {
			Self::Custom(PathBuf::from(value))
		}
	}
}

/// Settings resolved once at startup. Nothing downstream modifies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub language_detection: i64,
	pub reset_config_mode: bool,
	pub autostart: bool,
	pub wiimote_gun: bool,

	pub enable_intro: bool,
	pub intro_file_name: String,
	pub intro_file_path: IntroDirectory,
	pub random_video: bool,
	pub video_duration_ms: u64,

	pub fullscreen: bool,
	pub force_fullscreen_res: bool,
	pub game_list_only: bool,
	pub interface_mode: InterfaceMode,
	pub monitor_index: u32,
	pub no_exit_menu: bool,
	pub window_width: u32,
	pub window_height: u32,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			language_detection: 0,
			reset_config_mode: false,
			autostart: false,
			wiimote_gun: false,

			enable_intro: true,
			intro_file_name: Self::DEFAULT_INTRO.to_owned(),
			intro_file_path: IntroDirectory::Default,
			random_video: true,
			video_duration_ms: 6500,

			fullscreen: true,
			force_fullscreen_res: false,
			game_list_only: false,
			interface_mode: InterfaceMode::Normal,
			monitor_index: 0,
			no_exit_menu: false,
			window_width: 1280,
			window_height: 720,
		}
	}
}

impl Settings {
	pub const DEFAULT_INTRO: &str = "RetroBat-neon.mp4";

	pub fn load(path: &Path) -> Result<Self, Error> {
		info!("Reading {}", path.display());

		let settings = Self::from_store(&IniStore::load(path)?);

		debug!("{settings:?}");
		Ok(settings)
	}

	pub fn from_store(ini: &IniStore) -> Self {
		let defaults = Self::default();

		Self {
			language_detection: ini.read_int(
				"RetroBat",
				"LanguageDetection",
				defaults.language_detection,
			),
			reset_config_mode: ini.read_bool(
				"RetroBat",
				"ResetConfigMode",
				defaults.reset_config_mode,
			),
			autostart: ini.read_bool("RetroBat", "Autostart", defaults.autostart),
			wiimote_gun: ini.read_bool("RetroBat", "WiimoteGun", defaults.wiimote_gun),

			enable_intro: ini.read_bool("SplashScreen", "EnableIntro", defaults.enable_intro),
			intro_file_name: ini.read_string(
				"SplashScreen",
				"FileName",
				&defaults.intro_file_name,
			),
			intro_file_path: IntroDirectory::decode(&ini.read_string(
				"SplashScreen",
				"FilePath",
				IntroDirectory::DEFAULT,
			)),
			random_video: ini.read_bool("SplashScreen", "RandomVideo", defaults.random_video),
			video_duration_ms: ini
				.read_int(
					"SplashScreen",
					"VideoDuration",
					defaults.video_duration_ms as i64,
				)
				.max(0) as u64,

			fullscreen: ini.read_bool("EmulationStation", "Fullscreen", defaults.fullscreen),
			force_fullscreen_res: ini.read_bool(
				"EmulationStation",
				"ForceFullscreenRes",
				defaults.force_fullscreen_res,
			),
			game_list_only: ini.read_bool(
				"EmulationStation",
				"GameListOnly",
				defaults.game_list_only,
			),
			interface_mode: InterfaceMode::decode(ini.read_int(
				"EmulationStation",
				"InterfaceMode",
				0,
			)),
			monitor_index: u32::try_from(ini.read_int("EmulationStation", "MonitorIndex", 0))
				.unwrap_or(0),
			no_exit_menu: ini.read_bool("EmulationStation", "NoExitMenu", defaults.no_exit_menu),
			window_width: positive(
				ini.read_int("EmulationStation", "WindowXSize", defaults.window_width.into()),
				defaults.window_width,
			),
			window_height: positive(
				ini.read_int("EmulationStation", "WindowYSize", defaults.window_height.into()),
				defaults.window_height,
			),
		}
	}

	pub fn video_duration(&self) -> Duration {
		Duration::from_millis(self.video_duration_ms)
	}
}

fn positive(value: i64, default: u32) -> u32 {
	u32::try_from(value)
		.ok()
		.filter(|&value| value > 0)
		.unwrap_or(default)
}

pub const DEFAULT_INI: &str = r#"; RETROBAT GLOBAL CONFIG FILE

[RetroBat]

; Detect the system language at startup and use it for the frontend and RetroArch.
LanguageDetection=0

; Reset the default emulator configuration files at startup. Use at your own risk.
ResetConfigMode=0

; Start RetroBat automatically when the session starts.
Autostart=0

; Start WiimoteGun with RetroBat so a wiimote can be used as a light gun and to navigate.
WiimoteGun=0

[SplashScreen]

; Play an intro video before starting the frontend.
EnableIntro=1

; Video file to play when RandomVideo is 0.
FileName="RetroBat-neon.mp4"

; "default" uses the bundled video directory, otherwise a full path to a directory of videos.
FilePath="default"

; Play a random video from the video directory.
RandomVideo=1

; Maximum time to play the video for, in milliseconds.
VideoDuration=6500

[EmulationStation]

; Start the frontend fullscreen (1) or windowed (0).
Fullscreen=1

; Force the fullscreen resolution to WindowXSize x WindowYSize.
ForceFullscreenRes=0

; Only read gamelist.xml files when listing games. New files will not appear until this is disabled again.
GameListOnly=0

; 0 = normal, 1 = kiosk mode, 2 = kid mode.
InterfaceMode=0

; Monitor index to display the frontend on (0 = default).
MonitorIndex=0

; Hide the option to quit the frontend from the main menu.
NoExitMenu=0

; Frontend window width.
WindowXSize=1280

; Frontend window height.
WindowYSize=720
"#;
