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

use std::{fmt, io, path::PathBuf};

use enum_dispatch::enum_dispatch;
use evdev::{EventType, KeyCode};
use log::{debug, info, warn};

/// Keys and buttons that skip the intro.
const INTERRUPT_KEYS: [KeyCode; 6] = [
	KeyCode::KEY_SPACE,
	KeyCode::KEY_ENTER,
	KeyCode::KEY_KPENTER,
	KeyCode::BTN_LEFT,
	KeyCode::BTN_RIGHT,
	KeyCode::BTN_MIDDLE,
];

#[enum_dispatch]
pub trait InputPoller {
	/// Forget anything pressed so far.
	fn arm(&mut self);

	/// Whether an interrupting key or button was pressed since the last call.
	fn interrupted(&mut self) -> bool;
}

#[enum_dispatch(InputPoller)]
#[derive(strum::AsRefStr)]
pub enum Inputs {
	EvdevInput,
	NoInput,
}

impl Inputs {
	pub fn new(enabled: bool) -> Self {
		if enabled {
			Self::from(EvdevInput::default())
		} else {
			Self::from(NoInput)
		}
	}
}

impl fmt::Debug for Inputs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_ref())
	}
}

#[derive(derive_more::Debug, Default)]
pub struct EvdevInput {
	#[debug("{:?}", devices.iter().map(|(path, _)| path).collect::<Vec<_>>())]
	devices: Vec<(PathBuf, evdev::Device)>,
}

#[derive(Debug, Default)]
pub struct NoInput;

fn is_interrupt(event_type: EventType, code: u16, value: i32) -> bool {
	/* Presses only, not releases or repeats */
	event_type == EventType::KEY
		&& value == 1
		&& INTERRUPT_KEYS.iter().any(|key| key.0 == code)
}

impl EvdevInput {
	fn open() -> Vec<(PathBuf, evdev::Device)> {
		evdev::enumerate()
			.filter(|(_, device)| {
				device
					.supported_keys()
					.is_some_and(|keys| INTERRUPT_KEYS.iter().any(|&key| keys.contains(key)))
			})
			.filter_map(|(path, device)| match device.set_nonblocking(true) {
				Ok(()) => {
					debug!(
						"Watching {} ({})",
						path.display(),
						device.name().unwrap_or("unnamed")
					);
					Some((path, device))
				}
				Err(err) => {
					warn!("Unable to use {}: {err}", path.display());
					None
				}
			})
			.collect()
	}

	/// Read everything pending on every device, dropping devices that fail.
	fn read_all(&mut self) -> bool {
		let mut pressed = false;

		self.devices.retain_mut(|(path, device)| match device.fetch_events() {
			Ok(events) => {
				for event in events {
					if is_interrupt(event.event_type(), event.code(), event.value()) {
						debug!("[{}] Interrupted by {:?}", path.display(), KeyCode(event.code()));
						pressed = true;
					}
				}
				true
			}
			Err(err) if err.kind() == io::ErrorKind::WouldBlock => true,
			Err(err) => {
				warn!("[{}] Error reading events: {err}", path.display());
				false
			}
		});

		pressed
	}
}

impl InputPoller for EvdevInput {
	fn arm(&mut self) {
		self.devices = Self::open();

		if self.devices.is_empty() {
			info!("No keyboard or mouse available to skip the intro");
		}

		self.read_all();
	}

	fn interrupted(&mut self) -> bool {
		self.read_all()
	}
}

impl InputPoller for NoInput {
	fn arm(&mut self) {}

	fn interrupted(&mut self) -> bool {
		false
	}
}
