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
	path::Path,
	process::{Child, Command, ExitStatus},
};

use log::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
	Code(i32),
	/// Killed by a signal, there is no exit code
	Signalled,
}

impl From<ExitStatus> for Exit {
	fn from(status: ExitStatus) -> Self {
		status.code().map_or(Self::Signalled, Self::Code)
	}
}

impl Exit {
	/// Status to exit with ourselves. Codes that don't fit are reported as 1.
	pub fn status(self) -> u8 {
		match self {
			Self::Code(code) => u8::try_from(code).unwrap_or(1),
			Self::Signalled => 1,
		}
	}
}

/// A running process owned by whoever spawned it.
pub trait Supervised {
	fn id(&self) -> u32;

	fn has_exited(&mut self) -> io::Result<bool>;

	/// Kill the process and wait for it to be gone.
	fn terminate(&mut self) -> io::Result<Exit>;

	fn wait(&mut self) -> io::Result<Exit>;
}

pub trait Spawner {
	type Child: Supervised;

	fn exists(&self, program: &Path) -> bool {
		program.is_file()
	}

	fn spawn(&mut self, program: &Path, dir: &Path, args: &[String]) -> io::Result<Self::Child>;
}

#[derive(Debug, Default)]
pub struct OsSpawner;

#[derive(Debug)]
pub struct OsChild {
	child: Child,
}

impl Spawner for OsSpawner {
	type Child = OsChild;

	fn spawn(&mut self, program: &Path, dir: &Path, args: &[String]) -> io::Result<OsChild> {
		for path in [program, dir] {
			if !path.exists() {
				return Err(io::Error::new(
					io::ErrorKind::NotFound,
					format!("{} does not exist", path.display()),
				));
			}
		}

		info!("Running {} {}", program.display(), args.join(" "));

		let child = Command::new(program)
			.args(args)
			.current_dir(dir)
			.spawn()?;

		debug!("Started process {}", child.id());
		Ok(OsChild { child })
	}
}

impl Supervised for OsChild {
	fn id(&self) -> u32 {
		self.child.id()
	}

	fn has_exited(&mut self) -> io::Result<bool> {
		Ok(self.child.try_wait()?.is_some())
	}

	fn terminate(&mut self) -> io::Result<Exit> {
		if let Err(err) = self.child.kill() {
			/* It may have exited by itself */
			if self.child.try_wait()?.is_none() {
				return Err(err);
			}
		}

		let exit = self.wait()?;

		debug!("Process {} terminated", self.id());
		Ok(exit)
	}

	fn wait(&mut self) -> io::Result<Exit> {
		let exit = Exit::from(self.child.wait()?);

		trace!("Process {} exited: {exit:?}", self.id());
		Ok(exit)
	}
}
