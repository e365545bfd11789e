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
	fs,
	path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rand::{Rng, seq::IndexedRandom};

use crate::config::{IntroDirectory, Layout, Settings};

const EXTENSIONS: [&str; 6] = ["mp4", "mkv", "avi", "webm", "mov", "wmv"];

pub fn directory(settings: &Settings, layout: &Layout) -> PathBuf {
	match &settings.intro_file_path {
		IntroDirectory::Default => layout.default_video_dir.clone(),
		IntroDirectory::Custom(path) => path.clone(),
	}
}

fn is_video(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Video files in `dir`, sorted by name. A missing directory has none.
pub fn candidates(dir: &Path) -> Vec<PathBuf> {
	let entries = match fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(err) => {
			debug!("Unable to list {}: {err}", dir.display());
			return Vec::new();
		}
	};

	let mut clips: Vec<PathBuf> = entries
		.filter_map(|entry| {
			entry
				.inspect_err(|err| warn!("Unable to read entry in {}: {err}", dir.display()))
				.ok()
		})
		.map(|entry| entry.path())
		.filter(|path| path.is_file() && is_video(path))
		.collect();

	clips.sort();
	clips
}

pub fn select<R: Rng + ?Sized>(
	settings: &Settings,
	dir: &Path,
	candidates: &[PathBuf],
	rng: &mut R,
) -> Option<PathBuf> {
	if candidates.is_empty() {
		return None;
	}

	if settings.random_video {
		return candidates.choose(rng).cloned();
	}

	if let Some(clip) = candidates
		.iter()
		.find(|clip| clip.file_name().is_some_and(|name| name == settings.intro_file_name.as_str()))
	{
		return Some(clip.clone());
	}

	debug!(
		"{} not found in {}, trying {}",
		settings.intro_file_name,
		dir.display(),
		Settings::DEFAULT_INTRO
	);

	Some(dir.join(Settings::DEFAULT_INTRO)).filter(|clip| clip.is_file())
}

pub fn choose_clip(settings: &Settings, layout: &Layout) -> Option<PathBuf> {
	let dir = directory(settings, layout);
	let clip = select(settings, &dir, &candidates(&dir), &mut rand::rng());

	match &clip {
		Some(clip) => info!("Selected intro {}", clip.display()),
		None => info!("No intro video available in {}", dir.display()),
	}
	clip
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::{SeedableRng, rngs::StdRng};

	use super::*;

	fn touch(dir: &Path, name: &str) -> PathBuf {
		let path = dir.join(name);
		fs::write(&path, b"").unwrap();
		path
	}

	fn fixed(name: &str) -> Settings {
		Settings {
			random_video: false,
			intro_file_name: name.to_owned(),
			..Settings::default()
		}
	}

	#[test]
	fn missing_directory() {
		let dir = tempfile::tempdir().unwrap();

		assert!(candidates(&dir.path().join("missing")).is_empty());
	}

	#[test]
	fn only_videos_are_candidates() {
		let dir = tempfile::tempdir().unwrap();
		let a = touch(dir.path(), "a.mp4");
		let b = touch(dir.path(), "b.MKV");
		touch(dir.path(), "notes.txt");
		touch(dir.path(), "noext");
		fs::create_dir(dir.path().join("sub.mp4")).unwrap();

		assert_eq!(candidates(dir.path()), [a, b]);
	}

	#[test]
	fn empty_directory() {
		let dir = tempfile::tempdir().unwrap();
		let mut rng = StdRng::seed_from_u64(1);

		assert_eq!(select(&Settings::default(), dir.path(), &[], &mut rng), None);
		assert_eq!(select(&fixed("a.mp4"), dir.path(), &[], &mut rng), None);
	}

	#[test]
	fn named_clip() {
		let dir = tempfile::tempdir().unwrap();
		touch(dir.path(), "a.mp4");
		let b = touch(dir.path(), "b.mp4");
		let clips = candidates(dir.path());

		assert_eq!(
			select(&fixed("b.mp4"), dir.path(), &clips, &mut StdRng::seed_from_u64(1)),
			Some(b)
		);
	}

	#[test]
	fn named_clip_falls_back_to_default() {
		let dir = tempfile::tempdir().unwrap();
		touch(dir.path(), "a.mp4");
		let default = touch(dir.path(), Settings::DEFAULT_INTRO);
		let clips = candidates(dir.path());

		assert_eq!(
			select(&fixed("missing.mp4"), dir.path(), &clips, &mut StdRng::seed_from_u64(1)),
			Some(default)
		);
	}

	#[test]
	fn named_clip_and_default_missing() {
		let dir = tempfile::tempdir().unwrap();
		touch(dir.path(), "a.mp4");
		let clips = candidates(dir.path());

		assert_eq!(
			select(&fixed("missing.mp4"), dir.path(), &clips, &mut StdRng::seed_from_u64(1)),
			None
		);
	}

	#[test]
	fn random_clip() {
		let dir = tempfile::tempdir().unwrap();
		let clips: Vec<_> = ["a.mp4", "b.mp4", "c.webm"]
			.into_iter()
			.map(|name| touch(dir.path(), name))
			.collect();
		let settings = Settings::default();
		let mut rng = StdRng::seed_from_u64(7);
		let mut seen = HashSet::new();

		for _ in 0..200 {
			let clip = select(&settings, dir.path(), &clips, &mut rng).unwrap();
			assert!(clips.contains(&clip));
			seen.insert(clip);
		}
		assert_eq!(seen.len(), clips.len());
	}

	#[test]
	fn custom_directory() {
		let layout = Layout::new("/opt/retrobat", None);
		let custom = Settings {
			intro_file_path: IntroDirectory::Custom(PathBuf::from("/srv/videos")),
			..Settings::default()
		};

		assert_eq!(directory(&Settings::default(), &layout), layout.default_video_dir);
		assert_eq!(directory(&custom, &layout), PathBuf::from("/srv/videos"));
	}

	#[test]
	fn choose_from_layout() {
		let root = tempfile::tempdir().unwrap();
		let layout = Layout::new(root.path(), None);

		assert_eq!(choose_clip(&fixed("a.mp4"), &layout), None);

		fs::create_dir_all(&layout.default_video_dir).unwrap();
		let clip = touch(&layout.default_video_dir, "a.mp4");

		assert_eq!(choose_clip(&fixed("a.mp4"), &layout), Some(clip.clone()));
		assert_eq!(choose_clip(&Settings::default(), &layout), Some(clip));
	}
}
