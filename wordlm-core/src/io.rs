use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole corpus file into a single string.
///
/// Line endings are kept as-is; `\r\n` is normalised to `\n` so framing
/// splits lines the same way on every platform.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.replace("\r\n", "\n"))
}

/// Path of the model cache written beside a corpus.
///
/// The corpus stem is kept and only the extension changes, so
/// `data/hamlet.txt` caches to `data/hamlet.bin`. A bare file name caches
/// into the current folder.
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let corpus_path = input_path.as_ref();
	let stem = corpus_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "corpus path has no file name"))?;

	let folder = corpus_path.parent().unwrap_or_else(|| Path::new("."));
	Ok(folder.join(stem).with_extension(output_extension))
}

/// Resolves the corpus folder handed to the server.
///
/// `"."` and `"./"` become the absolute working directory so log lines
/// show where corpora are read from; anything else is used unchanged.
pub fn normalize_folder(input: &str) -> PathBuf {
	match input {
		"." | "./" => env::current_dir().unwrap_or_else(|_| PathBuf::from(input)),
		_ => PathBuf::from(input),
	}
}

/// Lists the stems of all files with a given extension in a directory.
///
/// `hamlet.txt` is listed as `hamlet`. The result is sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(stem) = path.file_stem() {
				files.push(stem.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let out = build_output_path("data/hamlet.txt", "bin").unwrap();
		assert_eq!(out, PathBuf::from("data/hamlet.bin"));
	}

	#[test]
	fn output_path_without_parent() {
		let out = build_output_path("hamlet.txt", "bin").unwrap();
		assert_eq!(out, PathBuf::from("hamlet.bin"));
	}

	#[test]
	fn non_dot_folder_is_kept() {
		assert_eq!(normalize_folder("data"), PathBuf::from("data"));
	}

	#[test]
	fn dot_folder_resolves_to_working_dir() {
		let cwd = env::current_dir().unwrap();
		assert_eq!(normalize_folder("."), cwd);
		assert_eq!(normalize_folder("./"), cwd);
	}

	#[test]
	fn cache_path_stays_in_corpus_folder() {
		let out = build_output_path("corpora/sonnets.v2.txt", "bin").unwrap();
		assert_eq!(out, PathBuf::from("corpora/sonnets.v2.bin"));
		assert!(build_output_path("", "bin").is_err());
	}

	#[test]
	fn corpus_and_listing_round_trip() {
		let dir = env::temp_dir().join(format!("wordlm-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join("b.txt"), "one\r\ntwo").unwrap();
		fs::write(dir.join("a.txt"), "x").unwrap();
		fs::write(dir.join("a.bin"), [0u8]).unwrap();

		assert_eq!(list_files(&dir, "txt").unwrap(), vec!["a", "b"]);
		assert_eq!(read_corpus(dir.join("b.txt")).unwrap(), "one\ntwo");

		fs::remove_dir_all(&dir).unwrap();
	}
}
