use serde::Serialize;
use std::path::Path;

/// Container formats accepted for transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
	Mp3,
	Wav,
	M4a,
	Flac,
	Ogg,
	Aac,
	Mp4,
	Webm,
}

/// Extensions accepted from an upload filename when the payload cannot be sniffed.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "flac", "ogg", "aac"];

impl AudioFormat {
	/// Sniffs the container from magic bytes. Needs at least 12 bytes.
	#[must_use]
	pub fn detect(data: &[u8]) -> Option<Self> {
		if data.len() < 12 {
			return None;
		}

		if data.starts_with(b"ID3") || matches!(&data[..2], [0xFF, 0xFB | 0xF3 | 0xF2]) {
			return Some(Self::Mp3);
		}
		if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
			return Some(Self::Wav);
		}
		if data.starts_with(b"OggS") {
			return Some(Self::Ogg);
		}
		if data.starts_with(b"fLaC") {
			return Some(Self::Flac);
		}
		if &data[4..8] == b"ftyp" {
			let brand = &data[8..data.len().min(20)];
			if contains(brand, b"M4A") || contains(brand, b"mp42") {
				return Some(Self::M4a);
			}
			return Some(Self::Mp4);
		}
		if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
			return Some(Self::Webm);
		}

		None
	}

	#[must_use]
	pub fn from_filename(filename: &str) -> Option<Self> {
		let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
		match ext.as_str() {
			"mp3" => Some(Self::Mp3),
			"wav" => Some(Self::Wav),
			"m4a" => Some(Self::M4a),
			"flac" => Some(Self::Flac),
			"ogg" => Some(Self::Ogg),
			"aac" => Some(Self::Aac),
			_ => None,
		}
	}

	/// Payload bytes win over the filename; the name is only a fallback.
	#[must_use]
	pub fn resolve(data: &[u8], filename: &str) -> Option<Self> {
		Self::detect(data).or_else(|| Self::from_filename(filename))
	}

	#[must_use]
	pub const fn extension(self) -> &'static str {
		match self {
			Self::Mp3 => "mp3",
			Self::Wav => "wav",
			Self::M4a => "m4a",
			Self::Flac => "flac",
			Self::Ogg => "ogg",
			Self::Aac => "aac",
			Self::Mp4 => "mp4",
			Self::Webm => "webm",
		}
	}
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn padded(prefix: &[u8]) -> Vec<u8> {
		let mut data = prefix.to_vec();
		data.resize(32, 0);
		data
	}

	#[test]
	fn test_detect_magic_bytes() {
		assert_eq!(AudioFormat::detect(&padded(b"ID3\x03")), Some(AudioFormat::Mp3));
		assert_eq!(AudioFormat::detect(&padded(&[0xFF, 0xFB, 0x90])), Some(AudioFormat::Mp3));
		assert_eq!(AudioFormat::detect(&padded(b"RIFF\x24\x08\x00\x00WAVEfmt ")), Some(AudioFormat::Wav));
		assert_eq!(AudioFormat::detect(&padded(b"OggS\x00\x02")), Some(AudioFormat::Ogg));
		assert_eq!(AudioFormat::detect(&padded(b"fLaC\x00\x00\x00\x22")), Some(AudioFormat::Flac));
		assert_eq!(AudioFormat::detect(&padded(b"\x00\x00\x00\x20ftypM4A ")), Some(AudioFormat::M4a));
		assert_eq!(AudioFormat::detect(&padded(b"\x00\x00\x00\x20ftypisom")), Some(AudioFormat::Mp4));
		assert_eq!(AudioFormat::detect(&padded(&[0x1A, 0x45, 0xDF, 0xA3])), Some(AudioFormat::Webm));
	}

	#[test]
	fn test_short_or_unknown_payload() {
		assert_eq!(AudioFormat::detect(b"ID3"), None);
		assert_eq!(AudioFormat::detect(&padded(b"%PDF-1.7")), None);
	}

	#[test]
	fn test_riff_without_wave_is_not_wav() {
		assert_eq!(AudioFormat::detect(&padded(b"RIFF\x00\x00\x00\x00AVI ")), None);
	}

	#[test]
	fn test_filename_fallback() {
		assert_eq!(AudioFormat::from_filename("Lecture.MP3"), Some(AudioFormat::Mp3));
		assert_eq!(AudioFormat::from_filename("voice.aac"), Some(AudioFormat::Aac));
		assert_eq!(AudioFormat::from_filename("notes.txt"), None);
		assert_eq!(AudioFormat::from_filename("no_extension"), None);

		assert_eq!(AudioFormat::resolve(b"short", "clip.ogg"), Some(AudioFormat::Ogg));
		assert_eq!(AudioFormat::resolve(&padded(b"fLaC"), "clip.ogg"), Some(AudioFormat::Flac));
		assert_eq!(AudioFormat::resolve(b"short", "clip.exe"), None);
	}

	#[test]
	fn test_supported_extensions_all_parse() {
		for ext in SUPPORTED_EXTENSIONS {
			let format = AudioFormat::from_filename(&format!("x.{ext}")).unwrap();
			assert_eq!(format.extension(), ext);
		}
	}
}
