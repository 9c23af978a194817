use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use transcription_queue::QueueConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "transcription-server")]
#[command(about = "Queue audio uploads and serve WebVTT subtitles once transcribed", long_about = None)]
pub struct Config {
	/// Address to bind
	#[arg(long, env = "HOST", default_value = "0.0.0.0")]
	pub host: IpAddr,

	/// Port to listen on
	#[arg(long, env = "PORT", default_value = "8000")]
	pub port: u16,

	#[command(flatten)]
	pub queue: QueueConfig,

	/// Transcription program run once per job
	#[arg(long, env = "WHISPER_CMD", default_value = "whisper-cli")]
	pub whisper_cmd: String,

	/// Argument template; {input}, {output} and {language} are substituted per job
	#[arg(long, env = "WHISPER_ARGS", allow_hyphen_values = true, default_value = "-m models/ggml-base.bin -l {language} -ovtt -of {output} -f {input}")]
	pub whisper_args: String,

	/// Largest accepted upload, in megabytes
	#[arg(long, env = "MAX_UPLOAD_MB", default_value = "100")]
	pub max_upload_mb: usize,

	/// How long to wait for in-flight jobs when shutting down
	#[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value = "30")]
	pub shutdown_timeout_secs: u64,

	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	#[arg(long, env = "LOG_JSON", default_value_t = false)]
	pub log_json: bool,
}

impl Config {
	/// Validate configuration values
	///
	/// # Errors
	/// Returns a description of the first invalid setting
	pub fn validate(&self) -> Result<(), String> {
		self.queue.validate().map_err(|e| e.to_string())?;

		if self.whisper_cmd.trim().is_empty() {
			return Err("whisper_cmd must not be empty".to_string());
		}

		if self.max_upload_mb == 0 {
			return Err("max_upload_mb must be greater than 0".to_string());
		}

		Ok(())
	}

	#[must_use]
	pub fn whisper_args(&self) -> Vec<String> {
		self.whisper_args.split_whitespace().map(str::to_owned).collect()
	}

	#[must_use]
	pub const fn socket_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}

	#[must_use]
	pub const fn max_upload_bytes(&self) -> usize {
		self.max_upload_mb.saturating_mul(1024 * 1024)
	}

	#[must_use]
	pub const fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::try_parse_from(["transcription-server"]).unwrap();
		assert_eq!(config.socket_addr(), "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
		assert_eq!(config.queue, QueueConfig::default());
		assert_eq!(config.max_upload_bytes(), 100 * 1024 * 1024);
		assert_eq!(config.whisper_args().last().map(String::as_str), Some("{input}"));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_queue_flags_are_flattened() {
		let config = Config::try_parse_from(["transcription-server", "--queue-workers", "0", "--max-queue-size", "7"]).unwrap();
		assert_eq!(config.queue.max_queue_size, 7);
		assert!(config.validate().unwrap_err().contains("queue_workers"));
	}

	#[test]
	fn test_whisper_args_split_on_whitespace() {
		let config = Config::try_parse_from(["transcription-server", "--whisper-args", " -f  {input}\t--vtt "]).unwrap();
		assert_eq!(config.whisper_args(), vec!["-f", "{input}", "--vtt"]);
	}
}
