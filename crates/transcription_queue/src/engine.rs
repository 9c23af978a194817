use crate::audio::AudioFormat;
use crate::error::EngineError;
use crate::job::JobInput;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Speech-to-text collaborator invoked by workers. Implementations return subtitle text.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
	async fn transcribe(&self, input: &JobInput) -> Result<String, EngineError>;

	fn name(&self) -> &str;
}

/// Runs an external transcription program once per job.
///
/// The payload is written to a scratch directory and the argument template is expanded with:
/// - `{input}`: path of the audio file
/// - `{output}`: output path stem; if `{output}.vtt` exists afterwards it is the result
/// - `{language}`: the language hint, or `auto`
///
/// Without an output file the program's stdout is taken as the subtitle text.
#[derive(Debug, Clone)]
pub struct CommandEngine {
	program: String,
	args: Vec<String>,
}

impl CommandEngine {
	pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
		Self { program: program.into(), args }
	}

	fn expand(&self, input: &Path, output: &Path, language: &str) -> Vec<String> {
		let input = input.to_string_lossy();
		let output = output.to_string_lossy();
		self.args
			.iter()
			.map(|arg| arg.replace("{input}", &input).replace("{output}", &output).replace("{language}", language))
			.collect()
	}
}

#[async_trait]
impl TranscriptionEngine for CommandEngine {
	async fn transcribe(&self, input: &JobInput) -> Result<String, EngineError> {
		let scratch = tempfile::tempdir()?;
		let ext = AudioFormat::resolve(&input.audio, &input.filename).map_or("bin", AudioFormat::extension);
		let audio_path = scratch.path().join(format!("input.{ext}"));
		let output_stem = scratch.path().join("output");
		tokio::fs::write(&audio_path, &input.audio).await?;

		let args = self.expand(&audio_path, &output_stem, input.language.as_deref().unwrap_or("auto"));
		debug!(program = %self.program, ?args, "spawning transcription process");

		let output = Command::new(&self.program)
			.args(&args)
			.stdin(Stdio::null())
			.kill_on_drop(true)
			.output()
			.await?;

		if !output.status.success() {
			return Err(EngineError::ProcessFailed {
				code: output.status.code(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
			});
		}

		let vtt_path = output_stem.with_extension("vtt");
		let text = if tokio::fs::try_exists(&vtt_path).await? {
			tokio::fs::read_to_string(&vtt_path).await?
		} else {
			String::from_utf8_lossy(&output.stdout).into_owned()
		};

		if text.trim().is_empty() {
			return Err(EngineError::EmptyOutput);
		}
		Ok(text)
	}

	fn name(&self) -> &str {
		&self.program
	}
}
