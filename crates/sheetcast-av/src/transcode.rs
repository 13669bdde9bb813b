//! Web MP4 (H.264/AAC-LC) encoding using ffmpeg.

use std::ffi::OsString;
use std::path::Path;

use sheetcast_core::config::TranscodeConfig;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Build the ffmpeg argument list for a web-friendly MP4.
///
/// Constant frame rate, 8-bit 4:2:0 video and 44.1 kHz AAC keep the output
/// playable inline on phones and in browsers; `+faststart` moves the moov
/// atom to the front for progressive download.
pub fn web_mp4_args(input: &Path, output: &Path, config: &TranscodeConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

    let crf = config.video_crf.to_string();
    let filter = format!("fps={},format=yuv420p", config.frame_rate);
    let sample_rate = config.audio_sample_rate.to_string();

    for a in [
        "-c:v",
        "libx264",
        "-preset",
        config.video_preset.as_str(),
        "-crf",
        crf.as_str(),
        "-vf",
        filter.as_str(),
        "-c:a",
        "aac",
        "-b:a",
        config.audio_bitrate.as_str(),
        "-ar",
        sample_rate.as_str(),
        "-movflags",
        "+faststart",
        "-threads",
        "0",
    ] {
        args.push(a.into());
    }

    args.push(output.into());
    args
}

/// Transcode `input` into a web MP4 at `output`.
///
/// # Errors
///
/// Fails if ffmpeg is missing, exits non-zero (malformed input), or runs past
/// [`TranscodeConfig::timeout`].
pub async fn transcode_web_mp4(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    config: &TranscodeConfig,
) -> sheetcast_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;

    tracing::info!(
        "Web MP4 encode: {:?} -> {:?} (crf={}, preset={}, fps={})",
        input,
        output,
        config.video_crf,
        config.video_preset,
        config.frame_rate,
    );

    ToolCommand::new(ffmpeg.path.clone())
        .timeout(config.timeout())
        .args(web_mp4_args(input, output, config))
        .execute()
        .await?;

    Ok(())
}
