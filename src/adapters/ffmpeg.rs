use std::path::Path;

use sheetcast_av::ToolRegistry;
use sheetcast_core::config::{ToolsConfig, TranscodeConfig};
use sheetcast_core::Result;

use super::Transcoder;

/// Transcodes to web MP4 with the ffmpeg found by the [`ToolRegistry`].
pub struct FfmpegTranscoder {
    tools: ToolRegistry,
    config: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(tools: ToolRegistry, config: TranscodeConfig) -> Self {
        Self { tools, config }
    }

    /// Discover ffmpeg using the configured override or `PATH`.
    pub fn discover(tools: &ToolsConfig, config: TranscodeConfig) -> Self {
        Self::new(ToolRegistry::discover(tools), config)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

#[async_trait::async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        sheetcast_av::transcode_web_mp4(&self.tools, input, output, &self.config).await
    }
}
