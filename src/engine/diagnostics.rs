//! Parsing of the encoder's diagnostic text

use regex::{Captures, Regex};

use crate::domain::model::Dimensions;
use crate::error::EncodeResult;
use crate::ports::DiagnosticParser;
use crate::utils::time::clock_to_seconds;

/// Parser for ffmpeg's human-readable stderr output
#[derive(Debug, Clone)]
pub struct FfmpegTextParser {
    duration_re: Regex,
    time_re: Regex,
    video_stream_re: Regex,
}

impl FfmpegTextParser {
    pub fn new() -> EncodeResult<Self> {
        Ok(Self {
            duration_re: Regex::new(r"Duration: (\d{2,}):(\d{2}):(\d{2})\.(\d{2})")?,
            time_re: Regex::new(r"time=(\d{2,}):(\d{2}):(\d{2})\.(\d{2})")?,
            video_stream_re: Regex::new(r"Stream .* Video:.* (\d{2,5})x(\d{2,5})\b")?,
        })
    }
}

fn clock_from_captures(caps: &Captures<'_>) -> Option<f64> {
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    Some(clock_to_seconds(field(1)?, field(2)?, field(3)?, field(4)?))
}

impl DiagnosticParser for FfmpegTextParser {
    fn duration(&self, text: &str) -> f64 {
        self.duration_re
            .captures(text)
            .and_then(|caps| clock_from_captures(&caps))
            .unwrap_or(0.0)
    }

    fn elapsed(&self, line: &str) -> Option<f64> {
        self.time_re
            .captures(line)
            .and_then(|caps| clock_from_captures(&caps))
    }

    fn dimensions(&self, text: &str) -> Option<Dimensions> {
        text.lines().find_map(|line| {
            let caps = self.video_stream_re.captures(line)?;
            let width = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let height = caps.get(2)?.as_str().parse::<u32>().ok()?;
            (width > 0 && height > 0).then_some(Dimensions { width, height })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_OUTPUT: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:30.50, start: 0.000000, bitrate: 2205 kb/s
    Stream #0:0(und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(tv, bt709), 1920x1080 [SAR 1:1 DAR 16:9], 2071 kb/s, 30 fps, 30 tbr, 15360 tbn (default)
    Stream #0:1(und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s (default)
At least one output file must be specified";

    fn parser() -> FfmpegTextParser {
        FfmpegTextParser::new().unwrap()
    }

    #[test]
    fn test_duration() {
        assert_eq!(parser().duration("Duration: 00:01:30.50"), 90.5);
        assert_eq!(parser().duration(PROBE_OUTPUT), 90.5);
    }

    #[test]
    fn test_duration_absent_is_zero() {
        assert_eq!(parser().duration("clip.mp4: No such file or directory"), 0.0);
        assert_eq!(parser().duration("Duration: N/A, bitrate: N/A"), 0.0);
        assert_eq!(parser().duration(""), 0.0);
    }

    #[test]
    fn test_elapsed() {
        let line = "frame=  900 fps=120 q=28.0 size=1024kB time=00:00:45.00 bitrate=186.4kbits/s speed=4x";
        assert_eq!(parser().elapsed(line), Some(45.0));
        assert_eq!(parser().elapsed("time=01:00:00.25"), Some(3600.25));
    }

    #[test]
    fn test_elapsed_absent() {
        assert_eq!(parser().elapsed("frame=    0 fps=0.0 q=0.0 size=0kB time=N/A"), None);
        assert_eq!(parser().elapsed("Press [q] to stop"), None);
    }

    #[test]
    fn test_dimensions_from_first_video_stream() {
        let dims = parser().dimensions(PROBE_OUTPUT).unwrap();
        assert_eq!(dims, Dimensions { width: 1920, height: 1080 });
    }

    #[test]
    fn test_dimensions_absent_for_audio_only() {
        let text = "  Stream #0:0: Audio: mp3, 44100 Hz, stereo, fltp, 320 kb/s";
        assert_eq!(parser().dimensions(text), None);
    }

    #[test]
    fn test_long_running_hours_field() {
        assert_eq!(parser().duration("Duration: 100:00:00.00"), 360000.0);
    }
}
