//! Encoder argument construction

use std::path::Path;

use crate::domain::model::*;

/// Build the full encoder argument vector (program name excluded).
///
/// Pure and deterministic. Layout:
/// `-i <input> -v warning -stats [size] -c:v <codec> [-b:v <rate>] -crf <q>
/// -c:a <audio> -f <muxer> <output>`
pub fn build_args(
    input: &Path,
    size: &SizePreset,
    bitrate: &BitratePreset,
    format: &FormatPreset,
    output: &Path,
) -> Vec<String> {
    let family = format.family;
    let mut args: Vec<String> = vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-v".into(),
        "warning".into(),
        "-stats".into(),
    ];

    match size.transform {
        SizeTransform::Original => {}
        SizeTransform::ConstrainWidth { .. } | SizeTransform::ConstrainHeight { .. } => {
            if let Some(filter) = size.transform.scale_filter() {
                args.push("-vf".into());
                args.push(filter);
            }
        }
        SizeTransform::Fixed { width, height } => {
            args.push("-s".into());
            args.push(format!("{}x{}", width, height));
        }
    }

    args.push("-c:v".into());
    args.push(format.video_codec.clone());

    if let Some(rate) = bitrate.policy.encoder_token() {
        args.push("-b:v".into());
        args.push(rate);
    }
    args.push("-crf".into());
    args.push(family.quality_factor().to_string());

    args.push("-c:a".into());
    args.push(family.audio_codec().into());

    args.push("-f".into());
    args.push(family.muxer().into());
    args.push(output.to_string_lossy().into_owned());

    args
}

/// Argument vector for a resolved job
pub fn build_job_args(job: &EncodeJob) -> Vec<String> {
    build_args(
        job.input(),
        job.size(),
        job.bitrate(),
        job.format(),
        job.output(),
    )
}

/// Human-readable command line, quoting arguments that contain whitespace
pub fn render_command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.to_string_lossy().into_owned())
        .chain(args.iter().cloned())
        .map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
