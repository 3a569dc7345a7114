use super::error::StitchError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use symphonia::core::codecs::{CodecType, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Stream parameters every segment must share with the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentFormat {
    codec: CodecType,
    sample_rate: Option<u32>,
    channels: Option<usize>,
}

/// Concatenate MP3 chunk files, in order, into `destination`.
///
/// A single file is renamed as-is. Several files are demuxed and decoded
/// frame by frame; the validated MPEG frames are written out unchanged, so
/// the result is one continuous MP3 stream without a lossy re-encode. Chunk
/// files are deleted once the output is complete and left untouched on
/// failure.
///
/// Blocking; call it from `spawn_blocking` inside async code.
pub fn stitch(chunk_files: &[PathBuf], destination: &Path) -> Result<u64, StitchError> {
    match chunk_files {
        [] => Err(StitchError::Empty),
        [single] => {
            std::fs::rename(single, destination)?;
            Ok(std::fs::metadata(destination)?.len())
        }
        files => {
            let size = match write_frames(files, destination) {
                Ok(size) => size,
                Err(e) => {
                    let _ = std::fs::remove_file(destination);
                    return Err(e);
                }
            };

            for file in files {
                if let Err(e) = std::fs::remove_file(file) {
                    tracing::warn!(path = %file.display(), error = %e, "Failed to remove chunk file");
                }
            }

            tracing::info!(
                segments = files.len(),
                size_bytes = size,
                destination = %destination.display(),
                "Audio segments stitched"
            );
            Ok(size)
        }
    }
}

fn write_frames(files: &[PathBuf], destination: &Path) -> Result<u64, StitchError> {
    let mut output = BufWriter::new(File::create(destination)?);
    let mut reference = None;
    let mut written = 0;

    for path in files {
        written += append_segment(path, &mut output, &mut reference)?;
    }

    output.flush()?;
    Ok(written)
}

fn append_segment(
    path: &Path,
    output: &mut impl Write,
    reference: &mut Option<SegmentFormat>,
) -> Result<u64, StitchError> {
    let decode_error = |message: String| StitchError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| decode_error(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(e.to_string()))?;
    let mut format = probed.format;

    let codec_params = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| (t.id, t.codec_params.clone()))
        .ok_or_else(|| decode_error("no audio track found".to_string()));
    let (track_id, codec_params) = codec_params?;

    let segment = SegmentFormat {
        codec: codec_params.codec,
        sample_rate: codec_params.sample_rate,
        channels: codec_params.channels.map(|c| c.count()),
    };
    match reference {
        None => *reference = Some(segment),
        Some(expected) if *expected != segment => {
            return Err(StitchError::Incompatible {
                path: path.to_path_buf(),
                message: format!(
                    "sample rate {:?} / {:?} channels, expected {:?} / {:?}",
                    segment.sample_rate, segment.channels, expected.sample_rate, expected.channels
                ),
            });
        }
        Some(_) => {}
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(e.to_string()))?;

    let mut written = 0;
    let mut frames = 0;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(decode_error(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map(|_| ());
        if !accept_packet(decoded).map_err(|e| decode_error(e.to_string()))? {
            tracing::warn!(path = %path.display(), "Skipping undecodable frame");
            continue;
        }

        output.write_all(&packet.data)?;
        written += packet.data.len() as u64;
        frames += 1;
    }

    if frames == 0 {
        return Err(decode_error("no audio frames".to_string()));
    }

    tracing::debug!(path = %path.display(), frames, bytes = written, "Segment appended");
    Ok(written)
}

/// Whether a packet goes to the output. Corrupt frames are dropped; other
/// decoder errors end the stitch.
fn accept_packet(decoded: symphonia::core::errors::Result<()>) -> Result<bool, SymphoniaError> {
    match decoded {
        Ok(()) => Ok(true),
        Err(SymphoniaError::DecodeError(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
