//! Fakes shared by the speech unit tests.

use super::error::{SpeechApiError, SynthesisError, SynthesisErrorKind};
use super::model::{SpeechModel, Voice};
use crate::infrastructure::repositories::SpeechRepository;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, mono, no CRC
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
pub(crate) const FRAME_LEN: usize = 417;
pub(crate) const FRAMES_PER_CALL: usize = 8;

/// Silent MP3 frames; the last byte of every frame is ancillary data set to `marker`
pub(crate) fn silent_mp3(frames: usize, marker: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&FRAME_HEADER);
        frame[FRAME_LEN - 1] = marker;
        data.extend_from_slice(&frame);
    }
    data
}

/// Markers of consecutive frames in a stream written by `silent_mp3`
pub(crate) fn frame_markers(data: &[u8]) -> Vec<u8> {
    data.chunks(FRAME_LEN).map(|frame| frame[FRAME_LEN - 1]).collect()
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Ok,
    Fail(SynthesisErrorKind),
    WriteThenFail(SynthesisErrorKind),
    /// Succeeds but writes bytes no decoder accepts
    Garbage,
}

/// Speech repository replaying a fixed script of outcomes
pub(crate) struct ScriptedSpeechRepository {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
}

impl ScriptedSpeechRepository {
    pub(crate) fn new(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
            fallback,
        }
    }

    pub(crate) fn always_ok() -> Self {
        Self::new(Vec::new(), Step::Ok)
    }

    pub(crate) fn always_fail(kind: SynthesisErrorKind) -> Self {
        Self::new(Vec::new(), Step::Fail(kind))
    }

    pub(crate) fn fail_then_succeed(kinds: Vec<SynthesisErrorKind>) -> Self {
        Self::new(kinds.into_iter().map(Step::Fail).collect(), Step::Ok)
    }

    pub(crate) fn write_then_fail(kind: SynthesisErrorKind) -> Self {
        Self::new(Vec::new(), Step::WriteThenFail(kind))
    }

    /// Succeeds on every call except the `n`-th (1-based)
    pub(crate) fn fail_on_call(n: usize, kind: SynthesisErrorKind) -> Self {
        let mut script = vec![Step::Ok; n.saturating_sub(1)];
        script.push(Step::Fail(kind));
        Self::new(script, Step::Ok)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechRepository for ScriptedSpeechRepository {
    async fn stream_speech(
        &self,
        text: &str,
        _model: SpeechModel,
        _voice: Voice,
        destination: &Path,
    ) -> Result<u64, SpeechApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);

        let marker = text.bytes().next().unwrap_or(0);
        let audio = silent_mp3(FRAMES_PER_CALL, marker);

        match step {
            Step::Ok => {
                tokio::fs::write(destination, &audio).await?;
                Ok(audio.len() as u64)
            }
            Step::Fail(kind) => Err(SynthesisError::new(kind, "scripted failure").into()),
            Step::WriteThenFail(kind) => {
                tokio::fs::write(destination, &audio[..FRAME_LEN]).await?;
                Err(SynthesisError::new(kind, "scripted failure mid-body").into())
            }
            Step::Garbage => {
                let garbage = b"definitely not mpeg audio";
                tokio::fs::write(destination, garbage).await?;
                Ok(garbage.len() as u64)
            }
        }
    }
}
