//! WAV framing for raw PCM returned by the speech model.

/// Sample rate of generated speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Channels of generated speech.
pub const SPEECH_CHANNELS: u16 = 1;
/// Bits per sample of generated speech.
pub const SPEECH_BITS_PER_SAMPLE: u16 = 16;

const HEADER_LEN: usize = 44;

/// Prefix little-endian PCM samples with a canonical 44-byte RIFF/WAVE header.
#[must_use]
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}
