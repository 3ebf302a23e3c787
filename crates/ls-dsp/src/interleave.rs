//! Interleaved ↔ split stereo helpers

/// Split an interleaved L/R buffer into separate channel buffers.
///
/// Returns `false` (outputs untouched) if `samples_per_channel` is zero or
/// any buffer is too short.
pub fn deinterleave_stereo(input: &[f32], out_l: &mut [f32], out_r: &mut [f32], samples_per_channel: usize) -> bool {
    if samples_per_channel == 0
        || input.len() < samples_per_channel * 2
        || out_l.len() < samples_per_channel
        || out_r.len() < samples_per_channel
    {
        return false;
    }

    for (i, frame) in input.chunks_exact(2).take(samples_per_channel).enumerate() {
        out_l[i] = frame[0];
        out_r[i] = frame[1];
    }
    true
}

/// Interleave two channel buffers into one L/R buffer.
///
/// Returns the number of frames written.
pub fn interleave_stereo(in_l: &[f32], in_r: &[f32], output: &mut [f32]) -> usize {
    let frames = in_l.len().min(in_r.len()).min(output.len() / 2);
    for i in 0..frames {
        output[i * 2] = in_l[i];
        output[i * 2 + 1] = in_r[i];
    }
    frames
}
