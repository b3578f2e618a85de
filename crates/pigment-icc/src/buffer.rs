//! Whole-image transforms over interleaved float buffers.

use crate::{Alpha, IccError, IccResult, Intent, Profile, Transform, TransformOptions};

/// Converts interleaved premultiplied float images between profiles.
///
/// Input pixels are the source profile's channels followed by alpha, with
/// the color premultiplied. Output pixels are the destination channels plus
/// straight alpha; run [`premultiply`] on the result to get back to a
/// premultiplied layout.
///
/// # Example
///
/// ```rust
/// use pigment_icc::{BufferTransform, Profile};
///
/// let t = BufferTransform::new(&Profile::srgb(), &Profile::srgb(), None, false).unwrap();
/// let input = [0.25f32, 0.25, 0.25, 0.5];
/// let mut output = [0f32; 4];
/// t.apply(&input, &mut output, 1, 1, 0, 0).unwrap();
/// assert!((output[0] - 0.5).abs() < 1e-3);
/// assert_eq!(output[3], 0.5);
/// ```
pub struct BufferTransform {
    transform: Transform<f32>,
}

impl BufferTransform {
    /// Creates a buffer transform.
    ///
    /// # Arguments
    ///
    /// * `from` - Profile the pixels start in
    /// * `to` - Profile the pixels end up in
    /// * `proof` - Optional device to simulate (for example a CMYK press)
    ///   and the intent used towards it
    /// * `gamut_warning` - Paint colors the proofing device cannot reproduce
    ///   with the alarm color
    pub fn new(
        from: &Profile,
        to: &Profile,
        proof: Option<(&Profile, Intent)>,
        gamut_warning: bool,
    ) -> IccResult<Self> {
        let options = TransformOptions {
            intent: Intent::Perceptual,
            alpha: Alpha::Premultiplied,
            proof: proof.map(|(profile, _)| profile),
            proof_intent: proof.map_or(Intent::Perceptual, |(_, intent)| intent),
            gamut_warning,
        };
        Ok(Self { transform: Transform::with_options(from, to, options)? })
    }

    /// Samples per input pixel, alpha included.
    pub fn pixel_in(&self) -> usize {
        self.transform.channels_in() + 1
    }

    /// Samples per output pixel, alpha included.
    pub fn pixel_out(&self) -> usize {
        self.transform.channels_out() + 1
    }

    /// Transforms a `width` x `height` image from `input` into `output`.
    ///
    /// Strides are in samples per row; 0 means rows are tightly packed.
    /// Packed images go through lcms in one call, padded rows one call each.
    ///
    /// # Errors
    ///
    /// Fails when a stride is shorter than a row or a buffer is too small
    /// for `height` rows.
    pub fn apply(
        &self,
        input: &[f32],
        output: &mut [f32],
        width: usize,
        height: usize,
        stride_in: usize,
        stride_out: usize,
    ) -> IccResult<()> {
        let row_in = width * self.pixel_in();
        let row_out = width * self.pixel_out();
        let stride_in = if stride_in == 0 { row_in } else { stride_in };
        let stride_out = if stride_out == 0 { row_out } else { stride_out };
        if stride_in < row_in {
            return Err(IccError::BufferSize { expected: row_in, actual: stride_in });
        }
        if stride_out < row_out {
            return Err(IccError::BufferSize { expected: row_out, actual: stride_out });
        }
        if height == 0 || width == 0 {
            return Ok(());
        }

        let needed_in = stride_in * (height - 1) + row_in;
        let needed_out = stride_out * (height - 1) + row_out;
        if input.len() < needed_in {
            return Err(IccError::BufferSize { expected: needed_in, actual: input.len() });
        }
        if output.len() < needed_out {
            return Err(IccError::BufferSize { expected: needed_out, actual: output.len() });
        }

        if stride_in == row_in && stride_out == row_out {
            return self
                .transform
                .transform_pixels(&input[..needed_in], &mut output[..needed_out]);
        }
        for row in 0..height {
            let src = &input[row * stride_in..row * stride_in + row_in];
            let dst = &mut output[row * stride_out..row * stride_out + row_out];
            self.transform.transform_pixels(src, dst)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BufferTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferTransform")
            .field("pixel_in", &self.pixel_in())
            .field("pixel_out", &self.pixel_out())
            .finish()
    }
}

/// Interleaves several RGBA float planes into one buffer of `channels`
/// color samples plus alpha per pixel.
///
/// Each plane holds 4 samples per pixel. Color samples are taken three at a
/// time from each plane in turn until `channels` are collected; alpha comes
/// from the plane that completed the set. Used to feed four-channel spaces
/// such as CMYK from two RGBA surfaces.
pub fn splice(planes: &[&[f32]], pixels: usize, channels: usize) -> Vec<f32> {
    let mut memory = Vec::with_capacity((channels + 1) * pixels);
    for px in 0..pixels {
        let base = px * 4;
        let mut c_out = 0;
        for plane in planes {
            let Some(pixel) = plane.get(base..base + 4) else {
                continue;
            };
            for sample in &pixel[..3] {
                if c_out < channels {
                    memory.push(*sample);
                    c_out += 1;
                }
            }
            if c_out == channels {
                memory.push(pixel[3]);
                c_out += 1;
            }
        }
    }
    memory
}

/// Multiplies the color samples of the first `pixels` pixels by their
/// trailing alpha.
pub fn premultiply(buffer: &mut [f32], pixels: usize, channels: usize) {
    for pixel in buffer.chunks_exact_mut(channels + 1).take(pixels) {
        let alpha = pixel[channels];
        for sample in &mut pixel[..channels] {
            *sample *= alpha;
        }
    }
}
