//! Color transforms between ICC profiles.

use crate::format::{pixel_format, Alpha, Sample};
use crate::profile::with_handles;
use crate::{IccError, IccResult, Intent, Profile};
use lcms2::{Flags, PixelFormat, Profile as LcmsProfile, Transform as LcmsTransform};
use tracing::trace;

/// Options for [`Transform::with_options`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions<'a> {
    /// Rendering intent of the main conversion.
    pub intent: Intent,
    /// Alpha layout of the input. Premultiplied input produces straight output.
    pub alpha: Alpha,
    /// Simulate this device when converting (soft proofing).
    pub proof: Option<&'a Profile>,
    /// Intent used towards the proofing device.
    pub proof_intent: Intent,
    /// Mark colors the proofing device cannot reproduce with the alarm color.
    pub gamut_warning: bool,
}

/// Type-erased lcms transform over a fixed pixel size.
pub(crate) trait Kernel<T> {
    fn run(&self, input: &[T], output: &mut [T]);
}

struct Typed<T: Sample, const I: usize, const O: usize>(LcmsTransform<[T; I], [T; O]>);

impl<T: Sample, const I: usize, const O: usize> Kernel<T> for Typed<T, I, O> {
    fn run(&self, input: &[T], output: &mut [T]) {
        let src: &[[T; I]] = bytemuck::cast_slice(input);
        let dst: &mut [[T; O]] = bytemuck::cast_slice_mut(output);
        self.0.transform_pixels(src, dst);
    }
}

/// Everything lcms needs to build a transform, with the profile handles locked.
struct Request<'h> {
    from: &'h LcmsProfile,
    to: &'h LcmsProfile,
    proof: Option<&'h LcmsProfile>,
    input: PixelFormat,
    output: PixelFormat,
    intent: Intent,
    proof_intent: Intent,
    flags: Flags,
}

fn kernel<T: Sample>(req: &Request<'_>, pixel_in: usize, pixel_out: usize) -> IccResult<Box<dyn Kernel<T>>> {
    match pixel_in {
        1 => kernel_out::<T, 1>(req, pixel_out),
        2 => kernel_out::<T, 2>(req, pixel_out),
        3 => kernel_out::<T, 3>(req, pixel_out),
        4 => kernel_out::<T, 4>(req, pixel_out),
        5 => kernel_out::<T, 5>(req, pixel_out),
        6 => kernel_out::<T, 6>(req, pixel_out),
        n => Err(IccError::UnsupportedPixelSize(n)),
    }
}

fn kernel_out<T: Sample, const I: usize>(req: &Request<'_>, pixel_out: usize) -> IccResult<Box<dyn Kernel<T>>> {
    match pixel_out {
        1 => build::<T, I, 1>(req),
        2 => build::<T, I, 2>(req),
        3 => build::<T, I, 3>(req),
        4 => build::<T, I, 4>(req),
        5 => build::<T, I, 5>(req),
        6 => build::<T, I, 6>(req),
        n => Err(IccError::UnsupportedPixelSize(n)),
    }
}

fn build<T: Sample, const I: usize, const O: usize>(req: &Request<'_>) -> IccResult<Box<dyn Kernel<T>>> {
    let inner = match req.proof {
        Some(proof) => LcmsTransform::<[T; I], [T; O]>::new_proofing(
            req.from,
            req.input,
            req.to,
            req.output,
            proof,
            req.intent.into(),
            req.proof_intent.into(),
            req.flags,
        ),
        None => LcmsTransform::<[T; I], [T; O]>::new_flags(
            req.from,
            req.input,
            req.to,
            req.output,
            req.intent.into(),
            req.flags,
        ),
    }
    .map_err(|e| IccError::TransformFailed(e.to_string()))?;
    Ok(Box::new(Typed(inner)))
}

/// A color transform between two ICC profiles.
///
/// Pixels are flat runs of `T` samples: the profile's channels followed by
/// an alpha sample when the transform was built with one. Values use the
/// normalized float encoding (every color space but XYZ masked), so Lab
/// travels as `L/100, (a+128)/255, (b+128)/255`.
///
/// # Example
///
/// ```rust
/// use pigment_icc::{Intent, Profile, Transform};
///
/// let to_linear = Transform::<f64>::new(&Profile::srgb(), &Profile::linear_rgb(), Intent::Perceptual).unwrap();
///
/// let mut rgb = vec![0.5, 0.5, 0.5];
/// to_linear.apply(&mut rgb).unwrap();
/// assert!((rgb[0] - 0.214).abs() < 0.002);
/// ```
pub struct Transform<T: Sample = f64> {
    kernel: Box<dyn Kernel<T>>,
    input_format: PixelFormat,
    output_format: PixelFormat,
    channels_in: usize,
    channels_out: usize,
    alpha: Alpha,
}

impl<T: Sample> Transform<T> {
    /// Creates a transform between two profiles with color channels only.
    ///
    /// # Arguments
    ///
    /// * `from` - Source color profile
    /// * `to` - Destination color profile
    /// * `intent` - Rendering intent
    pub fn new(from: &Profile, to: &Profile, intent: Intent) -> IccResult<Self> {
        Self::with_options(from, to, TransformOptions { intent, ..Default::default() })
    }

    /// Creates a transform with alpha handling and optional soft proofing.
    ///
    /// Black point compensation follows the intent (see
    /// [`Intent::black_point_compensation`]); when proofing, the proof
    /// intent decides it.
    pub fn with_options(from: &Profile, to: &Profile, options: TransformOptions<'_>) -> IccResult<Self> {
        let output_alpha = match options.alpha {
            Alpha::None => Alpha::None,
            Alpha::Present | Alpha::Premultiplied => Alpha::Present,
        };
        let input = pixel_format::<T>(from, options.alpha, true)?;
        let output = pixel_format::<T>(to, output_alpha, true)?;

        let mut flags = Flags::default();
        let bpc = match options.proof {
            Some(_) => {
                flags = flags | Flags::SOFT_PROOFING;
                if options.gamut_warning {
                    flags = flags | Flags::GAMUT_CHECK;
                }
                options.proof_intent.black_point_compensation()
            }
            None => options.intent.black_point_compensation(),
        };
        if bpc {
            flags = flags | Flags::BLACKPOINT_COMPENSATION;
        }

        Self::build(
            from,
            to,
            options.proof,
            (input, output),
            (options.intent, options.proof_intent),
            flags,
            options.alpha,
        )
    }

    /// Builds a transform from fully specified formats and flags.
    fn build(
        from: &Profile,
        to: &Profile,
        proof: Option<&Profile>,
        (input, output): (PixelFormat, PixelFormat),
        (intent, proof_intent): (Intent, Intent),
        flags: Flags,
        alpha: Alpha,
    ) -> IccResult<Self> {
        let channels_in = from.channels();
        let channels_out = to.channels();
        let extra = alpha.extra();
        trace!(
            from = %from.name(false),
            to = %to.name(false),
            %intent,
            ?alpha,
            proof = proof.is_some(),
            "creating transform"
        );

        let mut profiles = vec![from, to];
        profiles.extend(proof);
        let kernel = with_handles(&profiles, |h| {
            let req = Request {
                from: h[0],
                to: h[1],
                proof: h.get(2).copied(),
                input,
                output,
                intent,
                proof_intent,
                flags,
            };
            kernel::<T>(&req, channels_in + extra, channels_out + extra)
        })?;

        Ok(Self { kernel, input_format: input, output_format: output, channels_in, channels_out, alpha })
    }

    /// Native format word of the input buffer.
    pub fn input_format(&self) -> PixelFormat {
        self.input_format
    }

    /// Native format word of the output buffer.
    pub fn output_format(&self) -> PixelFormat {
        self.output_format
    }

    /// Number of color channels per input pixel.
    pub fn channels_in(&self) -> usize {
        self.channels_in
    }

    /// Number of color channels per output pixel.
    pub fn channels_out(&self) -> usize {
        self.channels_out
    }

    /// Alpha layout of the input.
    pub fn alpha(&self) -> Alpha {
        self.alpha
    }

    /// Converts one color in place.
    ///
    /// `values` holds the input pixel. For transforms without alpha, one
    /// trailing value beyond the color channels is treated as opacity: it
    /// does not go through lcms and is re-appended unchanged. On success
    /// `values` holds the output pixel.
    ///
    /// # Errors
    ///
    /// Fails when `values` does not hold exactly one input pixel (plus the
    /// optional opacity).
    pub fn apply(&self, values: &mut Vec<f64>) -> IccResult<()> {
        let pixel_in = self.channels_in + self.alpha.extra();
        let opacity = if self.alpha == Alpha::None && values.len() == pixel_in + 1 {
            values.pop()
        } else {
            None
        };
        if values.len() != pixel_in {
            return Err(IccError::BufferSize { expected: pixel_in, actual: values.len() });
        }

        let input: Vec<T> = values.iter().map(|v| T::from_unit(*v)).collect();
        let mut output = vec![T::default(); self.channels_out + self.alpha.extra()];
        self.transform_pixels(&input, &mut output)?;

        values.clear();
        values.extend(output.into_iter().map(T::to_unit));
        values.extend(opacity);
        Ok(())
    }

    /// Transforms whole pixels from `input` into `output`.
    ///
    /// Alpha samples are copied from input to output unchanged.
    ///
    /// # Errors
    ///
    /// Fails when either buffer is not a whole number of pixels or the
    /// pixel counts differ.
    pub fn transform_pixels(&self, input: &[T], output: &mut [T]) -> IccResult<()> {
        let pixel_in = self.channels_in + self.alpha.extra();
        let pixel_out = self.channels_out + self.alpha.extra();
        if input.len() % pixel_in != 0 {
            return Err(IccError::BufferSize {
                expected: input.len() - input.len() % pixel_in,
                actual: input.len(),
            });
        }
        let expected = input.len() / pixel_in * pixel_out;
        if output.len() != expected {
            return Err(IccError::BufferSize { expected, actual: output.len() });
        }
        self.kernel.run(input, output);

        if self.alpha != Alpha::None {
            for (src, dst) in input.chunks_exact(pixel_in).zip(output.chunks_exact_mut(pixel_out)) {
                dst[pixel_out - 1] = src[pixel_in - 1];
            }
        }
        Ok(())
    }
}

impl<T: Sample> std::fmt::Debug for Transform<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("channels_in", &self.channels_in)
            .field("channels_out", &self.channels_out)
            .field("alpha", &self.alpha)
            .field("input_format", &self.input_format.0)
            .field("output_format", &self.output_format.0)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_srgb_to_lab_white() {
        let t = Transform::<f64>::new(&Profile::srgb(), &Profile::lab(), Intent::RelativeColorimetric).unwrap();
        let mut v = vec![1.0, 1.0, 1.0];
        t.apply(&mut v).unwrap();
        assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(v[1], 128.0 / 255.0, epsilon = 1e-3);
        assert_abs_diff_eq!(v[2], 128.0 / 255.0, epsilon = 1e-3);
    }

    #[test]
    fn test_opacity_passes_through() {
        let t = Transform::<f64>::new(&Profile::srgb(), &Profile::linear_rgb(), Intent::Perceptual).unwrap();
        let mut v = vec![1.0, 0.0, 0.0, 0.25];
        t.apply(&mut v).unwrap();
        assert_eq!(v.len(), 4);
        assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v[3], 0.25);
    }

    #[test]
    fn test_apply_rejects_wrong_size() {
        let t = Transform::<f64>::new(&Profile::srgb(), &Profile::lab(), Intent::Perceptual).unwrap();
        let mut v = vec![1.0, 0.0];
        assert!(matches!(
            t.apply(&mut v),
            Err(IccError::BufferSize { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_same_profile_both_ends() {
        let srgb = Profile::srgb();
        let t = Transform::<f32>::new(&srgb, &srgb, Intent::Perceptual).unwrap();
        let input = [0.2f32, 0.4, 0.6, 0.8, 0.1, 0.3];
        let mut output = [0f32; 6];
        t.transform_pixels(&input, &mut output).unwrap();
        for (a, b) in input.iter().zip(output.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_transform_pixels_checks_lengths() {
        let t = Transform::<f32>::new(&Profile::srgb(), &Profile::lab(), Intent::Perceptual).unwrap();
        let mut out = [0f32; 3];
        assert!(t.transform_pixels(&[0.0; 4], &mut out).is_err());
        assert!(t.transform_pixels(&[0.0; 6], &mut out).is_err());
    }

    #[test]
    fn test_alpha_copied() {
        let options = TransformOptions { alpha: Alpha::Present, ..Default::default() };
        let t = Transform::<f32>::with_options(&Profile::srgb(), &Profile::srgb(), options).unwrap();
        let input = [1.0f32, 0.5, 0.0, 0.3];
        let mut output = [0f32; 4];
        t.transform_pixels(&input, &mut output).unwrap();
        assert_abs_diff_eq!(output[3], 0.3);
        assert_abs_diff_eq!(output[1], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_xyz_d50_native_units() {
        let t = Transform::<f64>::new(&Profile::srgb(), &Profile::xyz_d50(), Intent::RelativeColorimetric).unwrap();
        let mut v = vec![1.0, 1.0, 1.0];
        t.apply(&mut v).unwrap();
        assert_abs_diff_eq!(v[0], 0.9642, epsilon = 2e-3);
        assert_abs_diff_eq!(v[1], 1.0, epsilon = 2e-3);
        assert_abs_diff_eq!(v[2], 0.8249, epsilon = 2e-3);
    }
}
