//! Gamut checking against an output profile.

use crate::format::{pixel_format, Alpha};
use crate::transform::Kernel;
use crate::{IccError, IccResult, Intent, Profile, Sample};
use lcms2::{Flags, PixelFormat, Profile as LcmsProfile, ThreadContext, Transform as LcmsTransform};

/// Tells whether colors of one profile are reproducible on another.
///
/// Built as a soft-proofing transform from the source profile onto itself
/// with the target as proofing device and gamut checking on. The alarm
/// color is all zeros, so a color is out of gamut when every output channel
/// is zero. Pure black in spaces where black is the all-zero code is
/// therefore reported as out of gamut.
///
/// The checker owns an lcms context carrying those alarm codes, so other
/// proofing transforms keep their own warning color.
///
/// # Example
///
/// ```rust
/// use pigment_icc::{GamutChecker, Profile};
///
/// let checker = GamutChecker::new(&Profile::srgb(), &Profile::srgb()).unwrap();
/// assert!(!checker.is_out_of_gamut(&[0.5, 0.2, 0.9]));
/// ```
pub struct GamutChecker {
    // declared before the context: the transform must be freed first
    kernel: Box<dyn Kernel<u16>>,
    channels: usize,
    _context: ThreadContext,
}

struct Proofing<const N: usize>(LcmsTransform<[u16; N], [u16; N], ThreadContext>);

impl<const N: usize> Kernel<u16> for Proofing<N> {
    fn run(&self, input: &[u16], output: &mut [u16]) {
        let src: &[[u16; N]] = bytemuck::cast_slice(input);
        let dst: &mut [[u16; N]] = bytemuck::cast_slice_mut(output);
        self.0.transform_pixels(src, dst);
    }
}

fn proofing<const N: usize>(
    context: &ThreadContext,
    from: &LcmsProfile<ThreadContext>,
    proof: &LcmsProfile<ThreadContext>,
    format: PixelFormat,
) -> IccResult<Box<dyn Kernel<u16>>> {
    let intent: lcms2::Intent = Intent::RelativeColorimetricNoBpc.into();
    let inner = LcmsTransform::<[u16; N], [u16; N], ThreadContext>::new_proofing_context(
        context,
        from,
        format,
        from,
        format,
        proof,
        intent,
        intent,
        Flags::GAMUT_CHECK | Flags::SOFT_PROOFING,
    )
    .map_err(|e| IccError::TransformFailed(e.to_string()))?;
    Ok(Box::new(Proofing(inner)))
}

/// Reopens `profile` inside `context`.
fn open_in(context: &ThreadContext, profile: &Profile) -> IccResult<LcmsProfile<ThreadContext>> {
    LcmsProfile::new_icc_context(context, &profile.to_bytes()?).map_err(|e| IccError::CreateFailed(e.to_string()))
}

impl GamutChecker {
    /// Creates a checker for colors of `from` against the gamut of `to`.
    pub fn new(from: &Profile, to: &Profile) -> IccResult<Self> {
        let mut context = ThreadContext::new();
        context.set_alarm_codes([0; 16]);

        let format = pixel_format::<u16>(from, Alpha::None, false)?;
        let source = open_in(&context, from)?;
        let proof = open_in(&context, to)?;
        let channels = from.channels();
        let kernel = match channels {
            1 => proofing::<1>(&context, &source, &proof, format),
            2 => proofing::<2>(&context, &source, &proof, format),
            3 => proofing::<3>(&context, &source, &proof, format),
            4 => proofing::<4>(&context, &source, &proof, format),
            5 => proofing::<5>(&context, &source, &proof, format),
            6 => proofing::<6>(&context, &source, &proof, format),
            n => Err(IccError::UnsupportedPixelSize(n)),
        }?;
        Ok(Self { kernel, channels, _context: context })
    }

    /// Returns true when `values` (normalized 0..1 in the source profile's
    /// channels) fall outside the target gamut.
    ///
    /// Missing channels count as zero and extra values are ignored.
    pub fn is_out_of_gamut(&self, values: &[f64]) -> bool {
        let input: Vec<u16> = (0..self.channels)
            .map(|i| u16::from_unit(values.get(i).copied().unwrap_or(0.0)))
            .collect();
        let mut output = vec![0u16; self.channels];
        self.kernel.run(&input, &mut output);
        output.iter().all(|v| *v == 0)
    }
}

impl std::fmt::Debug for GamutChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamutChecker")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
