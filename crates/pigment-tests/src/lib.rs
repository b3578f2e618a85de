//! Integration tests for the pigment crates.
//!
//! End-to-end scenarios that go through both the ICC layer and the color
//! layer: parsing, conversion, profile identity and gamut checks.

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pigment_color::{CmsSpaces, Color, Space, SpaceType};
    use pigment_icc::{GamutChecker, Intent, Profile, ProfileSystem, Transform};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn assert_values(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
        }
    }

    /// Gamma 2.2 RGB profile with primaries well inside sRGB.
    fn narrow_rgb() -> Profile {
        let white = lcms2::CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 };
        let primaries = lcms2::CIExyYTRIPLE {
            Red: lcms2::CIExyY { x: 0.45, y: 0.35, Y: 1.0 },
            Green: lcms2::CIExyY { x: 0.32, y: 0.45, Y: 1.0 },
            Blue: lcms2::CIExyY { x: 0.25, y: 0.22, Y: 1.0 },
        };
        let curve = lcms2::ToneCurve::new(2.2);
        let curves = [&curve, &curve, &curve];
        Profile::from_lcms(lcms2::Profile::new_rgb(&white, &primaries, &curves).unwrap())
    }

    /// Parse HSL, convert to RGB, print.
    #[test]
    fn test_hsl_to_rgb_text() {
        let mut color = Color::parse("hsl(0 100% 50%)").unwrap();
        assert_eq!(color.space().space_type(), SpaceType::Hsl);
        assert_values(color.values(), &[0.0, 1.0, 0.5], 1e-12);

        assert!(color.convert_to(SpaceType::Rgb));
        assert_values(color.values(), &[1.0, 0.0, 0.0], 1e-9);

        let reparsed = Color::parse(&color.to_string()).unwrap();
        assert!(reparsed.is_similar(&Color::parse("rgb(255 0 0)").unwrap(), 1e-9));
    }

    /// Device CMYK through the naive formula, below the ink limit.
    #[test]
    fn test_device_cmyk_to_rgb() {
        let color = Color::parse("device-cmyk(0 0.2 0.2 0.2)").unwrap();
        assert_eq!(color.space().space_type(), SpaceType::Cmyk);
        assert!(!color.is_over_inked());

        let rgb = color.converted_to(SpaceType::Rgb).unwrap();
        assert_values(rgb.values(), &[0.8, 0.64, 0.64], 1e-9);
    }

    /// Profile equality follows content, not where the bytes came from.
    #[test]
    fn test_profile_copies_compare_equal() {
        let dir = tempdir().unwrap();
        let bytes = Profile::srgb().to_bytes().unwrap();
        let first = dir.path().join("first.icc");
        let second = dir.path().join("second.icm");
        std::fs::write(&first, &bytes).unwrap();
        std::fs::write(&second, &bytes).unwrap();

        let a = Profile::from_file(&first, false).unwrap();
        let b = Profile::from_file(&second, true).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(a.checksum(), b.checksum());
        assert_eq!(a, b);
        assert_ne!(a, narrow_rgb());
    }

    #[test]
    fn test_gamut_checker_narrow_profile() {
        let srgb = Profile::srgb();
        let checker = GamutChecker::new(&srgb, &narrow_rgb()).unwrap();
        assert!(checker.is_out_of_gamut(&[1.0, 0.0, 1.0]));
        assert!(!checker.is_out_of_gamut(&[0.5, 0.48, 0.5]));
    }

    /// Same check through a profile space registered in a document registry.
    #[test]
    fn test_color_out_of_profile_gamut() {
        let cms = CmsSpaces::new();
        let space: Arc<dyn Space> = cms.add_profile(Arc::new(narrow_rgb()), "narrow", Intent::Perceptual).unwrap();
        assert!(space.is_valid());

        let magenta = Color::new(SpaceType::Rgb, vec![1.0, 0.0, 1.0]).unwrap();
        assert!(magenta.is_out_of_gamut(&space));
        let muted = Color::new(SpaceType::Rgb, vec![0.5, 0.48, 0.5]).unwrap();
        assert!(!muted.is_out_of_gamut(&space));

        let converted = muted.converted(&space).unwrap();
        assert_eq!(converted.values().len(), 3);
        assert!(converted.to_string().contains("icc-color(narrow"));
    }

    #[test]
    fn test_unresolved_icc_color_keeps_fallback() {
        let text = "#112233 icc-color(myprofile, 0.1, 0.2, 0.3)";
        let color = Color::parse(text).unwrap();
        assert_eq!(color.space().space_type(), SpaceType::Cms);
        assert!(!color.space().is_valid());
        assert_values(
            &color.values()[..3],
            &[0x11 as f64 / 255.0, 0x22 as f64 / 255.0, 0x33 as f64 / 255.0],
            1e-12,
        );
        assert_eq!(color.to_string(), text);
        assert_eq!(color.to_rgba(1.0), 0x112233ff);
    }

    /// A transform may be applied any number of times.
    #[test]
    fn test_transform_reuse() {
        let transform = Transform::<f64>::new(&Profile::srgb(), &Profile::lab(), Intent::Perceptual).unwrap();
        let mut first = vec![0.2, 0.4, 0.6];
        let mut second = first.clone();
        transform.apply(&mut first).unwrap();
        transform.apply(&mut second).unwrap();
        assert_eq!(first, second);

        let mut with_opacity = vec![0.2, 0.4, 0.6, 0.25];
        transform.apply(&mut with_opacity).unwrap();
        assert_eq!(&with_opacity[..3], &first[..]);
        assert_eq!(with_opacity[3], 0.25);
    }

    #[test]
    fn test_profile_system_scan() {
        let dir = tempdir().unwrap();
        let bytes = Profile::srgb().to_bytes().unwrap();
        std::fs::write(dir.path().join("srgb.icc"), &bytes).unwrap();
        std::fs::write(dir.path().join("SRGB-COPY.ICM"), &bytes).unwrap();
        std::fs::write(dir.path().join("broken.icc"), b"definitely not a profile").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();

        let mut system = ProfileSystem::new();
        system.add_directory(dir.path(), true);
        // the copy shares name and ID, so only one survives
        assert_eq!(system.refresh(), 1);

        let found = system.profile("sRGB-built-in").unwrap();
        assert!(found.in_home());
        assert_eq!(system.profile(found.id()).unwrap().checksum(), found.checksum());
        assert_eq!(system.display_profiles().len(), 1);
        assert!(system.output_profiles().is_empty());
        assert!(system.profile("missing").is_none());
    }

    /// Profile spaces convert to and from built-in spaces through lcms.
    #[test]
    fn test_profile_space_round_trip() {
        let cms = CmsSpaces::new();
        let space: Arc<dyn Space> = cms.add_profile(Profile::srgb(), "web", Intent::RelativeColorimetric).unwrap();
        let original = Color::parse("rgb(40 120 200)").unwrap();

        let in_profile = original.converted(&space).unwrap();
        assert_values(in_profile.values(), original.values(), 2e-3);
        let back = in_profile.converted_to(SpaceType::Rgb).unwrap();
        assert!(back.is_similar(&original, 2e-3));
    }
}
