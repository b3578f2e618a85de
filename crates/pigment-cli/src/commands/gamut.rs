//! Gamut check command.

use crate::{GamutArgs, ProfileOptions};
use anyhow::Result;
use pigment_color::{out_of_gamut, CmsSpaces, Space};
use pigment_icc::Intent;
use std::sync::Arc;
use tracing::{info, trace};

/// Runs the gamut command.
///
/// With `--profile` the ICC engine decides whether the profile can
/// reproduce the color. With `--to` the color is converted and its channels
/// are checked against 0..1.
pub fn run(args: GamutArgs, profiles: &ProfileOptions) -> Result<()> {
    trace!(color = %args.color, "gamut::run");

    let color = super::parse_color(&args.color)?;
    let cms = CmsSpaces::new();
    let (space, outside): (Arc<dyn Space>, bool) = match (&args.profile, &args.to) {
        (Some(key), _) => {
            let profile = super::load_profile(key, profiles)?;
            let space: Arc<dyn Space> = cms.add_profile(profile, "", Intent::Perceptual)?;
            let outside = color.is_out_of_gamut(&space);
            (space, outside)
        }
        (None, Some(name)) => {
            let space = super::find_space(name)?;
            let outside = out_of_gamut(&color, &space, args.epsilon);
            (space, outside)
        }
        (None, None) => unreachable!("clap requires --to or --profile"),
    };

    info!(space = space.name(), outside, "gamut check");
    let verdict = if outside { "out of gamut" } else { "in gamut" };
    println!("{}: {verdict} for {}", args.color, space.name());
    Ok(())
}
