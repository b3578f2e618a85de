//! Color conversion command.
//!
//! Converts into a built-in space named on the command line or into the
//! space of an ICC profile, optionally gamut mapping on the way.

use crate::{ConvertArgs, ProfileOptions};
use anyhow::{Context, Result};
use pigment_color::{to_gamut_css, CmsSpaces, ColorError, Space};
use pigment_icc::Intent;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Runs the convert command.
pub fn run(args: ConvertArgs, profiles: &ProfileOptions) -> Result<()> {
    trace!(color = %args.color, "convert::run");

    let color = super::parse_color(&args.color)?;
    let intent: Intent = args.intent.parse().context("Bad --intent")?;

    // keeps profile spaces alive for the conversion
    let cms = CmsSpaces::new();
    let target: Arc<dyn Space> = match (&args.profile, &args.to) {
        (Some(key), _) => {
            let profile = super::load_profile(key, profiles)?;
            cms.add_profile(profile, "", intent)? as Arc<dyn Space>
        }
        (None, Some(name)) => super::find_space(name)?,
        (None, None) => unreachable!("clap requires --to or --profile"),
    };

    info!(from = color.space().name(), to = target.name(), map = args.map, "Converting color");

    let converted = if args.map { to_gamut_css(&color, &target) } else { color.converted(&target) };
    let converted = converted.ok_or_else(|| ColorError::UnsupportedConversion {
        from: color.space().name().to_string(),
        to: target.name().to_string(),
    })?;
    debug!(values = ?converted.all_values(), "converted");

    println!("{converted}");
    Ok(())
}
