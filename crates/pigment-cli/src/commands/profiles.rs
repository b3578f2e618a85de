//! Profile listing command.

use crate::{ProfileOptions, ProfilesArgs};
use anyhow::Result;
use tracing::{info, trace};

/// Runs the profiles command, listing what the profile directories hold.
pub fn run(args: ProfilesArgs, options: &ProfileOptions, verbose: u8) -> Result<()> {
    trace!(display = args.display, output = args.output, "profiles::run");

    let system = super::profile_system(options)?;
    if verbose > 0 {
        for dir in system.directories() {
            let kind = if dir.user { "user" } else { "system" };
            println!("# {} ({kind})", dir.path.display());
        }
    }

    let profiles = if args.display {
        system.display_profiles()
    } else if args.output {
        system.output_profiles()
    } else {
        system.profiles().to_vec()
    };
    info!(count = profiles.len(), "listing profiles");

    if profiles.is_empty() {
        eprintln!("No profiles found");
        return Ok(());
    }
    for profile in &profiles {
        let path = profile.path().map(|p| p.display().to_string()).unwrap_or_default();
        println!("{}\t{}\t{}\t{}", profile.name(false), profile.id(), profile.channels(), path);
    }
    Ok(())
}
