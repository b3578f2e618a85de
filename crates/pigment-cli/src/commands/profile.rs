//! Profile information command.

use crate::ProfileArgs;
use anyhow::{Context, Result};
use pigment_icc::{is_icc_file, Profile};
use tracing::{trace, warn};

/// Runs the profile command: header summary, or the profile as base64.
pub fn run(args: ProfileArgs) -> Result<()> {
    trace!(file = %args.file.display(), "profile::run");

    if !is_icc_file(&args.file) {
        warn!(file = %args.file.display(), "no ICC header, trying anyway");
    }
    let profile = Profile::from_file(&args.file, false)
        .with_context(|| format!("Failed to load profile: {}", args.file.display()))?;

    if args.base64 {
        println!("{}", profile.dump_base64()?);
        return Ok(());
    }

    println!("{}", args.file.display());
    println!("  Name:        {}", profile.name(false));
    println!("  Identifier:  {}", profile.name(true));
    println!("  ID:          {}", profile.id());
    println!("  Checksum:    {}", profile.checksum());
    println!("  Class:       {:?}", profile.profile_class());
    println!("  Color space: {:?}", profile.color_space());
    println!("  Channels:    {}", profile.channels());
    Ok(())
}
