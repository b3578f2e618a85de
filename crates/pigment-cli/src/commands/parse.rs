//! Color parsing command.
//!
//! Shows what a piece of CSS color text reads as: its space, normalized
//! values and the canonical CSS written back.

use crate::ParseArgs;
use anyhow::Result;
use pigment_color::utils::rgba_to_hex;
use tracing::{debug, trace};

/// Runs the parse command.
pub fn run(args: ParseArgs, verbose: u8) -> Result<()> {
    trace!(count = args.colors.len(), "parse::run");

    for (i, text) in args.colors.iter().enumerate() {
        let color = super::parse_color(text)?;
        debug!(text = %text, space = color.space().name(), "parsed color");

        if i > 0 {
            println!();
        }
        println!("{text}");
        println!("  Space:    {}", color.space().name());
        println!("  Values:   {}", super::format_values(&color.all_values()));
        println!("  CSS:      {color}");
        if args.rgba {
            println!("  RGBA:     {}", rgba_to_hex(color.to_rgba(1.0), true));
        }
        if verbose > 0 {
            let names: Vec<&str> = color.space().components(color.has_opacity()).iter().map(|c| c.name).collect();
            println!("  Channels: {}", names.join(", "));
            if !color.space().is_valid() {
                println!("  Profile:  unresolved, showing the sRGB fallback");
            }
        }
    }

    Ok(())
}
