// Defect synthesis tool.
// What you can do:
// • `edit`: open a background image, pick a defect sprite, and stamp it at a
//   click, at random, or at random inside a dragged area; drag inside an area
//   to draw a scratch in the local background color. W saves.
// • `normalize`: renumber a sprite directory as defect_001.png, defect_002.png, …

use clap::Parser;
use defect_synth::config::{Cli, Command, Config};
use defect_synth::error::Error;
use defect_synth::library::{self, SpriteLibrary};
use defect_synth::session::Session;
use defect_synth::{logging, shell};

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let _logger = logging::setup_logging(&cli.log_level)?;

    match cli.command {
        Command::Edit(args) => {
            /* A missing sprite directory still lets you open and save images. */
            let library = SpriteLibrary::open(&args.defects).unwrap_or_else(|e| {
                log::warn!("{e}; continuing without sprites");
                SpriteLibrary::empty()
            });
            let session = Session::new(Config::from(&args), library);
            shell::run(&args, session)
        }
        Command::Normalize { dir } => {
            let count = library::normalize_directory(&dir)?;
            log::info!("normalized {count} images in {}", dir.display());
            Ok(())
        }
    }
}
