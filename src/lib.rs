// Defect synthesis: stamp defect sprites and scratches onto clean inspection images.
//
// Pixel engine (UI-agnostic): `sampler`, `gradient`, `blend`, `placement`,
// `scratch`, and `canvas::compositor`, the only code that writes canvas pixels.
// `session` owns the editing state and turns UI events into engine calls;
// `draw` and `shell` are the minifb front end.

pub mod blend;
pub mod canvas;
pub mod config;
pub mod draw;
pub mod error;
pub mod gradient;
pub mod library;
pub mod logging;
pub mod placement;
pub mod sampler;
pub mod scratch;
pub mod session;
pub mod shell;
pub mod types;
