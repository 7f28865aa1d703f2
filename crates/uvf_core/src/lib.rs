pub mod config;
pub mod host;
pub mod input;
pub mod registry;
pub mod sequencer;
pub mod time;
pub mod update;

pub use config::{load_sequence_descriptor, AtlasGrid, SequencerConfig};
pub use host::{Drawable, DrawableKind, Material, Node, World};
pub use registry::{Handle, Registry};
pub use sequencer::{FrameSequencer, CUR_ROW_COL_PARAM};
pub use update::{run_update, Tickable};
