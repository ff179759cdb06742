mod click_map;
mod engine;
mod flags;
mod host;
mod uid;

pub use click_map::{format_color, AssetResolver, ImageClickMaps, NoPixelSource, PixelSource};
pub use engine::{option_available, PuzzleEngine, PuzzleEngineOptions, STEP_GUARD_LIMIT};
pub use flags::{
    FlagPersistence, FlagRecord, FlagStore, MemoryFlagPersistence, GLOBAL_FLAG_NAMESPACE,
};
pub use host::{system_now_ms, PuzzleHost, SilentHost};
pub use uid::UidGenerator;
