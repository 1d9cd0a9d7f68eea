//! Export module for saving heightmaps and droplet paths to disk.
//!
//! Supports 16-bit PNG for universal compatibility, RAW formats
//! for game engine imports, OBJ meshes, and trajectory overlay maps.

mod range;
mod png;
mod raw;
mod obj;
mod trajectory;

pub use range::{EmptyRange, HeightRange};
pub use png::{export_grid_png, PngExportError};
pub use raw::{
    expected_file_size, export_grid_raw, import_grid_raw_f32, RawExportError, RawFormat,
};
pub use obj::{export_grid_obj, write_obj, ObjExportError, OBJ_HEIGHT_SCALE};
pub use trajectory::{
    export_trajectory_map, render_trajectory_map, trajectory_color, TrajectoryMapError,
    TrajectoryMapOptions,
};
