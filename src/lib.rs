pub mod camera;
pub mod choreography;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod loaders;
pub mod math;
pub mod movement;
pub mod orientation;
pub mod renderer;
pub mod scene;
pub mod traits;
pub mod types;

pub use camera::{Camera, MoveDirection};
pub use choreography::{Choreography, TOUR};
pub use config::ViewerConfig;
pub use frame::FrameOrchestrator;
pub use movement::{BoundingBoxPolicy, MovementPolicy, WORLD_BOUNDS};
pub use orientation::Orientation;
