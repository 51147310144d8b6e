pub mod clock;
pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod window;

pub use clock::{Clock, FpsCounter};
pub use controller::{Button, Command, Controller};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use window::WindowDimensions;
