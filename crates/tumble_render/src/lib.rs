pub mod camera;
pub mod gpu_context;
pub mod mesh_pipeline;
pub mod vertex;

pub use camera::{Camera3D, CameraMotion, CameraUniform};
pub use gpu_context::{GpuContext, DEPTH_FORMAT};
pub use mesh_pipeline::MeshPipeline;
pub use vertex::MeshVertex;
