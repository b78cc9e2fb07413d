pub mod builder;
pub mod material;
pub mod motion;
pub mod scene;

pub use builder::{
    PATTERN_POSITIONS, build_ring, depth_scale, gem_angles, seat_height, tubular_segments,
};
pub use material::{FinishMaterial, finish_material};
pub use motion::idle_motion;
pub use scene::{
    Bounds, Material, MeshNode, NodeKind, Point3, Primitive, RingScene, SceneNode, Transform,
    to_world,
};
