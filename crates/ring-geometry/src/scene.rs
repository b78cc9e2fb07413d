use serde::Serialize;

/// Cartesian point in scene units.
pub type Point3 = [f64; 3];

#[inline]
fn rotate_x(point: Point3, angle: f64) -> Point3 {
    let c = angle.cos();
    let s = angle.sin();
    [point[0], c * point[1] - s * point[2], s * point[1] + c * point[2]]
}

#[inline]
fn rotate_y(point: Point3, angle: f64) -> Point3 {
    let c = angle.cos();
    let s = angle.sin();
    [c * point[0] + s * point[2], point[1], -s * point[0] + c * point[2]]
}

#[inline]
fn rotate_z(point: Point3, angle: f64) -> Point3 {
    let c = angle.cos();
    let s = angle.sin();
    [c * point[0] - s * point[1], s * point[0] + c * point[1], point[2]]
}

/// Local transform of a node relative to its parent.
///
/// `rotation` holds XYZ Euler angles in radians; the combined rotation is
/// `Rx * Ry * Rz`, so a point is turned about Z first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translation: Point3,
    pub rotation: Point3,
    pub scale: Point3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn translated(translation: Point3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Point3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Point3) -> Self {
        self.scale = scale;
        self
    }

    /// Maps a point from this node's space into its parent's space.
    pub fn apply(&self, point: Point3) -> Point3 {
        let scaled = [
            point[0] * self.scale[0],
            point[1] * self.scale[1],
            point[2] * self.scale[2],
        ];
        let rotated = rotate_x(
            rotate_y(rotate_z(scaled, self.rotation[2]), self.rotation[1]),
            self.rotation[0],
        );
        [
            rotated[0] + self.translation[0],
            rotated[1] + self.translation[1],
            rotated[2] + self.translation[2],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Renderable primitive, parameterized the way common real-time engines expect.
///
/// Tori lie in the XY plane around the Z axis; frusta are aligned with Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Primitive {
    Torus {
        radius: f64,
        tube: f64,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Octahedron {
        radius: f64,
    },
    Frustum {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
}

impl Primitive {
    /// Half extents of the primitive's local axis-aligned bounding box.
    pub fn half_extents(&self) -> Point3 {
        match *self {
            Primitive::Torus { radius, tube, .. } => [radius + tube, radius + tube, tube],
            Primitive::Sphere { radius, .. } | Primitive::Octahedron { radius } => {
                [radius, radius, radius]
            }
            Primitive::Box {
                width,
                height,
                depth,
            } => [width / 2.0, height / 2.0, depth / 2.0],
            Primitive::Frustum {
                radius_top,
                radius_bottom,
                height,
                ..
            } => {
                let radius = radius_top.max(radius_bottom);
                [radius, height / 2.0, radius]
            }
        }
    }
}

/// Surface description consumed by a physically based renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: &'static str,
    pub roughness: f64,
    pub metalness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshNode {
    pub primitive: Primitive,
    pub material: Material,
}

/// Role of a node inside the ring scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Ring,
    Band,
    Engraving,
    Pattern,
    GemMount,
    Seat,
    Gem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub transform: Transform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn mesh(
        kind: NodeKind,
        transform: Transform,
        primitive: Primitive,
        material: Material,
    ) -> Self {
        Self {
            kind,
            transform,
            mesh: Some(MeshNode {
                primitive,
                material,
            }),
            children: Vec::new(),
        }
    }

    pub fn group(kind: NodeKind, transform: Transform, children: Vec<SceneNode>) -> Self {
        Self {
            kind,
            transform,
            mesh: None,
            children,
        }
    }

    fn visit<'a>(
        &'a self,
        chain: &mut Vec<&'a Transform>,
        visitor: &mut dyn FnMut(&'a SceneNode, &[&'a Transform]),
    ) {
        chain.push(&self.transform);
        visitor(self, chain.as_slice());
        for child in &self.children {
            child.visit(chain, visitor);
        }
        chain.pop();
    }
}

/// Maps a local point through a root-first chain of transforms into world space.
pub fn to_world(chain: &[&Transform], point: Point3) -> Point3 {
    chain
        .iter()
        .rev()
        .fold(point, |point, transform| transform.apply(point))
}

/// Conservative world-space axis-aligned bounds of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Point3,
    pub max: Point3,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: [0.0, 0.0, 0.0],
            max: [0.0, 0.0, 0.0],
        }
    }

    pub fn of(root: &SceneNode) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];

        root.visit(&mut Vec::new(), &mut |node, chain| {
            let Some(mesh) = &node.mesh else {
                return;
            };
            let half = mesh.primitive.half_extents();
            for corner in 0..8 {
                let local = [
                    if corner & 1 == 0 { -half[0] } else { half[0] },
                    if corner & 2 == 0 { -half[1] } else { half[1] },
                    if corner & 4 == 0 { -half[2] } else { half[2] },
                ];
                let world = to_world(chain, local);
                for axis in 0..3 {
                    min[axis] = min[axis].min(world[axis]);
                    max[axis] = max[axis].max(world[axis]);
                }
            }
        });

        if min[0].is_finite() {
            Self { min, max }
        } else {
            Self::empty()
        }
    }

    pub fn size(&self) -> Point3 {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Immutable ring scene handed to an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingScene {
    pub root: SceneNode,
    pub bounds: Bounds,
}

impl RingScene {
    pub fn new(root: SceneNode) -> Self {
        let bounds = Bounds::of(&root);
        Self { root, bounds }
    }

    /// Nodes of the given kind in depth-first order.
    pub fn nodes(&self, kind: NodeKind) -> Vec<&SceneNode> {
        let mut found = Vec::new();
        self.root.visit(&mut Vec::new(), &mut |node, _| {
            if node.kind == kind {
                found.push(node);
            }
        });
        found
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes(kind).len()
    }

    /// World-space origin of every node of the given kind, depth-first.
    pub fn world_origins(&self, kind: NodeKind) -> Vec<Point3> {
        let mut origins = Vec::new();
        self.root.visit(&mut Vec::new(), &mut |node, chain| {
            if node.kind == kind {
                origins.push(to_world(chain, [0.0, 0.0, 0.0]));
            }
        });
        origins
    }
}
