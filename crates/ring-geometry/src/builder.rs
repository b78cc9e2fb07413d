use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use ring_params::{DesignParams, Engraving, GemShape, Profile};

use crate::material::{FinishMaterial, finish_material};
use crate::scene::{Material, NodeKind, Primitive, RingScene, SceneNode, Transform};

/// Angular slots shared by the dots and chevron patterns.
pub const PATTERN_POSITIONS: usize = 28;

const BAND_RADIAL_SEGMENTS: u32 = 36;
const REFERENCE_BAND_WIDTH: f64 = 0.18;
const MAX_GEM_SPREAD: f64 = PI * 0.75;
const GEM_SPREAD_PER_GEM: f64 = 0.18;
const SEAT_SEGMENTS: u32 = 12;

const GEM_ROUGHNESS: f64 = 0.03;
const GEM_METALNESS: f64 = 0.05;

pub fn tubular_segments(profile: Profile) -> u32 {
    match profile {
        Profile::Court => 220,
        Profile::Comfort => 180,
        Profile::Classic => 140,
    }
}

/// Scale applied along the ring axis so wider bands read as deeper.
pub fn depth_scale(band_width: f64) -> f64 {
    (band_width / REFERENCE_BAND_WIDTH).max(0.6)
}

/// Angular positions of the gems, centered on the top of the band (π/2).
pub fn gem_angles(gem_count: u32) -> Vec<f64> {
    match gem_count {
        0 => Vec::new(),
        1 => vec![FRAC_PI_2],
        count => {
            let spread = (f64::from(count) * GEM_SPREAD_PER_GEM).min(MAX_GEM_SPREAD);
            let start = FRAC_PI_2 - spread / 2.0;
            let step = spread / f64::from(count - 1);
            (0..count).map(|index| start + f64::from(index) * step).collect()
        }
    }
}

pub fn seat_height(gem_size: f64) -> f64 {
    (gem_size * 0.58).max(0.045)
}

/// Builds the ring scene for a validated parameter set.
///
/// The result depends on `params` only; callers rebuild it on every change.
pub fn build_ring(params: &DesignParams) -> RingScene {
    let finish = finish_material(params.finish);
    let depth = depth_scale(params.band_width);

    let mut children = vec![band(params, &finish, depth)];
    children.extend(engraving(params, &finish, depth));
    children.extend(
        gem_angles(params.gem_count)
            .into_iter()
            .map(|angle| gem_mount(params, &finish, angle)),
    );

    RingScene::new(SceneNode::group(
        NodeKind::Ring,
        Transform::IDENTITY,
        children,
    ))
}

fn band(params: &DesignParams, finish: &FinishMaterial, depth: f64) -> SceneNode {
    SceneNode::mesh(
        NodeKind::Band,
        Transform::IDENTITY.with_scale([1.0, 1.0, depth]),
        Primitive::Torus {
            radius: params.band_radius,
            tube: params.band_thickness,
            radial_segments: BAND_RADIAL_SEGMENTS,
            tubular_segments: tubular_segments(params.profile),
        },
        finish.surface(),
    )
}

fn engraving(params: &DesignParams, finish: &FinishMaterial, depth: f64) -> Option<SceneNode> {
    let thickness = params.band_thickness;
    match params.engraving {
        Engraving::None => None,
        Engraving::Line => Some(SceneNode::mesh(
            NodeKind::Engraving,
            Transform::IDENTITY.with_scale([1.0, 1.0, depth * 1.02]),
            Primitive::Torus {
                radius: params.band_radius * 1.003,
                tube: (thickness * 0.16).max(0.007),
                radial_segments: 20,
                tubular_segments: 220,
            },
            finish.accent(0.22, 0.88),
        )),
        Engraving::Twist => Some(SceneNode::mesh(
            NodeKind::Engraving,
            Transform::IDENTITY
                .with_rotation([0.0, 0.0, PI / 8.0 + params.twist * (PI / 5.0)])
                .with_scale([1.0, 1.0, depth * 0.9]),
            Primitive::Torus {
                radius: params.band_radius * 1.01,
                tube: (thickness * 0.35).max(0.01),
                radial_segments: 24,
                tubular_segments: 190,
            },
            finish.accent(0.24, 0.86),
        )),
        Engraving::Dots => Some(pattern(params, |_, _| {
            Some((
                Transform::IDENTITY,
                Primitive::Sphere {
                    radius: (thickness * 0.17).max(0.012),
                    width_segments: 10,
                    height_segments: 10,
                },
                finish.accent(0.2, 0.9),
            ))
        })),
        // Chevrons reuse the dot layout and only fill the even slots.
        Engraving::Chevron => Some(pattern(params, |index, angle| {
            (index % 2 == 0).then(|| {
                (
                    Transform::IDENTITY.with_rotation([0.0, 0.0, angle + FRAC_PI_4]),
                    Primitive::Box {
                        width: (thickness * 0.2).max(0.02),
                        height: (thickness * 0.08).max(0.007),
                        depth: (params.band_width * 0.55).max(0.07),
                    },
                    finish.accent(0.22, 0.85),
                )
            })
        })),
    }
}

/// Lays out details on the fixed ring of pattern slots just outside the band.
fn pattern<F>(params: &DesignParams, mut detail: F) -> SceneNode
where
    F: FnMut(usize, f64) -> Option<(Transform, Primitive, Material)>,
{
    let radius = params.band_radius + params.band_thickness * 0.42;
    let children = (0..PATTERN_POSITIONS)
        .filter_map(|index| {
            let angle = index as f64 / PATTERN_POSITIONS as f64 * TAU;
            let (local, primitive, material) = detail(index, angle)?;
            let transform = Transform {
                translation: [angle.cos() * radius, angle.sin() * radius, 0.0],
                ..local
            };
            Some(SceneNode::mesh(
                NodeKind::Engraving,
                transform,
                primitive,
                material,
            ))
        })
        .collect();

    SceneNode::group(NodeKind::Pattern, Transform::IDENTITY, children)
}

/// Seat and gem for one angular slot. The mount's local +Y points radially outward.
fn gem_mount(params: &DesignParams, finish: &FinishMaterial, angle: f64) -> SceneNode {
    let surface_radius = params.band_radius + params.band_thickness * 0.92;
    let seat_height = seat_height(params.gem_size);
    let gem_offset = seat_height + params.gem_size * 0.55 + params.gem_height * 0.25;

    let seat = SceneNode::mesh(
        NodeKind::Seat,
        Transform::translated([0.0, seat_height / 2.0, 0.0]),
        Primitive::Frustum {
            radius_top: (params.gem_size * 0.22).max(0.014),
            radius_bottom: (params.gem_size * 0.18).max(0.012),
            height: seat_height,
            radial_segments: SEAT_SEGMENTS,
        },
        finish.surface(),
    );

    let (primitive, scale) = gem_silhouette(params.gem_shape, params.gem_size);
    let gem = SceneNode::mesh(
        NodeKind::Gem,
        Transform::translated([0.0, gem_offset, 0.0]).with_scale(scale),
        primitive,
        finish.accent(GEM_ROUGHNESS, GEM_METALNESS),
    );

    SceneNode::group(
        NodeKind::GemMount,
        Transform::translated([angle.cos() * surface_radius, angle.sin() * surface_radius, 0.0])
            .with_rotation([0.0, 0.0, angle - FRAC_PI_2]),
        vec![seat, gem],
    )
}

fn gem_silhouette(shape: GemShape, size: f64) -> (Primitive, [f64; 3]) {
    match shape {
        GemShape::Princess => (
            Primitive::Box {
                width: size,
                height: size,
                depth: size,
            },
            [1.0, 1.0, 1.0],
        ),
        GemShape::Oval => (
            Primitive::Sphere {
                radius: size * 0.72,
                width_segments: 24,
                height_segments: 24,
            },
            [1.3, 1.0, 0.8],
        ),
        GemShape::Marquise => (
            Primitive::Octahedron {
                radius: size * 0.72,
            },
            [1.4, 0.8, 0.8],
        ),
        GemShape::Round => (
            Primitive::Sphere {
                radius: size * 0.7,
                width_segments: 26,
                height_segments: 26,
            },
            [1.0, 1.0, 1.0],
        ),
    }
}
