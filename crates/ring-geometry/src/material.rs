use ring_params::Finish;

use crate::scene::Material;

/// Metal preset: primary surface plus the accent color used for details and gems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishMaterial {
    pub color: &'static str,
    pub roughness: f64,
    pub metalness: f64,
    pub accent: &'static str,
}

impl FinishMaterial {
    pub fn surface(&self) -> Material {
        Material {
            color: self.color,
            roughness: self.roughness,
            metalness: self.metalness,
        }
    }

    pub fn accent(&self, roughness: f64, metalness: f64) -> Material {
        Material {
            color: self.accent,
            roughness,
            metalness,
        }
    }
}

pub fn finish_material(finish: Finish) -> FinishMaterial {
    match finish {
        Finish::YellowGold => FinishMaterial {
            color: "#D4AF37",
            roughness: 0.2,
            metalness: 0.95,
            accent: "#F5DA7A",
        },
        Finish::WhiteGold => FinishMaterial {
            color: "#E5E3DE",
            roughness: 0.16,
            metalness: 0.94,
            accent: "#F7F6F3",
        },
        Finish::RoseGold => FinishMaterial {
            color: "#C78D7B",
            roughness: 0.22,
            metalness: 0.9,
            accent: "#E3B6AA",
        },
        Finish::Silver => FinishMaterial {
            color: "#C2CCD6",
            roughness: 0.18,
            metalness: 0.92,
            accent: "#E3E9EE",
        },
        Finish::Platinum => FinishMaterial {
            color: "#B9BEC8",
            roughness: 0.15,
            metalness: 0.96,
            accent: "#DBE0E9",
        },
    }
}
